//! On-demand UI translation.
//!
//! - `cache`: per-language translation buckets that are only ever added to
//! - `queue`: de-duplicating set of strings waiting for the next batch
//! - `backend`: the batch translation capability and its wire shapes
//! - `http`: client for a remote batch translation endpoint
//! - `service`: the `Translator` handle UI code calls during render
//! - `preference`: loading and persisting a user's chosen language

mod backend;
mod cache;
mod http;
mod preference;
mod queue;
mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{check_alignment, BatchTranslateRequest, BatchTranslateResponse, BatchTranslator};
pub use cache::TranslationCache;
pub use http::HttpBatchTranslator;
pub use preference::{choose_language, restore_language};
pub use queue::PendingQueue;
pub use service::{CacheVersion, FlushOutcome, Translator, TranslatorOptions, DEFAULT_DEBOUNCE};
