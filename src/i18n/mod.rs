//! Internationalization (i18n) module.
//!
//! Language metadata and the string-level helpers the translator builds on.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported languages and their metadata
//! - `language`: Type-safe, validated `Language` handle
//! - `interpolate`: `{{placeholder}}` substitution for UI templates
//! - `validator`: Checks that translations keep their placeholders
//! - `metrics`: Lookup and batch counters
//!
//! # Example
//!
//! ```rust,ignore
//! use sahayak::i18n::{interpolate, Language, LanguageRegistry};
//!
//! let hindi = Language::from_code("hi")?;
//! let greeting = interpolate("Hello {{name}}", &[("name", &"Ravi")]);
//! let languages = LanguageRegistry::get().list_enabled();
//! ```

mod interpolate;
mod language;
mod metrics;
mod registry;
mod validator;

pub use interpolate::{interpolate, placeholders, Params};
pub use language::Language;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use validator::{TranslationValidator, ValidationReport};
