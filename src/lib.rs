// Library exports for integration tests and binaries
pub mod config;
pub mod error;
pub mod i18n;
pub mod openai;
pub mod profile;
pub mod retry;
pub mod security;
pub mod server;
pub mod translation;
