use crate::i18n::Language;
use crate::translation::TranslatorOptions;
use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // OpenAI
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_api_url: String,

    // HTTP server
    pub port: u16,
    /// Key clients must send as `x-api-key`; `None` leaves `/api` open
    pub api_key: Option<String>,

    // Profile store (in-memory when unset)
    pub database_url: Option<String>,

    // Translation
    pub translate_timeout_secs: u64,
    pub translate_max_batch: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // OpenAI
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY not set")?,
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),

            // HTTP server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            api_key: non_empty_var("API_KEY"),

            // Profile store
            database_url: non_empty_var("DATABASE_URL"),

            // Translation
            translate_timeout_secs: translate_timeout_secs(),
            translate_max_batch: std::env::var("TRANSLATE_MAX_BATCH")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(100),
        })
    }

    pub fn translate_timeout(&self) -> Duration {
        Duration::from_secs(self.translate_timeout_secs)
    }
}

/// Settings for a `Translator` that talks to a running translation service.
///
/// Nothing is required, so client tools can start without OpenAI credentials.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub service_url: String,
    /// Sent as `x-api-key`
    pub api_key: Option<String>,
    pub debounce_ms: u64,
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            service_url: std::env::var("TRANSLATE_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            api_key: non_empty_var("API_KEY"),
            debounce_ms: std::env::var("TRANSLATE_DEBOUNCE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            timeout_secs: translate_timeout_secs(),
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Translator options starting in `language`, with this config's debounce and timeout.
    pub fn translator_options(&self, language: Language) -> TranslatorOptions {
        TranslatorOptions::new()
            .with_debounce(self.debounce())
            .with_batch_timeout(self.timeout())
            .with_language(language)
    }
}

fn translate_timeout_secs() -> u64 {
    std::env::var("TRANSLATE_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30)
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
