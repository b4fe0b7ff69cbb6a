use thiserror::Error;

/// Errors raised when resolving a language code against the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LanguageError {
    #[error("Unknown language code: '{0}'")]
    Unknown(String),

    #[error("Language '{0}' is not enabled")]
    Disabled(String),
}

/// Errors from a batch translation call.
///
/// The client-side queue treats every variant the same way (drop the batch),
/// but the OpenAI capability uses `is_retryable` to decide on backoff.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Failed to send translation request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Translation API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode translation response: {0}")]
    Decode(String),

    #[error("Malformed translation response: expected {expected} translations, got {actual}")]
    MalformedResponse { expected: usize, actual: usize },

    #[error("Translation batch timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Invalid translation request: {0}")]
    InvalidRequest(String),
}

impl TranslateError {
    /// Whether retrying the same request could plausibly succeed.
    ///
    /// 429 and 5xx responses, transport failures and timeouts are transient;
    /// other 4xx responses, bad input and shape mismatches are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslateError::Api { status, .. } => *status == 429 || *status >= 500,
            TranslateError::Request(_) | TranslateError::Timeout(_) => true,
            TranslateError::Decode(_) => true,
            TranslateError::MalformedResponse { .. } | TranslateError::InvalidRequest(_) => false,
        }
    }
}

/// Errors from the user profile store.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile store query failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Profile store unavailable: {0}")]
    Unavailable(String),
}
