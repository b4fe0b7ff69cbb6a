use crate::error::TranslateError;
use crate::i18n::Language;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A capability that translates many strings in one call.
///
/// Implementations must return translations positionally aligned with
/// `texts`. They may fail; callers treat any error as "drop this batch".
#[async_trait]
pub trait BatchTranslator: Send + Sync {
    async fn translate_batch(
        &self,
        texts: &[String],
        target: Language,
    ) -> Result<Vec<String>, TranslateError>;
}

/// Request body of the batch translation capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTranslateRequest {
    pub texts: Vec<String>,
    pub target_language: String,
}

/// Response body of the batch translation capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchTranslateResponse {
    pub translations: Vec<String>,
}

/// Reject a response whose length does not match the request.
pub fn check_alignment(requested: usize, translations: &[String]) -> Result<(), TranslateError> {
    if translations.len() != requested {
        return Err(TranslateError::MalformedResponse {
            expected: requested,
            actual: translations.len(),
        });
    }
    Ok(())
}
