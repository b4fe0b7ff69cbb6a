use crate::error::TranslateError;
use crate::i18n::Language;
use crate::translation::backend::{
    check_alignment, BatchTranslateRequest, BatchTranslateResponse, BatchTranslator,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Calls a remote `POST /api/translate` endpoint.
///
/// No retries: a failed batch is dropped and the strings are asked for
/// again on a later lookup.
#[derive(Debug, Clone)]
pub struct HttpBatchTranslator {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpBatchTranslator {
    /// Build a client for the service at `base_url`.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TranslateError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/translate", base_url.trim_end_matches('/')),
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl BatchTranslator for HttpBatchTranslator {
    async fn translate_batch(
        &self,
        texts: &[String],
        target: Language,
    ) -> Result<Vec<String>, TranslateError> {
        let request = BatchTranslateRequest {
            texts: texts.to_vec(),
            target_language: target.code().to_string(),
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("x-api-key", key);
        }

        debug!(
            "Requesting {} translations into {} from {}",
            texts.len(),
            target.code(),
            self.endpoint
        );
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(TranslateError::Api { status, body });
        }

        let parsed: BatchTranslateResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::Decode(e.to_string()))?;

        check_alignment(texts.len(), &parsed.translations)?;
        Ok(parsed.translations)
    }
}
