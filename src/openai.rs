//! OpenAI-backed structured generation and the batch translation capability.
//!
//! Every call follows the same shape: check the input, send a templated
//! prompt asking for a JSON object, parse the reply into a typed value, and
//! check the parsed value before handing it back.

use crate::config::Config;
use crate::error::TranslateError;
use crate::i18n::{Language, TranslationValidator};
use crate::retry::{with_retry_if, RetryConfig};
use crate::translation::{check_alignment, BatchTranslateResponse, BatchTranslator};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// OpenAI Chat Completion request
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Check if a model is a reasoning model that doesn't support temperature
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
}

/// Some models wrap JSON output in a markdown code fence despite being asked not to.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Thin client for JSON-mode chat completions.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_url: String,
    retry: RetryConfig,
}

impl OpenAiClient {
    pub fn new(client: reqwest::Client, api_key: &str, model: &str, api_url: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            api_url: api_url.to_string(),
            retry: RetryConfig::api_call(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, TranslateError> {
        let client = reqwest::Client::builder()
            .timeout(config.translate_timeout())
            .build()?;
        Ok(Self::new(
            client,
            &config.openai_api_key,
            &config.openai_model,
            &config.openai_api_url,
        ))
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model for a JSON object and parse it into `T`.
    ///
    /// Rate limits, server errors, transport errors and replies that do not
    /// parse are retried per the client's `RetryConfig`.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        system_prompt: String,
        user_prompt: String,
    ) -> Result<T, TranslateError> {
        // Reasoning models need higher token limits and don't support temperature
        let is_reasoning = is_reasoning_model(&self.model);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system_prompt,
                },
                Message {
                    role: "user".to_string(),
                    content: user_prompt,
                },
            ],
            max_completion_tokens: if is_reasoning { 16000 } else { 4000 },
            temperature: if is_reasoning { None } else { Some(0.2) },
            reasoning_effort: if is_reasoning {
                Some("low".to_string())
            } else {
                None
            },
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        with_retry_if(
            &self.retry,
            operation,
            || async {
                let response = self
                    .client
                    .post(&self.api_url)
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .header("Content-Type", "application/json")
                    .json(&request)
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status().as_u16();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
                    return Err(TranslateError::Api { status, body });
                }

                let chat_response: ChatResponse = response
                    .json()
                    .await
                    .map_err(|e| TranslateError::Decode(e.to_string()))?;

                let content = chat_response
                    .choices
                    .first()
                    .map(|c| c.message.content.as_str())
                    .ok_or_else(|| {
                        TranslateError::Decode("OpenAI response contained no choices".to_string())
                    })?;

                serde_json::from_str(strip_code_fence(content)).map_err(|e| {
                    TranslateError::Decode(format!("model output did not match schema: {}", e))
                })
            },
            TranslateError::is_retryable,
        )
        .await
    }
}

/// Build the system prompt for UI string translation
fn build_translation_system_prompt(language: Language, count: usize) -> String {
    format!(
        r#"You translate user-interface text for Sahayak, a teaching assistant used by teachers and students in Indian classrooms. Translate each English string you are given into {name} ({native}).

## Output
Reply with a JSON object of the form {{"translations": [...]}} containing exactly {count} strings, in the same order as the input array. Never merge, split, skip or reorder entries.

## DO NOT translate:
- Placeholders written in double curly braces, such as {{{{name}}}} or {{{{count}}}}. Copy them exactly, including the braces.
- The product name "Sahayak"
- URLs, email addresses and numbers

## Style:
- Use simple, everyday words a school teacher or student would use
- Keep labels short; buttons and menu items should stay one to three words
- Preserve punctuation, emojis, and leading or trailing spaces
- Use the standard script for {name}"#,
        name = language.name(),
        native = language.native_name(),
        count = count,
    )
}

/// Build the user prompt for UI string translation
fn build_translation_user_prompt(texts: &[String]) -> Result<String, TranslateError> {
    let payload = serde_json::to_string(texts)
        .map_err(|e| TranslateError::InvalidRequest(e.to_string()))?;
    Ok(format!("Translate these strings:\n{}", payload))
}

/// `BatchTranslator` that asks an OpenAI model for the translations.
#[derive(Debug, Clone)]
pub struct OpenAiBatchTranslator {
    client: OpenAiClient,
    max_batch: usize,
}

impl OpenAiBatchTranslator {
    pub fn new(client: OpenAiClient, max_batch: usize) -> Self {
        Self { client, max_batch }
    }

    pub fn max_batch(&self) -> usize {
        self.max_batch
    }
}

#[async_trait]
impl BatchTranslator for OpenAiBatchTranslator {
    async fn translate_batch(
        &self,
        texts: &[String],
        target: Language,
    ) -> Result<Vec<String>, TranslateError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        // Base language text needs no translation
        if target.is_canonical() {
            return Ok(texts.to_vec());
        }
        if texts.len() > self.max_batch {
            return Err(TranslateError::InvalidRequest(format!(
                "batch of {} strings exceeds the limit of {}",
                texts.len(),
                self.max_batch
            )));
        }

        debug!(
            "Translating {} strings into {} with {}",
            texts.len(),
            target.name(),
            self.client.model()
        );

        let response: BatchTranslateResponse = self
            .client
            .generate_json(
                &format!("Translation to {}", target.name()),
                build_translation_system_prompt(target, texts.len()),
                build_translation_user_prompt(texts)?,
            )
            .await?;

        check_alignment(texts.len(), &response.translations)?;

        for (original, translated) in texts.iter().zip(&response.translations) {
            let validation = TranslationValidator::validate(original, translated);
            if validation.has_errors() {
                warn!(
                    "Translation validation errors for {} ({}): {:?}",
                    target.name(),
                    target.code(),
                    validation.errors
                );
            }
        }

        Ok(response.translations)
    }
}
