//! OpenAI-compatible chat-completions provider.
//!
//! Groq and OpenAI expose the same `POST {base_url}/chat/completions`
//! contract, so one client serves both; [`LlmProviderKind`] only selects the
//! base URL and which API key is used.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    factory::ProviderFactory, secrets::ApiCredential, ChatMessage, CompletionConfig,
    CompletionResponse, LlmProvider, ProviderError, TokenUsage,
};
use crate::config::{LlmProviderKind, Settings};

/// Chat-completions client for one provider.
pub struct ChatCompletionsProvider {
    kind: LlmProviderKind,
    credential: ApiCredential,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for ChatCompletionsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsProvider")
            .field("kind", &self.kind)
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ChatCompletionsProvider {
    /// Create a provider using the kind's default base URL.
    pub fn new(kind: LlmProviderKind, credential: ApiCredential) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;

        Ok(Self {
            kind,
            credential,
            base_url: kind.default_base_url().to_string(),
            client,
        })
    }

    /// Create a provider from resolved settings.
    ///
    /// Fails when the API key for `kind` is missing or blank.
    pub fn from_settings(kind: LlmProviderKind, settings: &Settings) -> Result<Self, ProviderError> {
        let credential = settings.credential(kind)?;
        Ok(Self::new(kind, credential)?.with_base_url(settings.base_url(kind)))
    }

    /// Set custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    model: String,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Decode a successful response body. Only the first choice is used.
fn parse_completion(body: &str) -> Result<CompletionResponse, ProviderError> {
    let response: ChatCompletionsResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::ParseError(e.to_string()))?;

    let (content, finish_reason) = response
        .choices
        .into_iter()
        .next()
        .map(|choice| {
            (
                choice.message.and_then(|m| m.content),
                choice.finish_reason,
            )
        })
        .unwrap_or_default();

    Ok(CompletionResponse {
        content,
        usage: response
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default(),
        model: response.model,
        finish_reason,
    })
}

/// Extract the provider's error message, falling back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait]
impl LlmProvider for ChatCompletionsProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let request = ChatCompletionsRequest {
            model: &config.model,
            messages: &messages,
            temperature: config.temperature,
        };

        debug!(
            provider = self.kind.as_str(),
            model = %config.model,
            messages = messages.len(),
            "Sending chat completion"
        );

        // Only expose the credential here, at the point of use
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.credential.expose())
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(config.timeout)
                } else {
                    ProviderError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ProviderError::RateLimited { retry_after });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        parse_completion(&body)
    }

    async fn health_check(&self) -> bool {
        !self.credential.is_empty()
    }

    fn name(&self) -> &str {
        self.kind.as_str()
    }
}

/// Factory for chat-completions providers.
pub struct ChatCompletionsFactory {
    kind: LlmProviderKind,
}

impl ChatCompletionsFactory {
    pub fn groq() -> Self {
        Self {
            kind: LlmProviderKind::Groq,
        }
    }

    pub fn openai() -> Self {
        Self {
            kind: LlmProviderKind::OpenAi,
        }
    }
}

impl ProviderFactory for ChatCompletionsFactory {
    fn provider_type(&self) -> LlmProviderKind {
        self.kind
    }

    fn create(&self, settings: &Settings) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        self.validate_settings(settings)?;
        let provider = ChatCompletionsProvider::from_settings(self.kind, settings)?;
        Ok(Arc::new(provider))
    }

    fn validate_settings(&self, settings: &Settings) -> Result<(), ProviderError> {
        settings.credential(self.kind)?;

        let url = settings.base_url(self.kind);
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ProviderError::NotConfigured(
                "llm_base_url must start with http:// or https://".to_string(),
            ));
        }

        Ok(())
    }
}
