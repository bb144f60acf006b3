//! The evaluation client.
//!
//! # Execution Flow
//! 1. Normalize context (deterministic)
//! 2. Build prompt (deterministic)
//! 3. One provider call
//! 4. Decode and validate the answer
//! 5. Attach timestamp and request id
//!
//! Failures in steps 1-4 are returned as error-shaped results, never as `Err`.

use std::sync::Arc;

use chrono::Utc;
use ctxeval_core::{
    build_prompt, normalize, validate_response, ContextType, EvaluationRequest, EvaluationResult,
    HealthCheck, NormalizeError, ResponseError, ResponsePayload, EVALUATION_TEMPERATURE,
    SYSTEM_PROMPT,
};
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Settings;
use crate::providers::{ChatMessage, CompletionConfig, LlmProvider, ProviderRegistry};
use crate::InitializationError;

/// Failures inside one evaluation.
#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("Upstream provider unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Invalid JSON response from provider: {0}")]
    UpstreamMalformed(String),

    #[error(transparent)]
    SchemaValidation(#[from] ResponseError),
}

/// Evaluates whether a context suffices to answer a question.
///
/// Holds no per-request state; share it behind `Arc` across tasks.
pub struct ContextEvaluator {
    provider: Arc<dyn LlmProvider>,
    completion: CompletionConfig,
}

impl ContextEvaluator {
    /// Create an evaluator around an existing provider.
    pub fn new(provider: Arc<dyn LlmProvider>, completion: CompletionConfig) -> Self {
        Self {
            provider,
            completion,
        }
    }

    /// Create an evaluator for the provider selected in `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, InitializationError> {
        Self::from_registry(&ProviderRegistry::with_defaults(), settings)
    }

    /// Create an evaluator, resolving the provider through `registry`.
    pub fn from_registry(
        registry: &ProviderRegistry,
        settings: &Settings,
    ) -> Result<Self, InitializationError> {
        let kind = settings.default_llm_provider;
        let provider = registry
            .create(kind, settings)
            .map_err(|source| InitializationError::Provider {
                provider: kind,
                source,
            })?;

        let completion = CompletionConfig {
            model: settings.model_name.clone(),
            temperature: EVALUATION_TEMPERATURE,
            timeout: settings.request_timeout()?,
        };

        info!(
            provider = provider.name(),
            model = %completion.model,
            "Context evaluator initialized"
        );

        Ok(Self::new(provider, completion))
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    pub fn completion_config(&self) -> &CompletionConfig {
        &self.completion
    }

    /// Readiness report: healthy only when the provider is usable.
    pub async fn health(&self) -> HealthCheck {
        if self.provider.health_check().await {
            HealthCheck::healthy(Utc::now())
        } else {
            warn!(provider = self.provider.name(), "Provider health check failed");
            HealthCheck::degraded(Utc::now())
        }
    }

    /// Evaluate an inbound request.
    pub async fn evaluate_request(&self, request: &EvaluationRequest) -> EvaluationResult {
        self.evaluate(&request.context, &request.question, request.context_type)
            .await
    }

    /// Evaluate `context` against `question`.
    ///
    /// Always returns a result; failures are reported through its `error` field.
    pub async fn evaluate(
        &self,
        context: &JsonValue,
        question: &str,
        context_type: ContextType,
    ) -> EvaluationResult {
        let request_id = Uuid::new_v4().to_string();

        match self.try_evaluate(context, question, context_type).await {
            Ok(payload) => {
                info!(
                    request_id = %request_id,
                    confidence_score = payload.confidence_score,
                    "Evaluation completed"
                );
                EvaluationResult::from_payload(payload, Utc::now(), request_id)
            }
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "Evaluation failed");
                EvaluationResult::failure(e, Utc::now(), request_id)
            }
        }
    }

    async fn try_evaluate(
        &self,
        context: &JsonValue,
        question: &str,
        context_type: ContextType,
    ) -> Result<ResponsePayload, EvaluationError> {
        let normalized = normalize(context, context_type)?;
        let prompt = build_prompt(&normalized, question);
        debug!(prompt_len = prompt.len(), "Built evaluation prompt");

        let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];
        let response = self
            .provider
            .complete(messages, &self.completion)
            .await
            .map_err(|e| EvaluationError::UpstreamUnavailable(e.to_string()))?;

        debug!(
            model = %response.model,
            total_tokens = response.usage.total(),
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            "Provider responded"
        );

        let content = response
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                EvaluationError::UpstreamUnavailable(format!(
                    "empty response from {}",
                    self.provider.name()
                ))
            })?;

        let decoded: JsonValue = serde_json::from_str(&content)
            .map_err(|e| EvaluationError::UpstreamMalformed(e.to_string()))?;

        Ok(validate_response(&decoded)?)
    }
}

/// Liveness report for the evaluation service.
pub fn health() -> HealthCheck {
    HealthCheck::healthy(Utc::now())
}
