//! # ctxeval-runtime
//!
//! LLM-backed context evaluation.
//!
//! This crate wires the deterministic pieces of `ctxeval-core` to an external
//! chat-completion provider:
//!
//! 1. Normalize the context
//! 2. Build the prompt
//! 3. Call the provider once (no retries)
//! 4. Validate the JSON answer against the response schema
//!
//! Every failure in those steps becomes an error-shaped
//! [`EvaluationResult`](ctxeval_core::EvaluationResult). The only error that
//! escapes is [`InitializationError`], raised while building the evaluator.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ctxeval_runtime::{ContextEvaluator, Settings};
//! use ctxeval_core::ContextType;
//!
//! let settings = Settings::load(None)?;
//! let evaluator = ContextEvaluator::from_settings(&settings)?;
//!
//! let result = evaluator
//!     .evaluate(&"Paris is the capital of France.".into(), "What is the capital of France?", ContextType::Text)
//!     .await;
//! println!("{:?}", result.confidence_score);
//! ```

pub mod config;
pub mod evaluator;
pub mod providers;

pub use config::{LlmProviderKind, Settings};
pub use evaluator::{health, ContextEvaluator, EvaluationError};
pub use providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
    ProviderRegistry,
};

use thiserror::Error;

/// Errors raised while constructing the evaluator.
///
/// These are fatal: no evaluation can be served without a configured provider.
#[derive(Error, Debug)]
pub enum InitializationError {
    #[error("Failed to initialize {provider} provider: {source}")]
    Provider {
        provider: LlmProviderKind,
        #[source]
        source: ProviderError,
    },

    #[error("Invalid setting '{setting}': {message}")]
    InvalidSetting {
        setting: &'static str,
        message: String,
    },
}
