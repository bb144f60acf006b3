//! # ctxeval-core
//!
//! Deterministic building blocks for context evaluation.
//!
//! This crate answers everything about an evaluation that does not need a
//! model:
//! - How is the context rendered into prompt text?
//! - What exactly is the model asked?
//! - Is the model's answer well-formed?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No LLM calls**: Network access lives in `ctxeval-runtime`
//! 3. **Typed failures**: Every rejection names its cause
//!
//! ## Example
//!
//! ```rust
//! use ctxeval_core::{build_prompt, normalize, ContextType};
//! use serde_json::json;
//!
//! let context = normalize(&json!("name,age\nAnn,31"), ContextType::Csv).unwrap();
//! assert!(context.contains("name: Ann | age: 31"));
//!
//! let prompt = build_prompt(&context, "How old is Ann?");
//! assert!(prompt.contains("How old is Ann?"));
//! ```

pub mod context;
pub mod prompt;
pub mod schema;
pub mod types;

// Re-export main types at crate root
pub use context::{clean_text, normalize, Context, NormalizeError, Table};
pub use prompt::{build_prompt, EVALUATION_TEMPERATURE, SYSTEM_PROMPT};
pub use schema::{check_response, validate_response, FieldRule, ResponseError, RESPONSE_SCHEMA};
pub use types::{
    ContextType, DataQuality, EvaluationRequest, EvaluationResult, HealthCheck, RequestError,
    ResponsePayload, MIN_QUESTION_CHARS,
};
