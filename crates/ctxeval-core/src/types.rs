//! Request and result types shared by the normalizer and the runtime.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::context::NormalizeError;

/// Minimum number of characters a question must have.
pub const MIN_QUESTION_CHARS: usize = 3;

/// Declared shape of the context payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextType {
    /// Free-form text
    Text,
    /// CSV text with a header row
    Csv,
    /// Sequence of strings
    List,
    /// Mapping of column name to a sequence of values
    DataFrame,
}

impl ContextType {
    /// All recognized context types, in declaration order.
    pub const ALL: [ContextType; 4] = [
        ContextType::Text,
        ContextType::Csv,
        ContextType::List,
        ContextType::DataFrame,
    ];

    /// Wire name of this context type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextType::Text => "text",
            ContextType::Csv => "csv",
            ContextType::List => "list",
            ContextType::DataFrame => "dataframe",
        }
    }
}

impl fmt::Display for ContextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextType {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContextType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| NormalizeError::UnsupportedContextType(s.to_string()))
    }
}

/// Errors from inbound request validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("question must be at least {min} characters, got {actual}")]
    QuestionTooShort { min: usize, actual: usize },
}

/// An inbound evaluation request.
///
/// `context` stays untyped until it is paired with `context_type`; see
/// [`crate::Context::from_value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// The context to evaluate, shaped according to `context_type`
    pub context: JsonValue,

    /// The question the context should answer
    pub question: String,

    /// Declared shape of `context`
    pub context_type: ContextType,
}

impl EvaluationRequest {
    /// Create a new request.
    pub fn new(context: JsonValue, question: impl Into<String>, context_type: ContextType) -> Self {
        Self {
            context,
            question: question.into(),
            context_type,
        }
    }

    /// Check the inbound constraints on the request.
    pub fn validate(&self) -> Result<(), RequestError> {
        let actual = self.question.chars().count();
        if actual < MIN_QUESTION_CHARS {
            return Err(RequestError::QuestionTooShort {
                min: MIN_QUESTION_CHARS,
                actual,
            });
        }
        Ok(())
    }

    /// A sample CSV request.
    pub fn example() -> Self {
        Self::new(
            JsonValue::String(
                "product,release_date,price,features\n\
                 iPhone 14 Pro,September 2022,999,A16 Bionic\n\
                 iPhone 14,September 2022,799,A15 Bionic"
                    .to_string(),
            ),
            "When was the iPhone 14 Pro released and how much does it cost?",
            ContextType::Csv,
        )
    }
}

/// Assessment of the supplied data itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQuality {
    pub format: String,
    pub structure_quality: String,
    pub completeness: String,
}

impl DataQuality {
    /// Placeholder used when evaluation failed.
    pub fn unavailable() -> Self {
        Self {
            format: "Error in detection".to_string(),
            structure_quality: "Error in assessment".to_string(),
            completeness: "Error in assessment".to_string(),
        }
    }
}

/// The validated judgment returned by the provider, before metadata is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePayload {
    pub confidence_score: u8,
    pub explanation: String,
    pub relevancy_analysis: String,
    pub accuracy_analysis: String,
    pub missing_information: Vec<String>,
    pub data_quality: DataQuality,
}

/// Outcome of one evaluation.
///
/// Success and failure share this shape; failures carry `error` and no
/// `confidence_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Confidence score between 1 and 100, absent on error
    pub confidence_score: Option<u8>,
    pub explanation: String,
    pub relevancy_analysis: String,
    pub accuracy_analysis: String,
    pub missing_information: Vec<String>,
    pub data_quality: DataQuality,
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
    pub error: Option<String>,
}

impl EvaluationResult {
    /// Build a successful result from a validated payload.
    pub fn from_payload(
        payload: ResponsePayload,
        timestamp: DateTime<Utc>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            confidence_score: Some(payload.confidence_score),
            explanation: payload.explanation,
            relevancy_analysis: payload.relevancy_analysis,
            accuracy_analysis: payload.accuracy_analysis,
            missing_information: payload.missing_information,
            data_quality: payload.data_quality,
            timestamp,
            request_id: request_id.into(),
            error: None,
        }
    }

    /// Build an error result carrying `cause`.
    pub fn failure(
        cause: impl fmt::Display,
        timestamp: DateTime<Utc>,
        request_id: impl Into<String>,
    ) -> Self {
        let cause = cause.to_string();
        Self {
            confidence_score: None,
            explanation: "Error in evaluation process".to_string(),
            relevancy_analysis: "Error occurred".to_string(),
            accuracy_analysis: "Error occurred".to_string(),
            missing_information: vec![cause.clone()],
            data_quality: DataQuality::unavailable(),
            timestamp,
            request_id: request_id.into(),
            error: Some(cause),
        }
    }

    /// Whether this result signals a failed evaluation.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Liveness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthCheck {
    pub fn healthy(timestamp: DateTime<Utc>) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp,
        }
    }

    /// The service is up but its provider is not usable.
    pub fn degraded(timestamp: DateTime<Utc>) -> Self {
        Self {
            status: "degraded".to_string(),
            timestamp,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
