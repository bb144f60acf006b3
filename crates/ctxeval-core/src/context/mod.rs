//! Context normalization.
//!
//! Turns one of the four accepted context shapes into the single text form
//! embedded in the evaluation prompt:
//!
//! | Type | Accepted shape | Rendering |
//! |------|----------------|-----------|
//! | `text` | any (non-strings are rendered as JSON first) | [`clean_text`] |
//! | `csv` | string with a header row | [`Table::format`] |
//! | `list` | array of strings | newline-joined, uncleaned |
//! | `dataframe` | object of column name to array | [`Table::format`] |

mod clean;
mod table;

pub use clean::clean_text;
pub use table::Table;

use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::debug;

use crate::types::ContextType;

/// Errors from context normalization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Error preprocessing context: {context_type} context type expects {expected}")]
    InvalidContextShape {
        context_type: ContextType,
        expected: &'static str,
    },

    #[error("Error preprocessing context: unsupported context type: {0}")]
    UnsupportedContextType(String),

    #[error("Error preprocessing context: malformed CSV: {0}")]
    CsvParse(String),

    #[error("Error preprocessing context: column '{column}' has {actual} values, expected {expected}")]
    ShapeMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// Context payload tagged with its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum Context {
    Text(String),
    Csv(String),
    List(Vec<String>),
    DataFrame(Table),
}

impl Context {
    /// Pair an untyped payload with its declared type.
    ///
    /// This is the only place the payload's runtime shape is inspected.
    pub fn from_value(value: &JsonValue, context_type: ContextType) -> Result<Self, NormalizeError> {
        let mismatch = |expected| NormalizeError::InvalidContextShape {
            context_type,
            expected,
        };

        match context_type {
            ContextType::Text => Ok(Context::Text(match value {
                JsonValue::String(s) => s.clone(),
                other => display_value(other),
            })),
            ContextType::Csv => value
                .as_str()
                .map(|s| Context::Csv(s.to_string()))
                .ok_or_else(|| mismatch("a string input")),
            ContextType::List => value
                .as_array()
                .and_then(|items| {
                    items
                        .iter()
                        .map(|item| item.as_str().map(str::to_string))
                        .collect::<Option<Vec<_>>>()
                })
                .map(Context::List)
                .ok_or_else(|| mismatch("a list of strings")),
            ContextType::DataFrame => value
                .as_object()
                .ok_or_else(|| mismatch("an object mapping column names to arrays"))
                .and_then(Table::from_columns)
                .map(Context::DataFrame),
        }
    }

    pub fn context_type(&self) -> ContextType {
        match self {
            Context::Text(_) => ContextType::Text,
            Context::Csv(_) => ContextType::Csv,
            Context::List(_) => ContextType::List,
            Context::DataFrame(_) => ContextType::DataFrame,
        }
    }

    /// Render this context as prompt text.
    pub fn normalize(&self) -> Result<String, NormalizeError> {
        match self {
            Context::Text(text) => Ok(clean_text(text)),
            Context::Csv(raw) => Table::from_csv(raw).map(|table| table.format()),
            Context::List(items) => Ok(items.join("\n")),
            Context::DataFrame(table) => Ok(table.format()),
        }
    }
}

/// Loose textual rendering of a structured value, with spaced separators.
fn display_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "None".to_string(),
        JsonValue::Bool(true) => "True".to_string(),
        JsonValue::Bool(false) => "False".to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => format!("'{}'", s),
        JsonValue::Array(items) => {
            let items: Vec<String> = items.iter().map(display_value).collect();
            format!("[{}]", items.join(", "))
        }
        JsonValue::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("'{}': {}", k, display_value(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

/// Normalize an untyped payload declared as `context_type`.
pub fn normalize(value: &JsonValue, context_type: ContextType) -> Result<String, NormalizeError> {
    let normalized = Context::from_value(value, context_type)?.normalize()?;
    debug!(
        context_type = %context_type,
        normalized_len = normalized.len(),
        "Normalized context"
    );
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_is_cleaned() {
        let result = normalize(&json!("  Hello,   world! <b>ok</b> "), ContextType::Text).unwrap();
        assert_eq!(result, "Hello, world! bokb");
    }

    #[test]
    fn test_text_coerces_non_strings() {
        let result = normalize(&json!({"a": "x y"}), ContextType::Text).unwrap();
        assert_eq!(result, "a x y");

        let result = normalize(&json!(["a", "b"]), ContextType::Text).unwrap();
        assert_eq!(result, "a, b");

        let result = normalize(&json!(42), ContextType::Text).unwrap();
        assert_eq!(result, "42");
    }

    #[test]
    fn test_display_value_spacing() {
        let value = json!({"k": [1, true, null], "s": "v"});
        assert_eq!(display_value(&value), "{'k': [1, True, None], 's': 'v'}");
    }

    #[test]
    fn test_csv_short_row_is_padded() {
        let result = normalize(&json!("a,b\n1"), ContextType::Csv).unwrap();
        assert!(result.ends_with("a: 1 | b: nan"));

        let result = normalize(&json!("a,b\n1,"), ContextType::Csv).unwrap();
        assert!(result.ends_with("a: 1 | b: nan"));
    }

    #[test]
    fn test_csv() {
        let raw = "product,release_date,price\n\
                   iPhone 14 Pro,September 2022,999\n\
                   iPhone 14,September 2022,799";
        let result = normalize(&json!(raw), ContextType::Csv).unwrap();

        assert!(result.starts_with("This data contains the following information:\n"));
        assert!(result.contains("product, release_date, price"));
        assert!(result.contains("product: iPhone 14 Pro | release_date: September 2022 | price: 999"));
        assert!(result.ends_with("product: iPhone 14 | release_date: September 2022 | price: 799"));
    }

    #[test]
    fn test_csv_requires_string() {
        let err = normalize(&json!(["a,b"]), ContextType::Csv).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::InvalidContextShape {
                context_type: ContextType::Csv,
                ..
            }
        ));
        assert!(err.to_string().contains("csv context type expects a string input"));
    }

    #[test]
    fn test_list_joined_without_cleaning() {
        let result = normalize(&json!(["first $1", "second  @2"]), ContextType::List).unwrap();
        assert_eq!(result, "first $1\nsecond  @2");
    }

    #[test]
    fn test_list_rejects_string() {
        let err = normalize(&json!("a\nb"), ContextType::List).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidContextShape { .. }));
    }

    #[test]
    fn test_list_rejects_non_string_items() {
        let err = normalize(&json!(["a", 2]), ContextType::List).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidContextShape { .. }));
    }

    #[test]
    fn test_dataframe() {
        let value = json!({
            "city": ["Oslo", "Lima"],
            "population": [709000, 10000000]
        });
        let result = normalize(&value, ContextType::DataFrame).unwrap();

        assert!(result.contains("city, population"));
        assert!(result.contains("city: Oslo | population: 709000"));
        assert!(result.contains("city: Lima | population: 10000000"));
    }

    #[test]
    fn test_dataframe_rejects_list() {
        let err = normalize(&json!(["a"]), ContextType::DataFrame).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidContextShape { .. }));
    }

    #[test]
    fn test_dataframe_shape_mismatch() {
        let err = normalize(&json!({"a": [1, 2], "b": [1]}), ContextType::DataFrame).unwrap_err();
        assert!(matches!(err, NormalizeError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_mismatches_never_coerce() {
        let cases = [
            (json!("text"), ContextType::List),
            (json!("text"), ContextType::DataFrame),
            (json!({"a": [1]}), ContextType::Csv),
            (json!({"a": [1]}), ContextType::List),
            (json!(["x"]), ContextType::Csv),
            (json!(null), ContextType::Csv),
        ];

        for (value, context_type) in cases {
            let result = normalize(&value, context_type);
            assert!(
                matches!(result, Err(NormalizeError::InvalidContextShape { .. })),
                "{} with {:?} should fail",
                context_type,
                value
            );
        }
    }

    #[test]
    fn test_context_type_round_trip() {
        let context = Context::from_value(&json!(["a"]), ContextType::List).unwrap();
        assert_eq!(context.context_type(), ContextType::List);
    }
}
