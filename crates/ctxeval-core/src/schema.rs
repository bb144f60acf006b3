//! Response schema for provider output.
//!
//! The schema is an ordered list of field rules. Validation walks the list in
//! order and reports the first field that is missing or fails its predicate,
//! so error messages are stable for a given response.

use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::types::{DataQuality, ResponsePayload};

/// Sub-keys required inside `data_quality`.
pub const DATA_QUALITY_KEYS: [&str; 3] = ["format", "structure_quality", "completeness"];

/// Errors from response validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    #[error("Invalid or missing field: {field}")]
    InvalidField { field: &'static str },
}

/// A required field and the predicate its value must satisfy.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub check: fn(&JsonValue) -> bool,
}

/// Required fields, in validation order.
pub const RESPONSE_SCHEMA: &[FieldRule] = &[
    FieldRule {
        name: "confidence_score",
        check: is_confidence_score,
    },
    FieldRule {
        name: "explanation",
        check: is_non_empty_string,
    },
    FieldRule {
        name: "relevancy_analysis",
        check: is_non_empty_string,
    },
    FieldRule {
        name: "accuracy_analysis",
        check: is_non_empty_string,
    },
    FieldRule {
        name: "missing_information",
        check: JsonValue::is_array,
    },
    FieldRule {
        name: "data_quality",
        check: is_data_quality,
    },
];

fn is_confidence_score(value: &JsonValue) -> bool {
    value.as_u64().is_some_and(|score| (1..=100).contains(&score))
}

fn is_non_empty_string(value: &JsonValue) -> bool {
    value.as_str().is_some_and(|s| !s.is_empty())
}

fn is_data_quality(value: &JsonValue) -> bool {
    value
        .as_object()
        .is_some_and(|obj| DATA_QUALITY_KEYS.iter().all(|key| obj.contains_key(*key)))
}

/// Check `response` against [`RESPONSE_SCHEMA`] and return the first violation.
pub fn check_response(response: &JsonValue) -> Result<(), ResponseError> {
    for rule in RESPONSE_SCHEMA {
        let valid = response.get(rule.name).is_some_and(|value| (rule.check)(value));
        if !valid {
            return Err(ResponseError::InvalidField { field: rule.name });
        }
    }
    Ok(())
}

/// Validate a decoded provider response and extract its payload.
pub fn validate_response(response: &JsonValue) -> Result<ResponsePayload, ResponseError> {
    check_response(response)?;

    let text = |key: &str| response[key].as_str().unwrap_or_default().to_string();
    let quality = &response["data_quality"];

    Ok(ResponsePayload {
        // Range checked above
        confidence_score: response["confidence_score"].as_u64().unwrap_or_default() as u8,
        explanation: text("explanation"),
        relevancy_analysis: text("relevancy_analysis"),
        accuracy_analysis: text("accuracy_analysis"),
        missing_information: response["missing_information"]
            .as_array()
            .map(|items| items.iter().map(render_text).collect())
            .unwrap_or_default(),
        data_quality: DataQuality {
            format: render_text(&quality["format"]),
            structure_quality: render_text(&quality["structure_quality"]),
            completeness: render_text(&quality["completeness"]),
        },
    })
}

fn render_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_response() -> JsonValue {
        json!({
            "confidence_score": 85,
            "explanation": "The context lists the release date and price.",
            "relevancy_analysis": "Directly relevant.",
            "accuracy_analysis": "Figures match public data.",
            "missing_information": [],
            "data_quality": {
                "format": "CSV",
                "structure_quality": "Well structured",
                "completeness": "Complete"
            }
        })
    }

    fn failing_field(response: &JsonValue) -> &'static str {
        match check_response(response) {
            Err(ResponseError::InvalidField { field }) => field,
            Ok(()) => panic!("Expected validation failure"),
        }
    }

    #[test]
    fn test_valid_response() {
        let payload = validate_response(&valid_response()).unwrap();
        assert_eq!(payload.confidence_score, 85);
        assert_eq!(payload.data_quality.format, "CSV");
        assert!(payload.missing_information.is_empty());
    }

    #[test]
    fn test_missing_confidence_score() {
        let mut response = valid_response();
        response.as_object_mut().unwrap().remove("confidence_score");

        let err = validate_response(&response).unwrap_err();
        assert!(err.to_string().contains("confidence_score"));
    }

    #[test]
    fn test_confidence_score_bounds() {
        for (score, ok) in [(json!(0), false), (json!(1), true), (json!(100), true), (json!(150), false)] {
            let mut response = valid_response();
            response["confidence_score"] = score;
            assert_eq!(check_response(&response).is_ok(), ok);
        }
    }

    #[test]
    fn test_confidence_score_must_be_integer() {
        for score in [json!(50.5), json!("50"), json!(-5), json!(null)] {
            let mut response = valid_response();
            response["confidence_score"] = score;
            assert_eq!(failing_field(&response), "confidence_score");
        }
    }

    #[test]
    fn test_empty_explanation() {
        let mut response = valid_response();
        response["explanation"] = json!("");
        assert_eq!(failing_field(&response), "explanation");
    }

    #[test]
    fn test_missing_information_must_be_list() {
        let mut response = valid_response();
        response["missing_information"] = json!("nothing");
        assert_eq!(failing_field(&response), "missing_information");
    }

    #[test]
    fn test_data_quality_requires_all_keys() {
        let mut response = valid_response();
        response["data_quality"] = json!({"format": "CSV", "completeness": "ok"});
        assert_eq!(failing_field(&response), "data_quality");
    }

    #[test]
    fn test_first_violation_wins() {
        let response = json!({
            "confidence_score": 50,
            "explanation": "",
            "accuracy_analysis": 3
        });
        assert_eq!(failing_field(&response), "explanation");
    }

    #[test]
    fn test_non_object_response() {
        assert_eq!(failing_field(&json!([1, 2, 3])), "confidence_score");
        assert_eq!(failing_field(&json!("text")), "confidence_score");
    }

    #[test]
    fn test_non_string_values_are_rendered() {
        let mut response = valid_response();
        response["missing_information"] = json!(["owner", 2]);
        response["data_quality"]["completeness"] = json!(0.9);

        let payload = validate_response(&response).unwrap();
        assert_eq!(payload.missing_information, vec!["owner", "2"]);
        assert_eq!(payload.data_quality.completeness, "0.9");
    }
}
