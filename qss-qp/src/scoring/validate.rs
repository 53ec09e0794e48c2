//! Advisory validation of normalized results
//!
//! Every rule is checked; the report lists each violation in a fixed order:
//! `user_id`, `visit_count`, `visit_duration`, `categories`, then one
//! message per invalid category score in mapping order.

use qss_common::time::is_valid_time_value;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MSG_VALID: &str = "Data is valid.";
pub const MSG_INVALID_USER_ID: &str = "Missing or invalid 'user_id'.";
pub const MSG_INVALID_VISIT_COUNT: &str = "Missing or invalid 'visit_count'. Must be a positive integer.";
pub const MSG_INVALID_VISIT_DURATION: &str = "Invalid 'visit_duration'. Must be in HH:MM:SS format.";
pub const MSG_INVALID_CATEGORIES: &str = "Missing or invalid 'categories'. Must be a dictionary.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Success,
    Error,
}

/// Outcome of [`validate_data`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub status: ValidationStatus,
    pub messages: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.status == ValidationStatus::Success
    }
}

static NULL: Value = Value::Null;

fn invalid_score_message(category: &str) -> String {
    format!(
        "Invalid score for category '{}'. Must be a non-negative integer.",
        category
    )
}

fn is_positive_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(|i| i > 0)
            .or_else(|| n.as_u64().map(|u| u > 0))
            .unwrap_or(false),
        _ => false,
    }
}

fn is_non_negative_integer(value: &Value) -> bool {
    matches!(value, Value::Number(n) if n.as_u64().is_some())
}

/// Check a normalized result record.
///
/// Absent fields and wrong JSON types are violations; nothing is coerced.
/// A non-object record fails every top-level rule.
pub fn validate_data(record: &Value) -> ValidationReport {
    let field = |name: &str| record.get(name).unwrap_or(&NULL);
    let mut messages = Vec::new();

    if !field("user_id").is_string() {
        messages.push(MSG_INVALID_USER_ID.to_string());
    }

    if !is_positive_integer(field("visit_count")) {
        messages.push(MSG_INVALID_VISIT_COUNT.to_string());
    }

    if !is_valid_time_value(field("visit_duration")) {
        messages.push(MSG_INVALID_VISIT_DURATION.to_string());
    }

    match field("categories") {
        Value::Object(categories) => {
            messages.extend(
                categories
                    .iter()
                    .filter(|(_, score)| !is_non_negative_integer(score))
                    .map(|(name, _)| invalid_score_message(name)),
            );
        }
        _ => messages.push(MSG_INVALID_CATEGORIES.to_string()),
    }

    if messages.is_empty() {
        ValidationReport {
            status: ValidationStatus::Success,
            messages: vec![MSG_VALID.to_string()],
        }
    } else {
        ValidationReport {
            status: ValidationStatus::Error,
            messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_record() -> Value {
        json!({
            "user_id": "user123",
            "visit_count": 5,
            "visit_duration": "01:30:00",
            "categories": {"A": 10, "B": 5}
        })
    }

    fn with(field: &str, value: Value) -> Value {
        let mut record = valid_record();
        record[field] = value;
        record
    }

    fn without(field: &str) -> Value {
        let mut record = valid_record();
        record.as_object_mut().unwrap().remove(field);
        record
    }

    fn error_with(messages: &[&str]) -> ValidationReport {
        ValidationReport {
            status: ValidationStatus::Error,
            messages: messages.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn test_valid_data() {
        let report = validate_data(&valid_record());
        assert!(report.is_valid());
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({"status": "success", "messages": ["Data is valid."]})
        );
    }

    #[test]
    fn test_missing_or_invalid_user_id() {
        assert_eq!(validate_data(&without("user_id")), error_with(&[MSG_INVALID_USER_ID]));
        assert_eq!(validate_data(&with("user_id", json!(12345))), error_with(&[MSG_INVALID_USER_ID]));
    }

    #[test]
    fn test_missing_or_invalid_visit_count() {
        for record in [
            without("visit_count"),
            with("visit_count", json!("five")),
            with("visit_count", json!(-5)),
            with("visit_count", json!(0)),
            with("visit_count", json!(5.0)),
            with("visit_count", json!(true)),
        ] {
            assert_eq!(validate_data(&record), error_with(&[MSG_INVALID_VISIT_COUNT]), "{}", record);
        }
    }

    #[test]
    fn test_invalid_visit_duration() {
        for record in [
            with("visit_duration", json!("1:30")),
            with("visit_duration", json!("24:00:00")),
            with("visit_duration", json!(5400)),
            without("visit_duration"),
        ] {
            assert_eq!(validate_data(&record), error_with(&[MSG_INVALID_VISIT_DURATION]), "{}", record);
        }
    }

    #[test]
    fn test_missing_or_invalid_categories() {
        assert_eq!(validate_data(&without("categories")), error_with(&[MSG_INVALID_CATEGORIES]));
        assert_eq!(
            validate_data(&with("categories", json!(["A", "B"]))),
            error_with(&[MSG_INVALID_CATEGORIES])
        );
    }

    #[test]
    fn test_invalid_category_scores() {
        let record = with("categories", json!({"A": -10, "B": "five", "C": 3, "D": 2.5}));
        assert_eq!(
            validate_data(&record),
            error_with(&[
                "Invalid score for category 'A'. Must be a non-negative integer.",
                "Invalid score for category 'B'. Must be a non-negative integer.",
                "Invalid score for category 'D'. Must be a non-negative integer.",
            ])
        );
    }

    #[test]
    fn test_empty_categories_are_valid() {
        assert!(validate_data(&with("categories", json!({}))).is_valid());
    }

    #[test]
    fn test_multiple_errors_in_fixed_order() {
        let record = json!({
            "user_id": 12345,
            "visit_count": "five",
            "visit_duration": "1:30",
            "categories": ["A", "B"]
        });
        assert_eq!(
            validate_data(&record),
            error_with(&[
                MSG_INVALID_USER_ID,
                MSG_INVALID_VISIT_COUNT,
                MSG_INVALID_VISIT_DURATION,
                MSG_INVALID_CATEGORIES,
            ])
        );
    }

    #[test]
    fn test_category_messages_follow_top_level_messages() {
        let record = json!({
            "user_id": "u",
            "visit_count": 0,
            "visit_duration": "01:00:00",
            "categories": {"Z": -1}
        });
        assert_eq!(
            validate_data(&record).messages,
            vec![
                MSG_INVALID_VISIT_COUNT.to_string(),
                "Invalid score for category 'Z'. Must be a non-negative integer.".to_string(),
            ]
        );
    }

    #[test]
    fn test_non_object_record_fails_every_top_level_rule() {
        let report = validate_data(&json!("not a record"));
        assert_eq!(report.messages.len(), 4);
    }
}
