//! Raw visit submissions and the normalized result built from them

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::aggregate::calculate_total_scores;
use super::score::CategoryScores;
use super::validate::{validate_data, ValidationReport};

/// The submission could not be interpreted at all
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    #[error("Visit submission must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("'responses' must be a mapping of question id to response, got {0}")]
    ResponsesNotAMapping(&'static str),
}

/// JSON type name used in error messages
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A visit as submitted: top-level fields are kept untyped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSubmission {
    pub user_id: Value,
    pub visit_count: Value,
    pub visit_duration: Value,
    pub responses: Map<String, Value>,
}

impl RawSubmission {
    /// Interpret a JSON body as a submission.
    ///
    /// Only the overall shape is checked: the body must be an object and
    /// `responses`, when present and not null, must be an object. Missing
    /// top-level fields become `null`.
    pub fn from_value(value: &Value) -> Result<Self, ProcessError> {
        let object = value
            .as_object()
            .ok_or_else(|| ProcessError::NotAnObject(json_type_name(value)))?;

        let field = |name: &str| object.get(name).cloned().unwrap_or(Value::Null);

        let responses = match object.get("responses") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(other) => return Err(ProcessError::ResponsesNotAMapping(json_type_name(other))),
        };

        Ok(Self {
            user_id: field("user_id"),
            visit_count: field("visit_count"),
            visit_duration: field("visit_duration"),
            responses,
        })
    }
}

impl TryFrom<&Value> for RawSubmission {
    type Error = ProcessError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        RawSubmission::from_value(value)
    }
}

/// Per-visit aggregated record consumed by validation and dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult {
    #[serde(default)]
    pub user_id: Value,
    #[serde(default)]
    pub visit_count: Value,
    #[serde(default)]
    pub visit_duration: Value,
    #[serde(default)]
    pub categories: CategoryScores,
}

impl NormalizedResult {
    pub(crate) fn from_parts(raw: &RawSubmission, categories: CategoryScores) -> Self {
        Self {
            user_id: raw.user_id.clone(),
            visit_count: raw.visit_count.clone(),
            visit_duration: raw.visit_duration.clone(),
            categories,
        }
    }

    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("user_id".to_string(), self.user_id.clone());
        object.insert("visit_count".to_string(), self.visit_count.clone());
        object.insert("visit_duration".to_string(), self.visit_duration.clone());
        object.insert("categories".to_string(), self.categories.to_value());
        Value::Object(object)
    }

    /// Run the advisory validator over this result
    pub fn validate(&self) -> ValidationReport {
        validate_data(&self.to_value())
    }
}

/// Build the normalized result for a submission.
///
/// Top-level fields are copied verbatim, malformed or not; only
/// `categories` is computed.
pub fn construct_result_json(data: &RawSubmission) -> NormalizedResult {
    NormalizedResult::from_parts(data, calculate_total_scores(&data.responses))
}
