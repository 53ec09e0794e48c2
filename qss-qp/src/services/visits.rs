//! Visit records
//!
//! Submitted visits are stored under `<user_id>_<visit_id>` and served back
//! to the dispatcher as the visit source.

use qss_common::models::{Visit, VISITS};
use qss_common::store::{get_record, list_records, set_record};
use qss_common::time::{now, validate_time_format};
use qss_common::{Error, RecordFilter, RecordStore, Result};
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use super::is_reserved_user_id;
use crate::scoring::validate::{
    MSG_INVALID_USER_ID, MSG_INVALID_VISIT_COUNT, MSG_INVALID_VISIT_DURATION,
};

pub const MSG_NOT_AN_OBJECT: &str = "Request body must be a JSON object.";
pub const MSG_INVALID_RESPONSES: &str =
    "Missing or invalid 'responses'. Must map question ids to response objects.";
pub const MSG_INVALID_VISIT_ID: &str = "Invalid 'visit_id'. Must be a non-empty string.";
pub const MSG_INVALID_COMMENT: &str = "Invalid 'additional_comment'. Must be a string.";
pub const MSG_RESERVED_USER_ID: &str = "Invalid 'user_id'. This id is reserved.";
pub const MSG_VISIT_KEY_TAKEN: &str =
    "Invalid 'visit_id'. Its record key is already used by another user's visit.";

fn invalid(message: &str) -> Error {
    Error::InvalidInput(message.to_string())
}

/// Check a submission body and build the visit record.
///
/// Unlike the advisory scoring validator this rejects: the stored visit must
/// be well-formed. A missing `visit_id` gets a fresh UUID.
pub fn visit_from_body(body: &Value) -> Result<Visit> {
    let object = body.as_object().ok_or_else(|| invalid(MSG_NOT_AN_OBJECT))?;

    let user_id = match object.get("user_id").and_then(Value::as_str) {
        Some(id) if is_reserved_user_id(id) => return Err(invalid(MSG_RESERVED_USER_ID)),
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return Err(invalid(MSG_INVALID_USER_ID)),
    };

    let visit_count = object
        .get("visit_count")
        .and_then(Value::as_i64)
        .filter(|count| *count > 0)
        .ok_or_else(|| invalid(MSG_INVALID_VISIT_COUNT))?;

    let visit_duration = object
        .get("visit_duration")
        .and_then(Value::as_str)
        .filter(|d| validate_time_format(d))
        .ok_or_else(|| invalid(MSG_INVALID_VISIT_DURATION))?
        .to_string();

    let responses: Map<String, Value> = match object.get("responses") {
        Some(Value::Object(map)) if map.values().all(Value::is_object) => map.clone(),
        _ => return Err(invalid(MSG_INVALID_RESPONSES)),
    };

    let visit_id = match object.get("visit_id") {
        None | Some(Value::Null) => Uuid::new_v4().to_string(),
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(_) => return Err(invalid(MSG_INVALID_VISIT_ID)),
    };

    let additional_comment = match object.get("additional_comment") {
        None | Some(Value::Null) => None,
        Some(Value::String(comment)) => Some(comment.clone()),
        Some(_) => return Err(invalid(MSG_INVALID_COMMENT)),
    };

    Ok(Visit {
        visit_id,
        user_id,
        visit_count,
        visit_duration,
        responses,
        additional_comment,
        created_at: now(),
    })
}

/// Validate and store a submitted visit
pub async fn submit_visit(store: &dyn RecordStore, body: &Value) -> Result<Visit> {
    let visit = visit_from_body(body)?;
    let key = Visit::key(&visit.user_id, &visit.visit_id);

    let existing: Option<Visit> = get_record(store, VISITS, &key).await?;
    if existing.is_some_and(|other| !other.is_for(&visit.user_id, &visit.visit_id)) {
        warn!(key = %key, user_id = %visit.user_id, "Visit key collision");
        return Err(invalid(MSG_VISIT_KEY_TAKEN));
    }

    set_record(store, VISITS, &key, &visit).await?;

    info!(
        user_id = %visit.user_id,
        visit_id = %visit.visit_id,
        responses = visit.responses.len(),
        "Visit submitted"
    );
    Ok(visit)
}

fn user_filter(user_id: &str) -> RecordFilter {
    RecordFilter::FieldEquals("user_id".to_string(), Value::from(user_id))
}

pub async fn list_visits(store: &dyn RecordStore, user_id: &str) -> Result<Vec<Visit>> {
    list_records(store, VISITS, &user_filter(user_id)).await
}

pub async fn get_visit(store: &dyn RecordStore, user_id: &str, visit_id: &str) -> Result<Option<Visit>> {
    let visit: Option<Visit> = get_record(store, VISITS, &Visit::key(user_id, visit_id)).await?;
    Ok(visit.filter(|v| v.is_for(user_id, visit_id)))
}

/// Returns whether the visit existed
pub async fn delete_visit(store: &dyn RecordStore, user_id: &str, visit_id: &str) -> Result<bool> {
    if get_visit(store, user_id, visit_id).await?.is_none() {
        return Ok(false);
    }

    let deleted = store.delete(VISITS, &Visit::key(user_id, visit_id)).await?;
    if deleted {
        info!(user_id = %user_id, visit_id = %visit_id, "Visit deleted");
    }
    Ok(deleted)
}

/// Delete every visit of one user, returning how many were removed
pub async fn delete_visits_for_user(store: &dyn RecordStore, user_id: &str) -> Result<usize> {
    let keys: Vec<String> = store
        .list(VISITS, &user_filter(user_id))
        .await?
        .into_iter()
        .map(|(key, _)| key)
        .collect();

    let mut deleted = 0;
    for key in &keys {
        if store.delete(VISITS, key).await? {
            deleted += 1;
        }
    }

    info!(user_id = %user_id, deleted, "Visits deleted for user");
    Ok(deleted)
}
