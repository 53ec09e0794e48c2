//! Answer records
//!
//! One answer per `(user_id, question_id)`, stored under
//! `<user_id>_<question_id>` in the `answers` collection.

use qss_common::models::{Answer, ANSWERS};
use qss_common::store::{get_record, list_records, set_record};
use qss_common::time::now;
use qss_common::{Error, RecordFilter, RecordStore, Result};
use serde_json::Value;
use tracing::{info, warn};

use super::{is_reserved_question_id, is_reserved_user_id};

/// Fields a client supplies when saving or updating an answer
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerInput {
    pub answer_text: String,
    pub score: i64,
    pub category: Option<String>,
}

impl AnswerInput {
    /// Read an answer body; `None` when `answer_text` or `score` is unusable
    pub fn from_body(body: &Value) -> Option<Self> {
        let answer_text = body.get("answer_text")?.as_str()?.to_string();
        let score = parse_score(body.get("score")?)?;
        let category = body
            .get("category")
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(Self {
            answer_text,
            score,
            category,
        })
    }
}

/// Integer score given directly or nested as `{"score": n}`
pub fn parse_score(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::Object(fields) => fields.get("score").and_then(Value::as_i64),
        _ => None,
    }
}

/// Answer stored for exactly this `(user_id, question_id)`
pub(crate) async fn load_answer(
    store: &dyn RecordStore,
    user_id: &str,
    question_id: &str,
) -> Result<Option<Answer>> {
    let answer: Option<Answer> = get_record(store, ANSWERS, &Answer::key(user_id, question_id)).await?;
    Ok(answer.filter(|a| a.is_for(user_id, question_id)))
}

/// Create or replace an answer, keeping `created_at` of an existing one
pub async fn save_answer(
    store: &dyn RecordStore,
    user_id: &str,
    question_id: &str,
    input: AnswerInput,
) -> Result<Answer> {
    if is_reserved_user_id(user_id) || is_reserved_question_id(question_id) {
        return Err(Error::InvalidInput(format!(
            "Answer ids '{}/{}' are reserved",
            user_id, question_id
        )));
    }

    let key = Answer::key(user_id, question_id);
    let existing: Option<Answer> = get_record(store, ANSWERS, &key).await?;
    if let Some(other) = existing.as_ref().filter(|a| !a.is_for(user_id, question_id)) {
        warn!(answer_id = %key, owner = %other.user_id, "Answer key collision");
        return Err(Error::InvalidInput(format!(
            "Answer key '{}' already belongs to user '{}', question '{}'",
            key, other.user_id, other.question_id
        )));
    }

    let timestamp = now();
    let created_at = existing.map(|a| a.created_at).unwrap_or(timestamp);

    let answer = Answer {
        user_id: user_id.to_string(),
        question_id: question_id.to_string(),
        answer_text: input.answer_text,
        score: input.score,
        category: input.category,
        created_at,
        updated_at: timestamp,
    };
    set_record(store, ANSWERS, &key, &answer).await?;

    info!(answer_id = %key, "Answer saved");
    Ok(answer)
}

pub async fn get_answer(
    store: &dyn RecordStore,
    user_id: &str,
    question_id: &str,
) -> Result<Option<Answer>> {
    load_answer(store, user_id, question_id).await
}

/// Every answer of one user, ordered by key
pub async fn list_answers_for_user(store: &dyn RecordStore, user_id: &str) -> Result<Vec<Answer>> {
    let filter = RecordFilter::FieldEquals("user_id".to_string(), Value::from(user_id));
    list_records(store, ANSWERS, &filter).await
}

/// Replace the fields of an existing answer; `None` when absent
pub async fn update_answer(
    store: &dyn RecordStore,
    user_id: &str,
    question_id: &str,
    input: AnswerInput,
) -> Result<Option<Answer>> {
    let Some(mut answer) = load_answer(store, user_id, question_id).await? else {
        return Ok(None);
    };

    let key = Answer::key(user_id, question_id);
    answer.answer_text = input.answer_text;
    answer.score = input.score;
    if input.category.is_some() {
        answer.category = input.category;
    }
    answer.updated_at = now();
    set_record(store, ANSWERS, &key, &answer).await?;

    info!(answer_id = %key, "Answer updated");
    Ok(Some(answer))
}

/// Returns whether the answer existed
pub async fn delete_answer(store: &dyn RecordStore, user_id: &str, question_id: &str) -> Result<bool> {
    if load_answer(store, user_id, question_id).await?.is_none() {
        return Ok(false);
    }

    let key = Answer::key(user_id, question_id);
    let deleted = store.delete(ANSWERS, &key).await?;
    if deleted {
        info!(answer_id = %key, "Answer deleted");
    }
    Ok(deleted)
}
