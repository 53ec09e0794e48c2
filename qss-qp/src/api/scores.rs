//! Score endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use super::answers::MSG_ANSWER_NOT_FOUND;
use crate::error::{ApiError, ApiResult};
use crate::services::answers::parse_score;
use crate::services::scores::{self, AnswerScore};
use crate::AppState;

/// GET /:user_id/:question_id/score
pub async fn get_score(
    State(state): State<AppState>,
    Path((user_id, question_id)): Path<(String, String)>,
) -> ApiResult<Json<AnswerScore>> {
    scores::get_score(state.store.as_ref(), &user_id, &question_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::message(StatusCode::NOT_FOUND, MSG_ANSWER_NOT_FOUND))
}

/// PUT /:user_id/:question_id/score
///
/// Accepts `{"score": n}` or a full answer body whose `score` is itself
/// `{"score": n, ...}`. A missing answer is a 400.
pub async fn update_score(
    State(state): State<AppState>,
    Path((user_id, question_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let score = body
        .get("score")
        .and_then(parse_score)
        .ok_or_else(|| ApiError::message(StatusCode::BAD_REQUEST, "Invalid input data"))?;

    scores::update_score(state.store.as_ref(), &user_id, &question_id, score)
        .await?
        .ok_or_else(|| ApiError::message(StatusCode::BAD_REQUEST, MSG_ANSWER_NOT_FOUND))?;

    Ok(Json(json!({ "message": "Score updated successfully" })))
}

/// Build score routes
pub fn score_routes() -> Router<AppState> {
    Router::new().route(
        "/:user_id/:question_id/score",
        get(get_score).put(update_score),
    )
}
