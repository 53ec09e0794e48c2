//! Answer endpoints
//!
//! Responses use plain `{"message": ...}` bodies.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use qss_common::models::Answer;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::services::answers::{self, AnswerInput};
use crate::AppState;

pub const MSG_ANSWER_NOT_FOUND: &str = "Answer not found";

fn answer_not_found() -> ApiError {
    ApiError::message(StatusCode::NOT_FOUND, MSG_ANSWER_NOT_FOUND)
}

/// POST /:user_id/:question_id/answer
pub async fn create_answer(
    State(state): State<AppState>,
    Path((user_id, question_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let input = AnswerInput::from_body(&body)
        .ok_or_else(|| ApiError::message(StatusCode::BAD_REQUEST, "Invalid input data"))?;

    answers::save_answer(state.store.as_ref(), &user_id, &question_id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Answer saved successfully",
            "answer_id": Answer::key(&user_id, &question_id),
        })),
    ))
}

/// GET /:user_id/:question_id/answer
pub async fn get_answer(
    State(state): State<AppState>,
    Path((user_id, question_id)): Path<(String, String)>,
) -> ApiResult<Json<Answer>> {
    answers::get_answer(state.store.as_ref(), &user_id, &question_id)
        .await?
        .map(Json)
        .ok_or_else(answer_not_found)
}

/// PUT /:user_id/:question_id/answer
pub async fn update_answer(
    State(state): State<AppState>,
    Path((user_id, question_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let input = AnswerInput::from_body(&body)
        .ok_or_else(|| ApiError::message(StatusCode::BAD_REQUEST, "Missing required fields"))?;

    answers::update_answer(state.store.as_ref(), &user_id, &question_id, input)
        .await?
        .ok_or_else(answer_not_found)?;

    Ok(Json(json!({ "message": "Answer updated successfully" })))
}

/// DELETE /:user_id/:question_id/answer
pub async fn delete_answer(
    State(state): State<AppState>,
    Path((user_id, question_id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    if !answers::delete_answer(state.store.as_ref(), &user_id, &question_id).await? {
        return Err(answer_not_found());
    }
    Ok(Json(json!({ "message": "Answer deleted successfully" })))
}

/// GET /:user_id/answers
pub async fn list_answers(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Answer>>> {
    let list = answers::list_answers_for_user(state.store.as_ref(), &user_id).await?;
    if list.is_empty() {
        return Err(ApiError::message(
            StatusCode::NOT_FOUND,
            "No answers found for this user",
        ));
    }
    Ok(Json(list))
}

/// Build answer routes
pub fn answer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:user_id/:question_id/answer",
            get(get_answer)
                .post(create_answer)
                .put(update_answer)
                .delete(delete_answer),
        )
        .route("/:user_id/answers", get(list_answers))
}
