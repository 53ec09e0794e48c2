//! Visit endpoints
//!
//! `GET /:user_id/visits/:visit_id` doubles as the visit source the
//! dispatcher fetches from.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use qss_common::models::Visit;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::services::visits;
use crate::AppState;

fn visit_not_found(user_id: &str, visit_id: &str) -> ApiError {
    ApiError::NotFound(format!("Visit '{}' not found for user '{}'", visit_id, user_id))
}

/// POST /submit_visit
///
/// Stores the visit, then scores and forwards it in the background.
pub async fn submit_visit(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let visit = visits::submit_visit(state.store.as_ref(), &body).await?;

    let dispatcher = state.dispatcher.clone();
    tokio::spawn(async move {
        dispatcher
            .process_data_async(&visit.user_id, &visit.visit_id)
            .await;
    });
    debug!("Dispatch task spawned");

    Ok((StatusCode::CREATED, Json(json!({ "status": "success" }))))
}

/// GET /:user_id/visits
pub async fn list_visits(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Visit>>> {
    Ok(Json(visits::list_visits(state.store.as_ref(), &user_id).await?))
}

/// GET /:user_id/visits/:visit_id
pub async fn get_visit(
    State(state): State<AppState>,
    Path((user_id, visit_id)): Path<(String, String)>,
) -> ApiResult<Json<Visit>> {
    visits::get_visit(state.store.as_ref(), &user_id, &visit_id)
        .await?
        .map(Json)
        .ok_or_else(|| visit_not_found(&user_id, &visit_id))
}

/// DELETE /:user_id/visits/:visit_id
pub async fn delete_visit(
    State(state): State<AppState>,
    Path((user_id, visit_id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    if !visits::delete_visit(state.store.as_ref(), &user_id, &visit_id).await? {
        return Err(visit_not_found(&user_id, &visit_id));
    }
    Ok(Json(json!({ "status": "success" })))
}

/// DELETE /:user_id/visits
pub async fn delete_visits_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let deleted = visits::delete_visits_for_user(state.store.as_ref(), &user_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!("No visits found for user '{}'", user_id)));
    }
    Ok(Json(json!({ "status": "success", "deleted": deleted })))
}

/// Build visit routes
pub fn visit_routes() -> Router<AppState> {
    Router::new()
        .route("/submit_visit", post(submit_visit))
        .route(
            "/:user_id/visits",
            get(list_visits).delete(delete_visits_for_user),
        )
        .route(
            "/:user_id/visits/:visit_id",
            get(get_visit).delete(delete_visit),
        )
}
