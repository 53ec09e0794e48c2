//! Category endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use qss_common::models::Category;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::services::categories::{self, CategoryInput, CategoryUpdate};
use crate::AppState;

fn category_not_found() -> ApiError {
    ApiError::message(StatusCode::NOT_FOUND, "Category not found")
}

/// POST /categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = categories::create_category(state.store.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /categories
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(categories::list_categories(state.store.as_ref()).await?))
}

/// GET /categories/:name
pub async fn get_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Category>> {
    categories::get_category(state.store.as_ref(), &name)
        .await?
        .map(Json)
        .ok_or_else(category_not_found)
}

/// PUT /categories/:name
pub async fn update_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(update): Json<CategoryUpdate>,
) -> ApiResult<Json<Category>> {
    categories::update_category(state.store.as_ref(), &name, update)
        .await?
        .map(Json)
        .ok_or_else(category_not_found)
}

/// DELETE /categories/:name
pub async fn delete_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    if !categories::delete_category(state.store.as_ref(), &name).await? {
        return Err(category_not_found());
    }
    Ok(Json(json!({ "message": "Category deleted successfully" })))
}

/// Build category routes
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:name",
            get(get_category).put(update_category).delete(delete_category),
        )
}
