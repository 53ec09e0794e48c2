//! Synchronous scoring endpoint

use axum::{routing::post, Json, Router};
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiResult;
use crate::scoring::{process_value, NormalizedResult, ValidationReport};
use crate::AppState;

/// Ranked result plus its advisory validation
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub result: NormalizedResult,
    pub validation: ValidationReport,
}

/// POST /process
///
/// Runs the scoring pipeline on the request body without storing or
/// forwarding anything.
pub async fn process(Json(body): Json<Value>) -> ApiResult<Json<ProcessResponse>> {
    let result = process_value(&body)?;
    let validation = result.validate();
    Ok(Json(ProcessResponse { result, validation }))
}

/// Build processing routes
pub fn process_routes() -> Router<AppState> {
    Router::new().route("/process", post(process))
}
