//! qss-qp library - questionnaire processing service
//!
//! Scores questionnaire visits into ranked per-category totals, serves the
//! answer/category/visit records, and forwards each submitted visit to the
//! chatbot endpoint in the background.

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use qss_common::RecordStore;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod dispatch;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod scoring;
pub mod services;

pub use dispatch::{ChatbotError, ChatbotSink, DispatchError, Dispatcher, HttpChatbot};
pub use error::{ApiError, ApiResult};
pub use fetch::{fetch_with_retries, FetchError, RetryPolicy};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Answer, category and visit records
    pub store: Arc<dyn RecordStore>,
    /// Background scoring and forwarding of submitted visits
    pub dispatcher: Dispatcher,
    /// Service start, for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Arc<dyn RecordStore>, dispatcher: Dispatcher) -> Self {
        Self {
            store,
            dispatcher,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::process_routes())
        .merge(api::category_routes())
        .merge(api::visit_routes())
        .merge(api::answer_routes())
        .merge(api::score_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
