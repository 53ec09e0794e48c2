//! Async visit dispatch
//!
//! Fetch a stored visit from the visit source, run the scoring pipeline and
//! forward the ranked result to the chatbot endpoint. Failures never escape
//! [`Dispatcher::process_data_async`]; they are logged once and dropped.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::fetch::{fetch_with_retries, FetchError, RetryPolicy};
use crate::scoring::{process_data, NormalizedResult, ProcessError, RawSubmission};

/// Chatbot endpoint rejected or never received a result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ChatbotError(pub String);

/// Receiver of normalized results
#[async_trait]
pub trait ChatbotSink: Send + Sync {
    async fn send(&self, result: &NormalizedResult) -> Result<(), ChatbotError>;
}

/// [`ChatbotSink`] that POSTs the result as JSON
pub struct HttpChatbot {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpChatbot {
    pub fn new(client: Client, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatbotSink for HttpChatbot {
    async fn send(&self, result: &NormalizedResult) -> Result<(), ChatbotError> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&result.to_value())
            .send()
            .await
            .map_err(|e| ChatbotError(format!("Chatbot request to {} failed: {}", self.endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatbotError(format!(
                "Chatbot endpoint {} returned {}: {}",
                self.endpoint, status, body
            )));
        }

        debug!(endpoint = %self.endpoint, "Result delivered to chatbot");
        Ok(())
    }
}

/// Failure anywhere along fetch → process → forward
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Chatbot(#[from] ChatbotError),

    #[error("Invalid visit source URL {base}: {reason}")]
    VisitSource { base: String, reason: String },
}

/// Background processor for submitted visits
#[derive(Clone)]
pub struct Dispatcher {
    client: Client,
    visit_source_base: String,
    policy: RetryPolicy,
    chatbot: Arc<dyn ChatbotSink>,
}

impl Dispatcher {
    pub fn new(
        client: Client,
        visit_source_base: impl Into<String>,
        policy: RetryPolicy,
        chatbot: Arc<dyn ChatbotSink>,
    ) -> Self {
        let base: String = visit_source_base.into();
        Self {
            client,
            visit_source_base: base.trim_end_matches('/').to_string(),
            policy,
            chatbot,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Visit source URL for one visit.
    ///
    /// Ids are appended as percent-encoded path segments, so `/`, `?`, `#`
    /// and `%` inside an id stay part of that segment.
    pub fn visit_url(&self, user_id: &str, visit_id: &str) -> Result<Url, DispatchError> {
        let invalid = |reason: String| DispatchError::VisitSource {
            base: self.visit_source_base.clone(),
            reason,
        };

        let mut url = Url::parse(&self.visit_source_base).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(user_id)
            .push("visits")
            .push(visit_id);
        Ok(url)
    }

    /// Fetch, score and forward one visit, returning the forwarded result
    pub async fn dispatch(
        &self,
        user_id: &str,
        visit_id: &str,
    ) -> Result<NormalizedResult, DispatchError> {
        let url = self.visit_url(user_id, visit_id)?;
        let body = fetch_with_retries(url.as_str(), &self.client, &self.policy).await?;

        let raw = RawSubmission::from_value(&body)?;
        let result = process_data(&raw);

        let report = result.validate();
        if !report.is_valid() {
            warn!(
                user_id = %user_id,
                visit_id = %visit_id,
                messages = ?report.messages,
                "Normalized result failed validation"
            );
        }

        self.chatbot.send(&result).await?;

        info!(
            user_id = %user_id,
            visit_id = %visit_id,
            categories = result.categories.len(),
            "Visit dispatched"
        );
        Ok(result)
    }

    /// Fire-and-forget form of [`Dispatcher::dispatch`]
    pub async fn process_data_async(&self, user_id: &str, visit_id: &str) {
        if let Err(e) = self.dispatch(user_id, visit_id).await {
            error!(user_id = %user_id, visit_id = %visit_id, "Processing failed: {}", e);
        }
    }
}
