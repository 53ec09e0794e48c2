//! Shared fixtures for qss-qp integration tests
//!
//! - [`StubServer`]: local axum server on an ephemeral port with a hit counter
//! - [`LogCapture`]: tracing layer recording level and message of each event
//! - [`RecordingSink`] / [`FailingSink`]: chatbot stand-ins

#![allow(dead_code)]

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

use qss_qp::scoring::NormalizedResult;
use qss_qp::{ChatbotError, ChatbotSink, RetryPolicy};

/// Local HTTP server standing in for a remote endpoint
pub struct StubServer {
    pub addr: SocketAddr,
    pub hits: Arc<AtomicUsize>,
}

impl StubServer {
    /// Serve `router` until the test runtime shuts down
    pub async fn start(router: Router, hits: Arc<AtomicUsize>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        Self { addr, hits }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Address nothing is listening on
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind spare port");
    listener.local_addr().expect("spare port address")
}

/// Fast policy for tests: tiny backoff, no jitter
pub fn quick_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay: Duration::from_millis(1),
        timeout: Duration::from_secs(2),
        max_jitter: Duration::ZERO,
    }
}

/// One recorded tracing event
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Tracing layer keeping every event for later assertions
#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    /// Install as the thread's default subscriber until the guard drops.
    ///
    /// Use with current-thread runtimes so spawned tasks log here too.
    pub fn install() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().expect("capture lock").clone()
    }

    /// Messages logged at exactly `level`
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }
}

#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push((field.name().to_string(), format!("{:?}", value)));
        }
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);
        self.events.lock().expect("capture lock").push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

/// Chatbot that keeps every result it receives
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub received: Arc<Mutex<Vec<NormalizedResult>>>,
}

impl RecordingSink {
    pub fn received(&self) -> Vec<NormalizedResult> {
        self.received.lock().expect("sink lock").clone()
    }
}

#[async_trait]
impl ChatbotSink for RecordingSink {
    async fn send(&self, result: &NormalizedResult) -> Result<(), ChatbotError> {
        self.received.lock().expect("sink lock").push(result.clone());
        Ok(())
    }
}

/// Chatbot that always fails with a fixed message
pub struct FailingSink(pub &'static str);

#[async_trait]
impl ChatbotSink for FailingSink {
    async fn send(&self, _result: &NormalizedResult) -> Result<(), ChatbotError> {
        Err(ChatbotError(self.0.to_string()))
    }
}
