//! Tracing setup for the qss-qp binary
//!
//! The subscriber is installed before configuration is resolved, with a
//! filter taken from `RUST_LOG`, then `--log-level`/`QSS_LOG_LEVEL`, then
//! the default. Once the configuration (including its TOML `[logging]`
//! table) is known, [`LogLevel::apply`] swaps in the resolved level unless
//! `RUST_LOG` was set.

use qss_common::config::DEFAULT_LOG_LEVEL;
use tracing::{warn, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

/// Handle for changing the active filter after startup
pub struct LogLevel {
    handle: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogLevel {
    /// Replace the filter with `directive`; no-op when `RUST_LOG` is set
    pub fn apply(&self, directive: &str) {
        if self.from_env {
            return;
        }
        if let Err(e) = self.handle.reload(EnvFilter::new(directive)) {
            warn!("Failed to apply log level {}: {}", directive, e);
        }
    }
}

fn build<W>(filter: EnvFilter, from_env: bool, writer: W) -> (impl Subscriber + Send + Sync + 'static, LogLevel)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let (filter, handle) = reload::Layer::new(filter);
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer));
    (subscriber, LogLevel { handle, from_env })
}

/// Subscriber filtered by `directive`, writing formatted events to `writer`
pub fn subscriber<W>(directive: &str, writer: W) -> (impl Subscriber + Send + Sync + 'static, LogLevel)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    build(EnvFilter::new(directive), false, writer)
}

/// Install the global subscriber writing to stdout
pub fn init(cli_level: Option<&str>) -> Result<LogLevel, TryInitError> {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(cli_level.unwrap_or(DEFAULT_LOG_LEVEL)), false),
    };

    let (subscriber, level) = build(filter, from_env, std::io::stdout);
    subscriber.try_init()?;
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qss_common::config::{CliOverrides, ConfigResolver};
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_config_warnings_reach_subscriber() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let (subscriber, _level) = subscriber("info", move || writer.clone());

        tracing::subscriber::with_default(subscriber, || {
            let cli = CliOverrides {
                config_file: Some(PathBuf::from("/nonexistent/qss-qp/config.toml")),
                ..Default::default()
            };
            let _ = ConfigResolver::new(cli);
        });

        assert!(
            buf.contents().contains("Ignoring config file /nonexistent/qss-qp/config.toml"),
            "{}",
            buf.contents()
        );
    }

    #[test]
    fn test_apply_swaps_filter() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let (subscriber, level) = subscriber("info", move || writer.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("visible at info");
            level.apply("error");
            tracing::warn!("hidden after apply");
            tracing::error!("still visible");
        });

        let output = buf.contents();
        assert!(output.contains("visible at info"));
        assert!(!output.contains("hidden after apply"));
        assert!(output.contains("still visible"));
    }

    #[test]
    fn test_apply_keeps_env_filter() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let (subscriber, mut level) = subscriber("info", move || writer.clone());
        level.from_env = true;

        tracing::subscriber::with_default(subscriber, || {
            level.apply("error");
            tracing::info!("env filter still active");
        });

        assert!(buf.contents().contains("env filter still active"));
    }
}
