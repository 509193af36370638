//! Logging and tracing initialization.
//!
//! Two output modes:
//! - **JSON mode** (`json = true`): one JSON object per line with UTC
//!   millisecond timestamps, for log aggregation.
//! - **Pretty mode** (`json = false`): human-readable output for local runs.
//!
//! Both modes respect `RUST_LOG` (e.g., `RUST_LOG=aurum_forecast=debug`)
//! and default to `info`.

use std::fmt;

use anyhow::{Context, Result};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter directive used when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "info";

/// Initialize the global tracing subscriber.
///
/// Fails if a global subscriber has already been set.
pub fn init_tracing(json: bool) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_timer(UtcMillisTimer)
            .with_target(true)
            .with_current_span(true);

        registry
            .with(json_layer)
            .try_init()
            .context("failed to install JSON tracing subscriber")
    } else {
        let pretty_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE);

        registry
            .with(pretty_layer)
            .try_init()
            .context("failed to install tracing subscriber")
    }
}

/// RFC 3339 timestamps in UTC with millisecond precision.
#[derive(Debug, Clone)]
struct UtcMillisTimer;

impl tracing_subscriber::fmt::time::FormatTime for UtcMillisTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let now = chrono::Utc::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3fZ"))
    }
}
