//! Telemetry and Observability
//!
//! Sets up `tracing-subscriber` once per process. The filter comes from
//! `RUST_LOG` when set, otherwise from the configured log level. Output is
//! pretty in debug builds and JSON in release builds unless overridden.

use std::str::FromStr;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output
    Pretty,

    /// One JSON object per event, with the current span
    Json,
}

impl LogFormat {
    /// Pretty in debug builds, JSON in release builds
    pub fn for_build() -> Self {
        if cfg!(debug_assertions) {
            LogFormat::Pretty
        } else {
            LogFormat::Json
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}' (pretty, json)", other)),
        }
    }
}

/// Filter directive used when `RUST_LOG` is not set
fn default_directive(log_level: &str) -> String {
    format!(
        "{},chatrelay_engine={},api_server={}",
        log_level, log_level, log_level
    )
}

/// Initialize the tracing subscriber.
///
/// Priority: `RUST_LOG` env var > `log_level` parameter.
/// Later calls are no-ops.
pub fn init_telemetry(log_level: &str, format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(log_level)));

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_target(false))
            .try_init()
            .ok(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
            .ok(),
    };
}
