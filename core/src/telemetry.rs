//! Tracing subscriber setup for programs that use `TracingLogHandler`.
//!
//! Call [`init_tracing`] once at startup. Later calls do nothing, since the
//! global subscriber can only be installed once per process.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise events at `level` and above are kept.
/// With `json`, every event is written as one JSON line.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(fmt::layer().json()).try_init().ok();
    } else {
        registry.with(fmt::layer()).try_init().ok();
    }
}

