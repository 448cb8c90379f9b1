//! Structured logging setup using `tracing-subscriber`.
//!
//! Logs go to stderr only, so command output on stdout stays clean:
//! - **Text** ([`init_cli`]): human-readable lines
//! - **JSON** ([`init_json`]): one JSON object per line, for log shippers
//!
//! Both honour `RUST_LOG` (default: `info`).

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialise human-readable logging to stderr.
pub fn init_cli() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Initialise JSON-lines logging to stderr.
pub fn init_json() {
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(json_layer)
        .init();
}
