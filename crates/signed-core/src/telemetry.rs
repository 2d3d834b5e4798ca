//! Log setup for the `git-signed` binary.
//!
//! The audit report is the product of a run: CI jobs capture stdout (the
//! success section or the JSON document) and parse it. Every log line
//! therefore goes to stderr, next to the listings, guidance and git's own
//! diagnostics, so `--log-json` and `--verbose` never corrupt the report.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global tracing subscriber.
///
/// * `json`: newline-delimited JSON events instead of text.
/// * `level`: verbosity when `RUST_LOG` is unset (`WARN` by default in the
///   binary, `DEBUG` with `--verbose`).
/// * `ansi`: colour in text events; follows `--no-color` / `NO_COLOR`.
///
/// Only the first call in a process takes effect.
pub fn init_tracing(json: bool, level: Level, ansi: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer.json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer.with_ansi(ansi))
            .try_init()
            .ok();
    }
}
