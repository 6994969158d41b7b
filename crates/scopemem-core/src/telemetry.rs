//! Log output for the `scopemem` CLI.
//!
//! Logs always go to stderr. Stdout is reserved for command results, so
//! `scopemem query --format json | jq` keeps working with logging enabled.
//! The CLI maps `--verbose` to `DEBUG` (default `INFO`) and `--json` to
//! newline-delimited JSON log lines; `RUST_LOG` overrides the level.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the process-wide subscriber used by `scopemem`.
///
/// `level` applies only when `RUST_LOG` is unset or unparsable, so
/// `RUST_LOG=scopemem_core=trace` beats `--verbose`. A second call keeps the
/// first subscriber and logs a `debug!` line through it.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if json {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .json(),
            )
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

