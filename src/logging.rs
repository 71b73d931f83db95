//! Logging setup for addon-release.
//!
//! Logs go to stderr so that stdout carries nothing but the metadata record.
//! `RUST_LOG` takes precedence over the level chosen on the command line.

use std::io;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log level used with `--verbose`.
pub const VERBOSE_LOG_LEVEL: &str = "debug";

/// Installs the global stderr subscriber.
///
/// Calling it twice is harmless; the second subscriber is discarded.
pub fn init(verbose: bool) {
    let level = if verbose {
        VERBOSE_LOG_LEVEL
    } else {
        DEFAULT_LOG_LEVEL
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_line_number(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();
}
