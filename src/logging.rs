//! Logging setup
//!
//! All diagnostics go to stderr so that stdout carries nothing but the
//! balance CSV. `RUST_LOG` overrides the configured level when set.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber
///
/// `level` is any `EnvFilter` directive (`warn`, `info`,
/// `rust_transfer_batcher=debug`, ...). Calling this more than once is a
/// no-op.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();
}
