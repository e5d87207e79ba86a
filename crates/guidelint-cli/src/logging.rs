//! Diagnostic logging for the binary
//!
//! Logs go to stderr so they never mix with the report on stdout.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding the `EnvFilter` directives.
pub const LOG_ENV: &str = "GUIDELINT_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
