//! Tracing initialization for the operator
//!
//! Hook executions are short-lived processes whose stderr the platform
//! captures into the unit's debug log, so output stays in plain fmt form
//! rather than JSON.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{Error, Result};

/// Default filter when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "info,h2o_operator=debug";

/// Initialize the tracing subscriber.
///
/// Respects `RUST_LOG` when set; otherwise logs the operator at debug and
/// everything else at info.
pub fn init() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| Error::internal_with_context("telemetry", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_covers_operator_crate() {
        assert!(DEFAULT_FILTER.contains("h2o_operator=debug"));
    }

    #[test]
    fn init_twice_reports_internal_error() {
        // First call may or may not win depending on test ordering; the
        // second is guaranteed to hit the already-initialized path.
        let _ = init();
        let err = init().expect_err("second init must fail");
        assert!(matches!(err, Error::Internal { .. }));
    }
}
