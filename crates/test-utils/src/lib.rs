//! Shared fixtures for the `rosdocgen` test suites.

pub mod builders;
pub mod fake_backend;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

/// Upper bound for a single async test. Real-process tests wait on shell
/// scripts and signal escalation, so this is generous.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

static INIT: Once = Once::new();

/// Route supervisor and batch logs into the test harness output.
///
/// Reads the same `ROSDOCGEN_LOG` directives as the binary, defaulting to
/// `debug` for this crate so forwarded process output shows up next to a
/// failing assertion.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(rosdocgen::logging::LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new("info,rosdocgen=debug"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Fail the test instead of hanging when a supervised run never finishes.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("supervised run did not finish within {TEST_TIMEOUT:?}"),
    }
}
