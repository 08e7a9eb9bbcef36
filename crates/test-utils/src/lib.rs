pub mod builders;
pub mod recorders;

use std::sync::Once;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

const RUN_DEADLINE: Duration = Duration::from_secs(5);

/// Route `tracing` output from the crate under test into the harness's
/// captured output. Safe to call from every test; only the first call
/// installs a subscriber. The filter is read from `RUST_LOG`, falling back to
/// `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, failing the test if a run hangs for more than five seconds.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(RUN_DEADLINE, f)
        .await
        .unwrap_or_else(|_| panic!("run did not finish within {RUN_DEADLINE:?}"))
}
