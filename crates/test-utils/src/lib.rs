//! Shared helpers for `monitored-cron` integration tests.
//!
//! - [`JobFileBuilder`] writes job files into a temp dir
//! - [`RecordingSink`] captures log events instead of sending them to syslog
//! - [`FakeNotifier`] records pings instead of making HTTP requests

pub mod builders;
pub mod fake_notifier;
pub mod recording_sink;

use std::sync::Once;

use monitored_cron::logging::LOG_ENV;
use tracing_subscriber::{EnvFilter, fmt};

pub use builders::{JobFile, JobFileBuilder};
pub use fake_notifier::FakeNotifier;
pub use recording_sink::RecordingSink;

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// Output goes through `with_test_writer()`, so it only shows up for failing
/// tests (or with `-- --nocapture`). The level comes from `MONITORED_CRON_LOG`,
/// defaulting to `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}
