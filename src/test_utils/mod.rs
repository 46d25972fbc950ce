//! Test utilities for inapp-update
//!
//! Fakes for every collaborator the orchestrator drives, plus logging setup
//! for tests. Available to unit tests and, through the `test-utils` feature,
//! to the integration suite.
//!
//! # Example
//!
//! ```rust,no_run
//! use inapp_update::status::PlatformInstallStatus;
//! use inapp_update::test_utils::FakeUpdateService;
//!
//! let service = FakeUpdateService::new();
//! service.emit(PlatformInstallStatus::Downloading);
//! ```

pub mod fakes;

pub use fakes::{FakeMetadataSource, FakeUpdateService, RecordingLauncher, RecordingPrompt};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` if given, otherwise
/// `RUST_LOG` if set; with neither, tests run without logging.
///
/// ```bash
/// RUST_LOG=inapp_update=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
