//! inapp-update - cross-platform in-app update flow
//!
//! A single entry point that decides whether a newer version of the running
//! application is available and walks the user through installing it:
//!
//! - On Android the platform update service is asked for availability and an
//!   immediate (blocking) or flexible (background) update is started. Install
//!   progress of a flexible update is relayed to an optional status callback,
//!   and the downloaded update can be completed automatically.
//! - On iOS the installed version is compared with the version published in
//!   the store lookup. When the store is ahead, an update prompt is shown and
//!   accepting opens the store page.
//!
//! # Core Modules
//!
//! - [`orchestrator`] - [`UpdateOrchestrator`], the entry point that dispatches per platform
//! - [`lifecycle`] - Install-status subscriptions with replace-on-resubscribe semantics
//! - [`status`] - Platform status codes and their canonical [`InstallStatus`] mapping
//! - [`version`] - The dotted-numeric "is newer" rule
//! - [`platform`] - The [`PlatformUpdateService`] seam over the native update API
//! - [`store`] - Store metadata lookup and installed-version sources
//! - [`presentation`] - Update prompt and storefront navigation seams
//! - [`config`] - [`UpdateFlowConfig`], loadable from TOML
//! - [`core`] - Error types and user-facing error formatting
//! - [`cli`] - The `inapp-update` command-line front end
//!
//! # Example
//!
//! ```rust,no_run
//! use inapp_update::{InstallStatus, StatusCallback, UpdateFlowConfig, UpdateMode};
//!
//! let config = UpdateFlowConfig::new(UpdateMode::Flexible)
//!     .with_auto_complete(true)
//!     .with_on_status(StatusCallback::new(|status: InstallStatus| {
//!         println!("install status: {status}");
//!         Ok(())
//!     }));
//! ```
//!
//! # Configuration File
//!
//! ```toml
//! mode = "flexible"
//! auto_complete = true
//! app_id = "284882215"
//! lookup_timeout_ms = 10000
//!
//! [dialog]
//! title = "Update available"
//! message = "Version {available} is available. You have {installed}."
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod lifecycle;
pub mod orchestrator;
pub mod platform;
pub mod presentation;
pub mod status;
pub mod store;
pub mod version;

// Test utilities (only compiled for tests or with the test-utils feature)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::config::{UpdateFlowConfig, UpdateMode};
pub use crate::core::{FailureKind, UpdateError, UpdateResult};
pub use lifecycle::{LifecycleManager, StatusCallback};
pub use orchestrator::{FlowOutcome, UpdateOrchestrator, UpdateServices};
pub use platform::{PlatformUpdateService, TargetPlatform};
pub use status::{InstallStatus, PlatformInstallStatus, map_status};
pub use version::{VersionComparator, is_newer};
