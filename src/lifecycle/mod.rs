//! Tracking a flexible update through its install lifecycle.
//!
//! Once a flexible update has started, the platform reports its progress on
//! an event feed. [`LifecycleManager`] relays that feed to callers in the
//! canonical [`InstallStatus`] vocabulary, two ways:
//!
//! - **Stream**: [`LifecycleManager::status_stream`] returns a fresh
//!   subscription every call; any number of listeners can consume at once.
//! - **Callback**: [`LifecycleManager::track_lifecycle`] registers at most one
//!   [`StatusCallback`]. Registering another one stops the first.
//!
//! With auto-completion enabled, a `downloaded` status triggers
//! [`LifecycleManager::complete`] and ends the internal subscription.
//! Without it, the caller decides when to call `complete`.
//!
//! The callback subscription and the anonymous auto-complete subscription
//! share one [`SubscriptionSlot`]: starting either kind stops the other, so
//! at most one internal subscription is alive per manager.
//!
//! # Callback isolation
//!
//! A callback that returns an error or panics is logged and skipped. The
//! subscription keeps running and auto-completion still happens.
//!
//! # Examples
//!
//! ```rust,no_run
//! use inapp_update::lifecycle::{LifecycleManager, StatusCallback};
//! use inapp_update::platform::NoPlatformService;
//! use inapp_update::status::InstallStatus;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let manager = LifecycleManager::new(Arc::new(NoPlatformService));
//!
//! let on_status = StatusCallback::new(|status| {
//!     println!("update is {status}");
//!     Ok(())
//! });
//! manager.track_lifecycle(Some(on_status), true);
//!
//! // Later, e.g. when the user leaves the update screen.
//! manager.stop();
//! # }
//! ```

pub mod slot;

use futures::stream::{BoxStream, StreamExt};
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::platform::PlatformUpdateService;
use crate::status::{InstallStatus, PlatformInstallStatus};
pub use slot::{Lease, SubscriptionSlot};

/// Caller-supplied function invoked with every status of a tracked update.
///
/// Errors returned by the function, and panics raised inside it, are logged
/// and never reach the subscription.
#[derive(Clone)]
pub struct StatusCallback(Arc<dyn Fn(InstallStatus) -> anyhow::Result<()> + Send + Sync>);

impl StatusCallback {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(InstallStatus) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(callback))
    }

    /// Invoke the callback behind a catch-log-continue boundary.
    ///
    /// Returns `true` if the callback returned `Ok`.
    pub fn invoke_guarded(&self, status: InstallStatus) -> bool {
        match catch_unwind(AssertUnwindSafe(|| (self.0)(status))) {
            Ok(Ok(())) => true,
            Ok(Err(error)) => {
                warn!(%status, error = %format!("{error:#}"), "Status callback returned an error");
                false
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());
                warn!(%status, panic = %message, "Status callback panicked");
                false
            }
        }
    }
}

impl fmt::Debug for StatusCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StatusCallback(..)")
    }
}

/// What the internal subscription delivers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubscriptionKind {
    /// Relays every status to a [`StatusCallback`].
    Callback,
    /// No callback; only waits for `downloaded` to complete the install.
    AutoComplete,
}

/// Relays install statuses from the platform feed to callers.
///
/// Owns the single [`SubscriptionSlot`] for internal subscriptions. The
/// subscription ends on [`stop`](Self::stop), on auto-completion, or when
/// the manager is dropped.
pub struct LifecycleManager {
    service: Arc<dyn PlatformUpdateService>,
    subscription: SubscriptionSlot<SubscriptionKind>,
}

impl LifecycleManager {
    pub fn new(service: Arc<dyn PlatformUpdateService>) -> Self {
        Self {
            service,
            subscription: SubscriptionSlot::new(),
        }
    }

    /// Start relaying install statuses.
    ///
    /// | `on_status` | `auto_complete` | effect                                          |
    /// |-------------|-----------------|-------------------------------------------------|
    /// | `Some`      | any             | replaces any subscription with a callback one   |
    /// | `None`      | `true`          | replaces any subscription with one that only completes |
    /// | `None`      | `false`         | nothing; use the stream and call `complete`     |
    ///
    /// The feed is subscribed before this returns, so no status emitted
    /// afterwards is missed. Must be called from within a Tokio runtime.
    pub fn track_lifecycle(&self, on_status: Option<StatusCallback>, auto_complete: bool) {
        match on_status {
            Some(callback) => {
                let events = self.service.install_events();
                let service = Arc::clone(&self.service);
                let replaced = self.subscription.acquire(SubscriptionKind::Callback, |lease| {
                    relay(service, events, Some(callback), auto_complete, lease)
                });
                debug!(auto_complete, replaced, "Tracking install lifecycle with callback");
            }
            None if auto_complete => {
                let events = self.service.install_events();
                let service = Arc::clone(&self.service);
                let replaced = self
                    .subscription
                    .acquire(SubscriptionKind::AutoComplete, |lease| {
                        relay(service, events, None, true, lease)
                    });
                debug!(replaced, "Tracking install lifecycle for auto-completion");
            }
            None => {
                debug!("No callback or auto-completion requested, caller drives the lifecycle");
            }
        }
    }

    /// Cancel the internal subscription, if any.
    ///
    /// Idempotent and infallible. A completion call already issued keeps
    /// running.
    pub fn stop(&self) {
        if self.subscription.release() {
            debug!("Stopped install lifecycle subscription");
        }
    }

    /// Whether a callback subscription is currently running.
    pub fn is_tracking(&self) -> bool {
        self.subscription.active_kind() == Some(SubscriptionKind::Callback)
    }

    /// Whether an anonymous auto-complete subscription is currently running.
    pub fn is_auto_completing(&self) -> bool {
        self.subscription.active_kind() == Some(SubscriptionKind::AutoComplete)
    }

    /// A new listener on the platform feed, mapped to canonical statuses.
    ///
    /// Independent of the callback subscription: consuming or dropping this
    /// stream has no effect on it, and vice versa.
    pub fn status_stream(&self) -> BoxStream<'static, InstallStatus> {
        self.service.install_events().map(InstallStatus::from).boxed()
    }

    /// Install the downloaded package.
    ///
    /// Failures are logged, not returned: the caller has nothing left to
    /// decide at this point.
    pub async fn complete(&self) {
        complete_install(self.service.as_ref()).await;
    }
}

async fn complete_install(service: &dyn PlatformUpdateService) {
    match service.complete_install().await {
        Ok(()) => info!("Requested install of the downloaded update"),
        Err(error) => warn!(%error, "Failed to complete the update install"),
    }
}

async fn relay(
    service: Arc<dyn PlatformUpdateService>,
    mut events: BoxStream<'static, PlatformInstallStatus>,
    callback: Option<StatusCallback>,
    auto_complete: bool,
    lease: Lease<SubscriptionKind>,
) {
    while let Some(raw) = events.next().await {
        let status = InstallStatus::from(raw);
        debug!(%status, "Install status received");

        if let Some(callback) = &callback {
            callback.invoke_guarded(status);
        }

        if auto_complete && status == InstallStatus::Downloaded {
            info!("Update downloaded, completing install");
            // Detached so that stopping this subscription cannot cancel it.
            tokio::spawn(async move { complete_install(service.as_ref()).await });
            break;
        }
    }

    lease.release();
}
