//! The platform update service seam.
//!
//! On platforms with a native in-app update mechanism, the mechanism itself
//! lives outside this crate. [`PlatformUpdateService`] is the narrow surface
//! the orchestrator and the lifecycle manager need from it: an availability
//! query, the two ways of starting an update, the final install step, and a
//! feed of install statuses in the platform's own vocabulary.
//!
//! Adapters that receive statuses on a [`tokio::sync::broadcast`] channel
//! can hand them out with [`broadcast_feed`].

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;
use tracing::warn;

use crate::core::UpdateResult;
use crate::status::PlatformInstallStatus;

/// The platform a flow runs on, which decides the update mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetPlatform {
    /// Platform-driven update service with an install lifecycle feed.
    Android,
    /// Store metadata lookup and a prompt to visit the store.
    Ios,
    /// No update mechanism.
    Other,
}

impl TargetPlatform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Self::Android
        } else if cfg!(target_os = "ios") {
            Self::Ios
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Other => "other",
        })
    }
}

/// Answer to "is there an update, and how may it be applied?".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateAvailability {
    /// A newer build is published for this installation.
    pub available: bool,
    /// The platform currently allows a blocking (immediate) update.
    pub immediate_permitted: bool,
    /// The platform currently allows a background (flexible) update.
    pub flexible_permitted: bool,
}

impl UpdateAvailability {
    /// No update published.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Outcome of asking the platform to start a flexible update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexibleStart {
    /// The user accepted and the download has been scheduled.
    Started,
    /// The user or the platform declined.
    Denied,
}

/// Operations exposed by a platform-driven update mechanism.
#[async_trait]
pub trait PlatformUpdateService: Send + Sync {
    /// Query whether an update is published and which modes are allowed.
    async fn check_availability(&self) -> UpdateResult<UpdateAvailability>;

    /// Run the blocking, platform-driven update flow.
    async fn perform_immediate(&self) -> UpdateResult<()>;

    /// Ask the platform to start downloading in the background.
    async fn start_flexible(&self) -> UpdateResult<FlexibleStart>;

    /// Install a package that finished downloading.
    async fn complete_install(&self) -> UpdateResult<()>;

    /// A new subscription to the platform's install status feed.
    ///
    /// Each call returns an independent stream; dropping it ends that
    /// subscription only.
    fn install_events(&self) -> BoxStream<'static, PlatformInstallStatus>;
}

/// Service used where no platform update mechanism exists.
///
/// Reports no update and an empty status feed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlatformService;

#[async_trait]
impl PlatformUpdateService for NoPlatformService {
    async fn check_availability(&self) -> UpdateResult<UpdateAvailability> {
        Ok(UpdateAvailability::none())
    }

    async fn perform_immediate(&self) -> UpdateResult<()> {
        Ok(())
    }

    async fn start_flexible(&self) -> UpdateResult<FlexibleStart> {
        Ok(FlexibleStart::Denied)
    }

    async fn complete_install(&self) -> UpdateResult<()> {
        Ok(())
    }

    fn install_events(&self) -> BoxStream<'static, PlatformInstallStatus> {
        stream::empty().boxed()
    }
}

/// Turn a broadcast receiver into an install status feed.
///
/// The stream ends when every sender is dropped. If the receiver falls
/// behind, the skipped statuses are logged and delivery resumes with the
/// oldest status still buffered.
pub fn broadcast_feed(
    receiver: broadcast::Receiver<PlatformInstallStatus>,
) -> BoxStream<'static, PlatformInstallStatus> {
    stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(status) => return Some((status, receiver)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Install status feed lagged, statuses were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
    .boxed()
}
