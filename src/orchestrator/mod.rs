//! The update flow entry point.
//!
//! [`UpdateOrchestrator::run`] picks one flow per invocation, based on the
//! target platform and the [`UpdateFlowConfig`]:
//!
//! ```text
//! run(platform, config)
//!  ├── platform disabled ............................ Disabled
//!  ├── Android (platform update service)
//!  │    ├── check availability ── none ............... NoUpdate
//!  │    ├── immediate ── not permitted ............... Refused
//!  │    │            └── perform immediate ........... ImmediateCompleted
//!  │    ├── flexible ── not permitted ................ Refused
//!  │    │           └── start ── denied .............. FlexibleDenied
//!  │    │                     └── track lifecycle .... FlexibleStarted
//!  │    └── remote-check (availability only) ......... UpdateAvailable
//!  └── iOS (store lookup)
//!       ├── no app id ................................ Skipped
//!       ├── installed vs store version ── not newer .. NoUpdate
//!       └── prompt ── dismiss ........................ Declined
//!                  └── proceed ── open store page .... StorefrontOpened
//! ```
//!
//! # Failure policy
//!
//! `run` never returns an error. Every collaborator failure is logged and
//! reported as [`FlowOutcome::Failed`], which callers treat like
//! [`FlowOutcome::NoUpdate`]. Nothing is retried; calling `run` again later
//! is the retry.

use futures::stream::BoxStream;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{UpdateFlowConfig, UpdateMode};
use crate::core::{FailureKind, UpdateError, UpdateResult};
use crate::lifecycle::LifecycleManager;
use crate::platform::{FlexibleStart, PlatformUpdateService, TargetPlatform};
use crate::presentation::{
    PromptDecision, PromptRequest, Storefront, StorefrontTarget, UpdatePrompt, UrlLauncher,
};
use crate::status::InstallStatus;
use crate::store::{AppStoreLookup, InstalledVersionSource, MetadataSource};
use crate::version::is_newer;

/// The external collaborators an orchestrator drives.
#[derive(Clone)]
pub struct UpdateServices {
    /// Platform update service (Android flows).
    pub platform: Arc<dyn PlatformUpdateService>,
    /// Installed version lookup (iOS flow).
    pub installed: Arc<dyn InstalledVersionSource>,
    /// Store version lookup (iOS flow). When `None`, an [`AppStoreLookup`]
    /// against the configured endpoint is used.
    pub metadata: Option<Arc<dyn MetadataSource>>,
    /// Decision prompt (iOS flow).
    pub prompt: Arc<dyn UpdatePrompt>,
    /// Store page opener (iOS flow).
    pub launcher: Arc<dyn UrlLauncher>,
}

/// What a call to [`UpdateOrchestrator::run`] decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Flows are disabled for the platform.
    Disabled,
    /// Nothing to do (no app id configured, or no update mechanism).
    Skipped,
    /// No newer version.
    NoUpdate,
    /// An update exists; the mode only asked to check.
    UpdateAvailable,
    /// The platform does not permit the requested mode.
    Refused(UpdateMode),
    /// The immediate update flow ran to completion.
    ImmediateCompleted,
    /// A flexible download started and its lifecycle is being tracked.
    FlexibleStarted,
    /// The flexible update was declined.
    FlexibleDenied,
    /// The user dismissed the update prompt.
    Declined,
    /// The user accepted and the store page was opened.
    StorefrontOpened(StorefrontTarget),
    /// A collaborator failed; treated as no update.
    Failed(FailureKind),
}

/// Chooses and drives update flows.
///
/// Owns the [`LifecycleManager`] for flexible updates, so at most one status
/// callback subscription exists per orchestrator.
pub struct UpdateOrchestrator {
    services: UpdateServices,
    lifecycle: LifecycleManager,
}

impl UpdateOrchestrator {
    pub fn new(services: UpdateServices) -> Self {
        let lifecycle = LifecycleManager::new(Arc::clone(&services.platform));
        Self {
            services,
            lifecycle,
        }
    }

    /// Run one update flow for `platform`.
    ///
    /// For flexible updates this returns once the download has started;
    /// statuses then arrive on [`status_stream`](Self::status_stream) and on
    /// the configured callback.
    ///
    /// The remote check awaits the host's answer to the update prompt, so
    /// `run` does not return until [`UpdatePrompt::ask`] resolves. Hosts
    /// that must not wait should spawn `run` or answer `ask` right away.
    pub async fn run(&self, platform: TargetPlatform, config: UpdateFlowConfig) -> FlowOutcome {
        if !config.is_enabled_for(platform) {
            info!(%platform, "Update flows are disabled for this platform");
            return FlowOutcome::Disabled;
        }

        let outcome = match platform {
            TargetPlatform::Android => self.run_platform_flow(config).await,
            TargetPlatform::Ios => self.run_remote_check(&config).await,
            TargetPlatform::Other => FlowOutcome::Skipped,
        };
        debug!(%platform, ?outcome, "Update flow settled");
        outcome
    }

    async fn run_platform_flow(&self, config: UpdateFlowConfig) -> FlowOutcome {
        let platform = &self.services.platform;

        let availability = match platform.check_availability().await {
            Ok(availability) => availability,
            Err(error) => return failed("check update availability", error),
        };
        if !availability.available {
            debug!("Platform reports no update available");
            return FlowOutcome::NoUpdate;
        }

        let mode = config.mode;
        match mode {
            UpdateMode::Immediate => {
                if !availability.immediate_permitted {
                    return refused(mode);
                }
                match platform.perform_immediate().await {
                    Ok(()) => FlowOutcome::ImmediateCompleted,
                    Err(error) => failed("perform immediate update", error),
                }
            }
            UpdateMode::Flexible => {
                if !availability.flexible_permitted {
                    return refused(mode);
                }
                match platform.start_flexible().await {
                    Ok(FlexibleStart::Started) => {
                        info!(auto_complete = config.auto_complete, "Flexible update started");
                        self.lifecycle
                            .track_lifecycle(config.on_status, config.auto_complete);
                        FlowOutcome::FlexibleStarted
                    }
                    Ok(FlexibleStart::Denied) => {
                        info!("Flexible update was declined");
                        FlowOutcome::FlexibleDenied
                    }
                    Err(error) => failed("start flexible update", error),
                }
            }
            UpdateMode::RemoteCheck => {
                info!("Update available, not starting it in check-only mode");
                FlowOutcome::UpdateAvailable
            }
        }
    }

    async fn run_remote_check(&self, config: &UpdateFlowConfig) -> FlowOutcome {
        let Some(app_id) = config.app_id() else {
            debug!("No app id configured, skipping remote version check");
            return FlowOutcome::Skipped;
        };

        match self.remote_check(app_id, config).await {
            Ok(outcome) => outcome,
            Err(error) => failed("remote version check", error),
        }
    }

    async fn remote_check(
        &self,
        app_id: &str,
        config: &UpdateFlowConfig,
    ) -> UpdateResult<FlowOutcome> {
        let installed = self.services.installed.installed_version().await?;
        let store_version = self.fetch_store_version(app_id, config).await?;

        if !is_newer(&store_version, &installed) {
            debug!(%installed, %store_version, "Installed version is current");
            return Ok(FlowOutcome::NoUpdate);
        }
        info!(%installed, %store_version, "Newer version available in the store");

        let request = PromptRequest {
            text: config.dialog.render(&installed, &store_version),
            installed_version: installed,
            store_version,
            update_available: true,
        };

        match self.services.prompt.ask(request).await? {
            PromptDecision::Dismiss => {
                debug!("Update prompt dismissed");
                Ok(FlowOutcome::Declined)
            }
            PromptDecision::Proceed => {
                let target = Storefront::new(app_id)
                    .open(self.services.launcher.as_ref())
                    .await?;
                info!(?target, "Opened store page");
                Ok(FlowOutcome::StorefrontOpened(target))
            }
        }
    }

    async fn fetch_store_version(
        &self,
        app_id: &str,
        config: &UpdateFlowConfig,
    ) -> UpdateResult<String> {
        let timeout = config.lookup_timeout();
        if timeout.is_zero() {
            return Err(UpdateError::Config(
                "lookup timeout must be greater than zero".into(),
            ));
        }
        let source: Arc<dyn MetadataSource> = match &self.services.metadata {
            Some(source) => Arc::clone(source),
            None => Arc::new(AppStoreLookup::with_endpoint(config.lookup_endpoint.clone())),
        };

        bounded(timeout, source.fetch_store_version(app_id, timeout)).await
    }

    /// A new listener on the install status feed.
    pub fn status_stream(&self) -> BoxStream<'static, InstallStatus> {
        self.lifecycle.status_stream()
    }

    /// Install a downloaded flexible update. Failures are only logged.
    pub async fn complete_update(&self) {
        self.lifecycle.complete().await;
    }

    /// Stop the lifecycle subscription, if any.
    pub fn stop_tracking(&self) {
        self.lifecycle.stop();
    }

    /// Whether a status callback subscription is running.
    pub fn is_tracking(&self) -> bool {
        self.lifecycle.is_tracking()
    }

    pub fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }
}

async fn bounded<F>(timeout: Duration, lookup: F) -> UpdateResult<String>
where
    F: Future<Output = UpdateResult<String>>,
{
    tokio::time::timeout(timeout, lookup)
        .await
        .map_err(|_| UpdateError::Timeout(timeout))?
}

fn refused(mode: UpdateMode) -> FlowOutcome {
    info!(mode = mode.as_str(), "Platform does not permit this update mode right now");
    FlowOutcome::Refused(mode)
}

fn failed(operation: &str, error: UpdateError) -> FlowOutcome {
    warn!(operation, %error, kind = ?error.kind(), "Update flow failed, treating as no update");
    FlowOutcome::Failed(error.kind())
}
