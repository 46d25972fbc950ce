use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

use crate::core::UpdateError;
use crate::lifecycle::StatusCallback;
use crate::platform::TargetPlatform;
use crate::presentation::DialogText;
use crate::store::DEFAULT_LOOKUP_ENDPOINT;

/// How the update should be applied on a platform with an update service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateMode {
    /// Blocking update driven entirely by the platform.
    Immediate,
    /// Background download tracked through the install lifecycle.
    #[default]
    Flexible,
    /// Only report whether an update exists; never start one.
    RemoteCheck,
}

impl UpdateMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Flexible => "flexible",
            Self::RemoteCheck => "remote-check",
        }
    }
}

/// Configuration captured at the start of one update flow.
///
/// Built per invocation and handed to
/// [`UpdateOrchestrator::run`](crate::orchestrator::UpdateOrchestrator::run)
/// by value; nothing in it is shared between flows.
///
/// # TOML Example
///
/// ```toml
/// mode = "flexible"
/// auto_complete = true
/// app_id = "1234567890"
/// lookup_timeout_ms = 5000
///
/// [dialog]
/// title = "New version"
/// message = "Version {available} is out (you have {installed})."
/// ```
///
/// Every key is optional. The status callback cannot come from a file; attach
/// it with [`with_on_status`](Self::with_on_status).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateFlowConfig {
    /// Mode requested on platforms with an update service.
    pub mode: UpdateMode,

    /// Install automatically as soon as a flexible update is downloaded.
    pub auto_complete: bool,

    /// Run flows on Android. When `false`, `run` returns immediately there.
    pub android_enabled: bool,

    /// Run flows on iOS. When `false`, `run` returns immediately there.
    pub ios_enabled: bool,

    /// Store identifier for the remote check. Without one, the remote
    /// check is skipped.
    pub app_id: Option<String>,

    /// Upper bound on the store lookup, in milliseconds.
    pub lookup_timeout_ms: u64,

    /// Lookup endpoint template; `{id}` is replaced by `app_id`.
    pub lookup_endpoint: String,

    /// Text of the update prompt.
    pub dialog: DialogText,

    /// Receives every install status of a tracked flexible update.
    #[serde(skip)]
    pub on_status: Option<StatusCallback>,
}

impl Default for UpdateFlowConfig {
    fn default() -> Self {
        Self {
            mode: UpdateMode::default(),
            auto_complete: false,
            android_enabled: true,
            ios_enabled: true,
            app_id: None,
            lookup_timeout_ms: default_lookup_timeout_ms(),
            lookup_endpoint: DEFAULT_LOOKUP_ENDPOINT.to_string(),
            dialog: DialogText::default(),
            on_status: None,
        }
    }
}

fn default_lookup_timeout_ms() -> u64 {
    10_000
}

impl UpdateFlowConfig {
    pub fn new(mode: UpdateMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_auto_complete(mut self, auto_complete: bool) -> Self {
        self.auto_complete = auto_complete;
        self
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Bound the store lookup. A non-zero timeout below one millisecond is
    /// rounded up to one millisecond.
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.lookup_timeout_ms = if timeout.is_zero() { 0 } else { millis.max(1) };
        self
    }

    pub fn with_on_status(mut self, callback: StatusCallback) -> Self {
        self.on_status = Some(callback);
        self
    }

    pub fn with_dialog(mut self, dialog: DialogText) -> Self {
        self.dialog = dialog;
        self
    }

    /// Enable or disable flows on one platform.
    pub fn with_platform_enabled(mut self, platform: TargetPlatform, enabled: bool) -> Self {
        match platform {
            TargetPlatform::Android => self.android_enabled = enabled,
            TargetPlatform::Ios => self.ios_enabled = enabled,
            TargetPlatform::Other => {}
        }
        self
    }

    /// Whether flows run on `platform`. Platforms without an update
    /// mechanism are never enabled.
    pub fn is_enabled_for(&self, platform: TargetPlatform) -> bool {
        match platform {
            TargetPlatform::Android => self.android_enabled,
            TargetPlatform::Ios => self.ios_enabled,
            TargetPlatform::Other => false,
        }
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    /// The configured identifier, ignoring blank values.
    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    /// Reject configurations no flow can run with.
    ///
    /// # Errors
    ///
    /// - the lookup timeout is zero
    /// - the lookup endpoint has no `{id}` placeholder
    pub fn validate(&self) -> Result<(), UpdateError> {
        if self.lookup_timeout_ms == 0 {
            return Err(UpdateError::Config("lookup_timeout_ms must be greater than zero".into()));
        }
        if !self.lookup_endpoint.contains("{id}") {
            return Err(UpdateError::Config(format!(
                "lookup_endpoint '{}' has no {{id}} placeholder",
                self.lookup_endpoint
            )));
        }
        Ok(())
    }

    /// Load and validate a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails [`validate`](Self::validate).
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read update config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse update config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid update config in {}", path.display()))?;
        Ok(config)
    }
}
