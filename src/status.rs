//! Canonical install status vocabulary.
//!
//! The platform update service reports progress of a flexible update in its
//! own vocabulary ([`PlatformInstallStatus`]). Callers of this crate only ever
//! see [`InstallStatus`], so they never depend on the platform's types.
//!
//! The translation is a value-for-value renaming written as an exhaustive
//! `match` with no wildcard arm: a new platform status that has no canonical
//! counterpart stops the build instead of silently mapping to
//! [`InstallStatus::Unknown`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of a background (flexible) update, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallStatus {
    Unknown,
    Pending,
    Downloading,
    Downloaded,
    Installing,
    Installed,
    Failed,
    Canceled,
}

impl InstallStatus {
    /// Every canonical status, in declaration order.
    pub const ALL: [InstallStatus; 8] = [
        InstallStatus::Unknown,
        InstallStatus::Pending,
        InstallStatus::Downloading,
        InstallStatus::Downloaded,
        InstallStatus::Installing,
        InstallStatus::Installed,
        InstallStatus::Failed,
        InstallStatus::Canceled,
    ];

    /// Whether no further status is expected for this update attempt.
    ///
    /// `Downloaded` is not terminal: the package still has to be installed.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            InstallStatus::Installed | InstallStatus::Failed | InstallStatus::Canceled
        )
    }

    /// Lower-case name used in logs and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            InstallStatus::Unknown => "unknown",
            InstallStatus::Pending => "pending",
            InstallStatus::Downloading => "downloading",
            InstallStatus::Downloaded => "downloaded",
            InstallStatus::Installing => "installing",
            InstallStatus::Installed => "installed",
            InstallStatus::Failed => "failed",
            InstallStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for InstallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install status as emitted by the platform update service's event feed.
///
/// Mirrors the platform's integer codes so adapters can decode raw values
/// with [`PlatformInstallStatus::from_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformInstallStatus {
    Unknown,
    Pending,
    Downloading,
    Installing,
    Installed,
    Failed,
    Canceled,
    Downloaded,
}

impl PlatformInstallStatus {
    /// Every platform status the feed can emit.
    pub const ALL: [PlatformInstallStatus; 8] = [
        PlatformInstallStatus::Unknown,
        PlatformInstallStatus::Pending,
        PlatformInstallStatus::Downloading,
        PlatformInstallStatus::Installing,
        PlatformInstallStatus::Installed,
        PlatformInstallStatus::Failed,
        PlatformInstallStatus::Canceled,
        PlatformInstallStatus::Downloaded,
    ];

    /// Decodes the platform's numeric status code.
    ///
    /// Codes the platform has not documented decode to `Unknown`, which is
    /// itself a status the platform emits.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => PlatformInstallStatus::Pending,
            2 => PlatformInstallStatus::Downloading,
            3 => PlatformInstallStatus::Installing,
            4 => PlatformInstallStatus::Installed,
            5 => PlatformInstallStatus::Failed,
            6 => PlatformInstallStatus::Canceled,
            11 => PlatformInstallStatus::Downloaded,
            _ => PlatformInstallStatus::Unknown,
        }
    }
}

impl From<PlatformInstallStatus> for InstallStatus {
    fn from(status: PlatformInstallStatus) -> Self {
        match status {
            PlatformInstallStatus::Unknown => InstallStatus::Unknown,
            PlatformInstallStatus::Pending => InstallStatus::Pending,
            PlatformInstallStatus::Downloading => InstallStatus::Downloading,
            PlatformInstallStatus::Installing => InstallStatus::Installing,
            PlatformInstallStatus::Installed => InstallStatus::Installed,
            PlatformInstallStatus::Failed => InstallStatus::Failed,
            PlatformInstallStatus::Canceled => InstallStatus::Canceled,
            PlatformInstallStatus::Downloaded => InstallStatus::Downloaded,
        }
    }
}

/// Translates a platform status into the canonical vocabulary.
pub fn map_status(status: PlatformInstallStatus) -> InstallStatus {
    status.into()
}
