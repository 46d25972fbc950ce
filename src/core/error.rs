//! Error handling for inapp-update
//!
//! Nothing in the update flow is fatal to the host application. Collaborators
//! (the platform update service, the store lookup, the prompt, the URL
//! launcher) report failures as [`UpdateError`]; the orchestrator logs them
//! and carries on as if no update were available.
//!
//! # Error Categories
//!
//! Every [`UpdateError`] falls into one [`FailureKind`]:
//! - **Transient I/O**: network, plugin round-trip or timeout failures
//! - **Malformed data**: the store answered with something we cannot read
//! - **Collaborator**: the prompt or the URL launcher failed
//! - **Configuration**: a configuration file was rejected
//!
//! A platform that declines the requested mode is not an error at all: the
//! orchestrator reports it as
//! [`FlowOutcome::Refused`](crate::orchestrator::FlowOutcome::Refused).
//!
//! The command-line front end turns errors into an [`ErrorContext`] with
//! [`user_friendly_error`] and prints it in color.
//!
//! # Examples
//!
//! ```rust
//! use inapp_update::core::{FailureKind, UpdateError};
//! use std::time::Duration;
//!
//! let error = UpdateError::Timeout(Duration::from_secs(10));
//! assert_eq!(error.kind(), FailureKind::TransientIo);
//! assert_eq!(error.to_string(), "Store lookup timed out after 10s");
//! ```

use colored::Colorize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// The error type returned by update collaborators.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// The platform update service failed to answer a request.
    #[error("Platform update service failed during {operation}: {reason}")]
    Platform {
        /// The service call that failed (e.g., "check", "start flexible")
        operation: String,
        /// Reason reported by the platform
        reason: String,
    },

    /// The HTTP request to the store lookup endpoint failed.
    #[error("Store lookup request failed")]
    Lookup(#[from] reqwest::Error),

    /// The store lookup endpoint answered with a non-success status.
    #[error("Store lookup returned HTTP {0}")]
    LookupStatus(u16),

    /// The store lookup did not complete in time.
    #[error("Store lookup timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The store lookup answered, but not with a usable version.
    #[error("Malformed store metadata: {0}")]
    MalformedMetadata(String),

    /// The decision prompt could not be shown or answered.
    #[error("Update prompt failed: {0}")]
    Presentation(String),

    /// A storefront URL could not be opened.
    #[error("Failed to open '{url}': {reason}")]
    Launch {
        /// The URL that was attempted
        url: String,
        /// Reason reported by the launcher
        reason: String,
    },

    /// The update configuration is invalid.
    #[error("Invalid update configuration: {0}")]
    Config(String),
}

/// Coarse classification of an [`UpdateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    TransientIo,
    MalformedData,
    Collaborator,
    Configuration,
}

impl UpdateError {
    /// Builds a [`UpdateError::Platform`] from any displayable reason.
    pub fn platform(operation: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Platform {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// The failure category this error belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Platform { .. } | Self::Lookup(_) | Self::LookupStatus(_) | Self::Timeout(_) => {
                FailureKind::TransientIo
            }
            Self::MalformedMetadata(_) => FailureKind::MalformedData,
            Self::Presentation(_) | Self::Launch { .. } => FailureKind::Collaborator,
            Self::Config(_) => FailureKind::Configuration,
        }
    }
}

/// An error paired with an optional suggestion for the person at the terminal.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error, already rendered with its cause chain
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
}

impl ErrorContext {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] suitable for the terminal.
///
/// The whole cause chain is included in the message. When an
/// [`UpdateError`] is found in the chain, a suggestion matching its
/// [`FailureKind`] is attached.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let message = format!("{error:#}");
    let kind = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<UpdateError>())
        .map(UpdateError::kind);

    let context = ErrorContext::new(message);
    match kind {
        Some(FailureKind::TransientIo) => {
            context.with_suggestion("Check your network connection and try again later")
        }
        Some(FailureKind::MalformedData) => {
            context.with_suggestion("Verify the application identifier and lookup endpoint")
        }
        Some(FailureKind::Configuration) => {
            context.with_suggestion("Fix the configuration file and run the command again")
        }
        _ => context,
    }
}
