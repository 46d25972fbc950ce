//! The presentation seam of the remote-check flow.
//!
//! This crate never renders anything. When the store has a newer version, the
//! orchestrator builds a [`PromptRequest`] and hands it to an
//! [`UpdatePrompt`]; the host shows a two-action surface (dismiss / proceed)
//! and reports which action was chosen. On "proceed" the orchestrator opens
//! the store page through a [`UrlLauncher`] (see [`storefront`]).

pub mod storefront;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::UpdateResult;
pub use storefront::{Storefront, StorefrontTarget, UrlLauncher};

/// The four configurable strings of the update prompt.
///
/// `message` may contain `{installed}` and `{available}` placeholders; they
/// are filled in by [`DialogText::render`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogText {
    pub title: String,
    pub message: String,
    pub dismiss_label: String,
    pub proceed_label: String,
}

impl Default for DialogText {
    fn default() -> Self {
        Self {
            title: "Update available".to_string(),
            message: "Version {available} is available. You have {installed}.".to_string(),
            dismiss_label: "Later".to_string(),
            proceed_label: "Update".to_string(),
        }
    }
}

impl DialogText {
    /// Copy of this text with the version placeholders substituted.
    pub fn render(&self, installed: &str, available: &str) -> Self {
        Self {
            message: self
                .message
                .replace("{installed}", installed)
                .replace("{available}", available),
            ..self.clone()
        }
    }
}

/// Everything the host needs to show the update prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub installed_version: String,
    pub store_version: String,
    /// Always `true` today: the prompt is only requested for newer versions.
    pub update_available: bool,
    pub text: DialogText,
}

/// The action the user picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptDecision {
    Dismiss,
    Proceed,
}

/// Host-provided decision surface.
#[async_trait]
pub trait UpdatePrompt: Send + Sync {
    async fn ask(&self, request: PromptRequest) -> UpdateResult<PromptDecision>;
}
