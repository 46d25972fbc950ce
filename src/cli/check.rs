use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::terminal::{PrintLauncher, TerminalPrompt};
use crate::config::UpdateFlowConfig;
use crate::core::FailureKind;
use crate::orchestrator::{FlowOutcome, UpdateOrchestrator, UpdateServices};
use crate::platform::{NoPlatformService, TargetPlatform};
use crate::presentation::StorefrontTarget;
use crate::store::FixedInstalledVersion;

/// Run the store version check for an installed version.
///
/// Looks up the published version of `--app-id`, compares it with
/// `--installed`, and when the store is ahead shows the update prompt on
/// the terminal. Accepting prints the store page URL.
///
/// # Examples
///
/// ```bash
/// inapp-update check --app-id 284882215 --installed 400.0
/// inapp-update check --app-id 284882215 --installed 400.0 --yes --timeout 3
/// ```
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Store identifier of the application. Overrides `app_id` from the config file.
    #[arg(long, value_name = "ID")]
    pub app_id: Option<String>,

    /// Version currently installed
    #[arg(long, value_name = "VERSION")]
    pub installed: String,

    /// Lookup timeout in seconds. Overrides `lookup_timeout_ms`.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Lookup endpoint template containing `{id}`. Overrides `lookup_endpoint`.
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Answer the update prompt with "proceed" without asking
    #[arg(short, long)]
    pub yes: bool,
}

impl CheckCommand {
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let config = self.flow_config(config_path).await?;
        if config.app_id().is_none() {
            bail!("No app id given; pass --app-id or set app_id in the config file");
        }
        debug!(?config, "Running remote version check");

        let orchestrator = UpdateOrchestrator::new(UpdateServices {
            platform: Arc::new(NoPlatformService),
            installed: Arc::new(FixedInstalledVersion::new(self.installed.clone())),
            metadata: None,
            prompt: Arc::new(TerminalPrompt::new(self.yes)),
            launcher: Arc::new(PrintLauncher),
        });

        let outcome = orchestrator.run(TargetPlatform::Ios, config).await;
        println!("{}", describe(&outcome, &self.installed));
        Ok(())
    }

    async fn flow_config(&self, config_path: Option<&Path>) -> Result<UpdateFlowConfig> {
        let mut config = match config_path {
            Some(path) => UpdateFlowConfig::load_from(path).await?,
            None => UpdateFlowConfig::default(),
        };

        // The command runs the store flow regardless of the host platform.
        config.ios_enabled = true;
        if let Some(app_id) = &self.app_id {
            config.app_id = Some(app_id.clone());
        }
        if let Some(timeout) = self.timeout {
            config = config.with_lookup_timeout(Duration::from_secs(timeout));
        }
        if let Some(endpoint) = &self.endpoint {
            config.lookup_endpoint = endpoint.clone();
        }

        config.validate().context("Invalid command-line options")?;
        Ok(config)
    }
}

/// One-line summary of a flow outcome.
pub fn describe(outcome: &FlowOutcome, installed: &str) -> String {
    match outcome {
        FlowOutcome::NoUpdate => format!("{} is up to date", installed.green()),
        FlowOutcome::Declined => "Update available, dismissed".yellow().to_string(),
        FlowOutcome::StorefrontOpened(StorefrontTarget::DeepLink(url))
        | FlowOutcome::StorefrontOpened(StorefrontTarget::Web(url)) => {
            format!("Opened store page {url}")
        }
        FlowOutcome::Failed(FailureKind::TransientIo) => {
            "Could not reach the store; treated as no update".red().to_string()
        }
        FlowOutcome::Failed(FailureKind::MalformedData) => {
            "The store returned no usable version; treated as no update".red().to_string()
        }
        FlowOutcome::Failed(kind) => format!("Update flow failed ({kind:?}); treated as no update"),
        other => format!("{other:?}"),
    }
}
