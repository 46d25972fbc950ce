//! Command-line interface for inapp-update
//!
//! The binary is a thin front end over the library, useful for checking a
//! store listing by hand or from CI:
//!
//! - `compare <remote> <local>` - Apply the version comparison rule
//! - `check --app-id <id> --installed <version>` - Run the remote-check flow
//!   against the live store lookup, prompting on the terminal
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Only show warnings and errors
//! - `--config <file>` - Load the flow configuration from a TOML file
//!
//! # Examples
//!
//! ```bash
//! inapp-update compare 1.2-beta 1.1.9
//! inapp-update check --app-id 284882215 --installed 400.0
//! inapp-update --config update.toml check --installed 2.1.0 --yes
//! ```

mod check;
mod compare;
mod terminal;

pub use check::CheckCommand;
pub use compare::CompareCommand;
pub use terminal::{PrintLauncher, TerminalPrompt};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Settings derived from the global flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Default log filter when `RUST_LOG` is not set.
    pub log_level: String,
    /// Flow configuration file, if one was given.
    pub config_path: Option<PathBuf>,
}

/// Root command.
#[derive(Parser)]
#[command(
    name = "inapp-update",
    about = "Check whether a newer app version is published and walk through the update flow",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output. Equivalent to `RUST_LOG=debug`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to an update flow configuration file (TOML).
    #[arg(long, global = true, env = "INAPP_UPDATE_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether one version is newer than another
    Compare(CompareCommand),
    /// Run the store version check for an installed version
    Check(CheckCommand),
}

impl Cli {
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        };

        CliConfig {
            log_level: log_level.to_string(),
            config_path: self.config.clone(),
        }
    }

    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        match self.command {
            Commands::Compare(cmd) => cmd.execute(),
            Commands::Check(cmd) => cmd.execute(config.config_path.as_deref()).await,
        }
    }
}
