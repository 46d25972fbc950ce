use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::version::VersionComparator;

/// Apply the version comparison rule to two version strings.
///
/// Non-digit characters are ignored and missing segments count as zero, so
/// `1.2` and `1.2.0` are equal and `1.2-beta` is newer than `1.1.9`.
#[derive(Args, Debug)]
pub struct CompareCommand {
    /// Candidate version (e.g., the store version)
    pub remote: String,

    /// Reference version (e.g., the installed version)
    pub local: String,
}

impl CompareCommand {
    pub fn execute(self) -> Result<()> {
        println!("{}", self.render());
        Ok(())
    }

    fn render(&self) -> String {
        if VersionComparator::is_newer(&self.remote, &self.local) {
            format!("{} is newer than {}", self.remote.green().bold(), self.local.yellow())
        } else {
            format!("{} is not newer than {}", self.remote.yellow(), self.local)
        }
    }
}
