//! Terminal implementations of the presentation collaborators.

use async_trait::async_trait;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::core::{UpdateError, UpdateResult};
use crate::presentation::{PromptDecision, PromptRequest, UpdatePrompt, UrlLauncher};

/// Shows the update prompt on stderr and reads the answer from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt {
    assume_yes: bool,
}

impl TerminalPrompt {
    /// With `assume_yes`, the prompt is shown but answered with "proceed".
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

/// Interpret a typed answer. Anything but an explicit yes dismisses.
pub fn parse_answer(answer: &str, proceed_label: &str) -> PromptDecision {
    let answer = answer.trim();
    if answer.eq_ignore_ascii_case("y")
        || answer.eq_ignore_ascii_case("yes")
        || answer.eq_ignore_ascii_case(proceed_label)
    {
        PromptDecision::Proceed
    } else {
        PromptDecision::Dismiss
    }
}

#[async_trait]
impl UpdatePrompt for TerminalPrompt {
    async fn ask(&self, request: PromptRequest) -> UpdateResult<PromptDecision> {
        let text = &request.text;
        eprintln!();
        eprintln!("{}", text.title.bright_cyan().bold());
        eprintln!("  {}", text.message);
        eprintln!();
        eprint!(
            "{} / {} [y/N] ",
            text.dismiss_label.dimmed(),
            text.proceed_label.green().bold()
        );

        if self.assume_yes {
            eprintln!("y");
            return Ok(PromptDecision::Proceed);
        }

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|e| UpdateError::Presentation(format!("failed to read answer: {e}")))?;

        Ok(parse_answer(&line, &text.proceed_label))
    }
}

/// Prints the URL it would open.
///
/// A terminal has no handler for store deep links, so only web URLs are
/// reported as openable.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintLauncher;

#[async_trait]
impl UrlLauncher for PrintLauncher {
    async fn can_open(&self, url: &str) -> bool {
        url.starts_with("https://") || url.starts_with("http://")
    }

    async fn open(&self, url: &str) -> UpdateResult<()> {
        println!("Open {}", url.cyan().underline());
        Ok(())
    }
}
