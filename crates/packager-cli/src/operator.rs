//! Terminal implementation of the session's [`Operator`] port.
//!
//! Prompts go through `dialoguer` when stdin is a terminal (feature
//! `interactive`), otherwise answers are read one line at a time, which is
//! what scripts and tests pipe in.

use std::cell::RefCell;
use std::io::{self, BufRead, IsTerminal, Write};

use indicatif::ProgressBar;
use packager_core::{
    application::{
        ApplicationError,
        ports::{Operator, Progress, Prompt},
    },
    domain::{ConfigRecord, Field},
    error::PackagerResult,
};
use tracing::debug;

use crate::output::OutputManager;

/// Operator backed by the user's terminal.
pub struct TerminalOperator<'a> {
    output: &'a OutputManager,
    interactive: bool,
    spinner: RefCell<Option<ProgressBar>>,
}

impl<'a> TerminalOperator<'a> {
    pub fn new(output: &'a OutputManager) -> Self {
        let interactive = cfg!(feature = "interactive") && io::stdin().is_terminal();
        debug!(interactive, "Operator ready");
        Self {
            output,
            interactive,
            spinner: RefCell::new(None),
        }
    }

    fn start_spinner(&self, msg: String) {
        self.stop_spinner();
        *self.spinner.borrow_mut() = Some(self.output.spinner(msg));
    }

    fn stop_spinner(&self) {
        if let Some(bar) = self.spinner.borrow_mut().take() {
            bar.finish_and_clear();
        }
    }

    #[cfg(feature = "interactive")]
    fn ask_interactive(&self, prompt: &Prompt<'_>) -> PackagerResult<String> {
        use dialoguer::{Input, theme::ColorfulTheme};

        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme)
            .with_prompt(prompt_text(prompt.field))
            .allow_empty(true);
        if let Some(default) = prompt.default {
            input = input.default(default.to_string()).show_default(true);
        }
        input.interact_text().map_err(interaction)
    }

    #[cfg(not(feature = "interactive"))]
    fn ask_interactive(&self, prompt: &Prompt<'_>) -> PackagerResult<String> {
        self.ask_line(prompt)
    }

    fn ask_line(&self, prompt: &Prompt<'_>) -> PackagerResult<String> {
        let text = match prompt.default {
            Some(default) => format!("{} [{default}]: ", prompt_text(prompt.field)),
            None => format!("{}: ", prompt_text(prompt.field)),
        };
        read_answer(&text)
    }

    #[cfg(feature = "interactive")]
    fn confirm_interactive(&self) -> PackagerResult<bool> {
        use dialoguer::{Confirm, theme::ColorfulTheme};

        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Apply this configuration?")
            .default(true)
            .interact_opt()
            .map(|answer| answer.unwrap_or(false))
            .map_err(interaction)
    }

    #[cfg(not(feature = "interactive"))]
    fn confirm_interactive(&self) -> PackagerResult<bool> {
        confirm_line()
    }

    /// Written even in quiet mode: the operator must see what they confirm.
    fn show_candidate(&self, candidate: &ConfigRecord) -> io::Result<()> {
        self.output.data("")?;
        for line in candidate_summary(self.output, candidate) {
            self.output.data(&line)?;
        }
        self.output.data("")
    }
}

impl Operator for TerminalOperator<'_> {
    fn ask(&self, prompt: Prompt<'_>) -> PackagerResult<String> {
        if self.interactive {
            self.ask_interactive(&prompt)
        } else {
            self.ask_line(&prompt)
        }
    }

    fn reject(&self, field: Field, reason: &str) {
        let _ = self
            .output
            .warning(&format!("{reason} (e.g. {})", field.example()));
    }

    fn confirm(&self, candidate: &ConfigRecord) -> PackagerResult<bool> {
        self.show_candidate(candidate).map_err(interaction)?;
        if self.interactive {
            self.confirm_interactive()
        } else {
            confirm_line()
        }
    }

    fn progress(&self, event: Progress<'_>) {
        let out = self.output;
        // Progress lines are best effort; a closed stdout must not abort
        // the session half-way.
        let _ = match event {
            Progress::Resuming { name } => {
                out.info(&format!("Found existing configuration for '{name}'; press Enter to keep a value"))
            }
            Progress::ValidatingRef { source } => out.info(&format!("Checking {source}...")),
            Progress::RefConfirmed { source } => out.success(&format!("Found {source}")),
            Progress::FetchingSource { url } => {
                self.start_spinner(format!("Fetching and hashing {url}"));
                Ok(())
            }
            Progress::SourceHashed { hash } => {
                self.stop_spinner();
                out.success(&format!("Source hash: {hash}"))
            }
            Progress::ResolvingDependencies { attribute } => {
                self.start_spinner(format!("Building '{attribute}' to discover the vendor hash"));
                Ok(())
            }
            Progress::DependencyHashResolved {
                hash,
                empty_closure,
            } => {
                self.stop_spinner();
                if empty_closure {
                    out.info("No Go dependencies to vendor; keeping the placeholder vendor hash")
                } else {
                    out.success(&format!("Vendor hash: {hash}"))
                }
            }
            Progress::DependencyHashDrift { previous, current } => out.warning(&format!(
                "Vendor hash changed for the same revision ({previous} -> {current}); \
                 the upstream module set may not be reproducible"
            )),
            Progress::Committed { path } => out.success(&format!("Saved {}", path.display())),
            Progress::Verifying { attribute } => {
                out.info(&format!("Running verification build of '{attribute}'..."))
            }
            Progress::Verified { attribute } => {
                out.success(&format!("'{attribute}' builds with the new configuration"))
            }
        };
    }
}

impl Drop for TerminalOperator<'_> {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}

fn prompt_text(field: Field) -> String {
    format!("{} (e.g. {})", field.label(), field.example())
}

fn read_answer(prompt: &str) -> PackagerResult<String> {
    let mut err = io::stderr().lock();
    write!(err, "{prompt}").and_then(|_| err.flush()).map_err(interaction)?;
    drop(err);

    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line).map_err(interaction)?;
    if read == 0 {
        return Err(ApplicationError::Interaction {
            reason: "standard input closed before an answer was given".into(),
        }
        .into());
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn candidate_summary(output: &OutputManager, candidate: &ConfigRecord) -> Vec<String> {
    vec![
        output.format_header("Proposed configuration"),
        output.format_field("name", &candidate.name),
        output.format_field("description", &candidate.description),
        output.format_field("owner", &candidate.owner),
        output.format_field("repo", &candidate.repo_name),
        output.format_field("ref", &candidate.git_ref),
        output.format_field("sha256", candidate.source_hash.as_str()),
        output.format_field("vendorHash", candidate.dependency_hash.as_str()),
    ]
}

/// Asks until the answer is a yes or a no.
fn confirm_line() -> PackagerResult<bool> {
    loop {
        let answer = read_answer("Apply this configuration? [Y/n] ")?;
        match parse_confirmation(&answer) {
            Some(confirmed) => return Ok(confirmed),
            None => eprintln!("Please answer 'y' or 'n'."),
        }
    }
}

/// Blank confirms; only an explicit no cancels. `None` for anything else.
fn parse_confirmation(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" | "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

fn interaction(e: impl std::fmt::Display) -> packager_core::error::PackagerError {
    ApplicationError::Interaction {
        reason: e.to_string(),
    }
    .into()
}
