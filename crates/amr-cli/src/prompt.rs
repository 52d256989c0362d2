//! Interactive confirmation, selection, and text prompts on stderr.

use anyhow::anyhow;
use dialoguer::console::Term;
use dialoguer::{Confirm, Input, Password, Select};

use crate::client::{CliError, CliResult};

fn prompt_failed(err: &dialoguer::Error) -> CliError {
    CliError::failure(anyhow!("prompt failed: {err}"))
}

/// Ask before applying changes. Declining is a user abort.
pub(crate) fn require_confirmation(assume_yes: bool, message: &str) -> CliResult<()> {
    if assume_yes {
        return Ok(());
    }
    let accepted = Confirm::new()
        .with_prompt(message)
        .default(true)
        .interact_on(&Term::stderr())
        .map_err(|err| prompt_failed(&err))?;
    if accepted {
        Ok(())
    } else {
        Err(CliError::Aborted)
    }
}

/// Yes/no question with a default answer.
pub(crate) fn confirm(message: &str, default: bool) -> CliResult<bool> {
    Confirm::new()
        .with_prompt(message)
        .default(default)
        .interact_on(&Term::stderr())
        .map_err(|err| prompt_failed(&err))
}

/// Pick one of `labels`; returns its index.
///
/// `preset` is a 1-based choice given on the command line. A single option is
/// chosen without asking.
pub(crate) fn choose(message: &str, labels: &[String], preset: Option<usize>) -> CliResult<usize> {
    if labels.is_empty() {
        return Err(CliError::validation("nothing to choose from"));
    }
    if let Some(position) = preset {
        return if (1..=labels.len()).contains(&position) {
            Ok(position - 1)
        } else {
            Err(CliError::validation(format!(
                "choice {position} is out of range (1-{})",
                labels.len()
            )))
        };
    }
    if labels.len() == 1 {
        return Ok(0);
    }
    Select::new()
        .with_prompt(message)
        .items(labels)
        .default(0)
        .interact_on(&Term::stderr())
        .map_err(|err| prompt_failed(&err))
}

/// Free-text answer; `default` is offered when non-empty.
pub(crate) fn text(message: &str, default: &str, allow_empty: bool) -> CliResult<String> {
    let mut input = Input::<String>::new()
        .with_prompt(message)
        .allow_empty(allow_empty);
    if !default.is_empty() {
        input = input.default(default.to_string());
    }
    input
        .interact_text_on(&Term::stderr())
        .map(|answer| answer.trim().to_string())
        .map_err(|err| prompt_failed(&err))
}

/// Hidden answer for secrets.
pub(crate) fn secret(message: &str, allow_empty: bool) -> CliResult<String> {
    Password::new()
        .with_prompt(message)
        .allow_empty_password(allow_empty)
        .interact_on(&Term::stderr())
        .map_err(|err| prompt_failed(&err))
}
