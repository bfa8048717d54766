//! # Prompting
//!
//! The collector never talks to the terminal directly. It goes through the
//! [`Prompter`] trait, which exposes the handful of primitives the bootstrap
//! flow needs: free text with an optional default, masked input,
//! confirmations, closed choices and corrective messages.
//!
//! ## Implementations
//!
//! - **`TerminalPrompter`**: interactive prompts built on `dialoguer` with the
//!   colorful theme.
//! - **`NoInputPrompter`**: unattended runs (`--no-input`). Every prompt
//!   resolves to its default; prompts without one fail with
//!   [`Error::MissingInput`].
//!
//! On top of the primitives, [`ask_validated`] implements the retry rule shared
//! by every field: ask, validate, print the corrective message and ask again
//! until the value passes. The loop is iterative and bounded only by the
//! operator's patience.

use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};

use crate::error::{Error, Result};
use crate::validation::{validate_secret, Requirement, Validation};

/// Prompt primitives used by the collector.
pub trait Prompter {
    /// Ask for a line of text. An empty answer yields `default` when present.
    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String>;

    /// Ask for a secret without echoing it.
    fn password(&mut self, prompt: &str, allow_empty: bool) -> Result<String>;

    /// Ask a yes/no question.
    fn confirm(&mut self, prompt: &str, default: Option<bool>) -> Result<bool>;

    /// Ask for one of `choices`, re-asking on anything else.
    fn select(&mut self, prompt: &str, choices: &[&str], default: usize) -> Result<String> {
        let prompt = format!("{} [{}]", prompt, choices.join("/"));
        loop {
            let answer = self.input(&prompt, choices.get(default).copied())?;
            let answer = answer.trim();
            if let Some(choice) = choices.iter().find(|c| c.eq_ignore_ascii_case(answer)) {
                return Ok(choice.to_string());
            }
            let message = format!("\"{}\" is not one of {}.", answer, choices.join(", "));
            if !self.is_interactive() {
                return Err(Error::InvalidValue {
                    field: prompt,
                    message,
                });
            }
            self.message(&message);
        }
    }

    /// Show a short corrective message.
    fn message(&mut self, message: &str);

    /// Whether an operator can answer a repeated question.
    fn is_interactive(&self) -> bool {
        true
    }
}

/// Interactive prompts on the controlling terminal.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?)
    }

    fn password(&mut self, prompt: &str, allow_empty: bool) -> Result<String> {
        Ok(Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty_password(allow_empty)
            .interact()?)
    }

    fn confirm(&mut self, prompt: &str, default: Option<bool>) -> Result<bool> {
        let mut confirm = Confirm::with_theme(&self.theme).with_prompt(prompt);
        if let Some(default) = default {
            confirm = confirm.default(default);
        }
        Ok(confirm.interact()?)
    }

    fn select(&mut self, prompt: &str, choices: &[&str], default: usize) -> Result<String> {
        let index = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(choices)
            .default(default)
            .interact()?;
        Ok(choices[index].to_string())
    }

    fn message(&mut self, message: &str) {
        eprintln!("{}", style(message).red());
    }
}

/// Unattended prompts: defaults only.
#[derive(Debug, Default)]
pub struct NoInputPrompter {
    /// Answer yes to confirmations that have no default.
    pub assume_yes: bool,
}

impl NoInputPrompter {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    fn missing(prompt: &str) -> Error {
        Error::MissingInput {
            field: prompt.trim_end_matches('?').to_string(),
            hint: Some(
                "Pass it as a command-line flag or environment variable, or run without --no-input"
                    .to_string(),
            ),
        }
    }
}

impl Prompter for NoInputPrompter {
    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String> {
        default
            .map(str::to_string)
            .ok_or_else(|| Self::missing(prompt))
    }

    fn password(&mut self, prompt: &str, allow_empty: bool) -> Result<String> {
        if allow_empty {
            Ok(String::new())
        } else {
            Err(Self::missing(prompt))
        }
    }

    fn confirm(&mut self, prompt: &str, default: Option<bool>) -> Result<bool> {
        match default {
            Some(default) => Ok(default),
            None if self.assume_yes => Ok(true),
            None => Err(Self::missing(prompt)),
        }
    }

    fn message(&mut self, message: &str) {
        log::warn!("{}", message);
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Ask until `validate` accepts the answer.
///
/// Unattended prompters cannot answer twice, so a rejected answer from them
/// is returned as [`Error::InvalidValue`].
pub fn ask_validated<P, F>(
    prompter: &mut P,
    prompt: &str,
    default: Option<&str>,
    validate: F,
) -> Result<String>
where
    P: Prompter + ?Sized,
    F: Fn(&str) -> Validation,
{
    loop {
        let answer = prompter.input(prompt, default)?;
        let answer = answer.trim().to_string();
        match validate(&answer) {
            Ok(()) => return Ok(answer),
            Err(message) if !prompter.is_interactive() => {
                return Err(Error::InvalidValue {
                    field: prompt.to_string(),
                    message,
                })
            }
            Err(message) => prompter.message(&message),
        }
    }
}

/// Ask for a masked value until `validate` accepts it.
pub fn ask_masked<P, F>(
    prompter: &mut P,
    prompt: &str,
    allow_empty: bool,
    validate: F,
) -> Result<String>
where
    P: Prompter + ?Sized,
    F: Fn(&str) -> Validation,
{
    loop {
        let answer = prompter.password(prompt, allow_empty)?;
        match validate(&answer) {
            Ok(()) => return Ok(answer),
            Err(message) if !prompter.is_interactive() => {
                return Err(Error::InvalidValue {
                    field: prompt.to_string(),
                    message,
                })
            }
            Err(message) => prompter.message(&message),
        }
    }
}

/// Ask for a secret until it satisfies the length rule for `requirement`.
pub fn ask_secret<P>(prompter: &mut P, prompt: &str, requirement: Requirement) -> Result<String>
where
    P: Prompter + ?Sized,
{
    ask_masked(prompter, prompt, requirement.is_optional(), |value| {
        validate_secret(value, requirement)
    })
}

/// Ask for confirmation and abort the whole run on decline.
pub fn confirm_or_abort<P>(prompter: &mut P, prompt: &str) -> Result<()>
where
    P: Prompter + ?Sized,
{
    if prompter.confirm(prompt, None)? {
        Ok(())
    } else {
        Err(Error::Aborted {
            message: prompt.trim_end_matches(" Continue?").to_string(),
        })
    }
}
