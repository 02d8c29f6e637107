//! Operator interaction: prompts, pick lists, and status lines.
//!
//! Every flow writes its user-facing output and reads operator input
//! through [`Console`], so the resolvers never touch stdin/stdout
//! directly. [`TerminalConsole`] is the interactive implementation, built on
//! `dialoguer`.

use std::io::{self, Write};

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, MultiSelect, Select};

use crate::{AppError, Result};

/// Blocking operator interaction surface.
pub trait Console {
    /// Print one line of output.
    fn say(&mut self, message: &str);

    /// Overwrite the current line with a transient progress message.
    fn progress(&mut self, message: &str);

    /// Ask for non-empty free text.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Prompt` when input is closed.
    fn input(&mut self, message: &str) -> Result<String>;

    /// Ask for free text that may be left empty.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Prompt` when input is closed.
    fn input_optional(&mut self, message: &str) -> Result<Option<String>>;

    /// Ask a yes/no question.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Prompt` when input is closed.
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    /// Pick exactly one of `options`; returns its index.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Prompt` when input is closed or `options` is empty.
    fn select(&mut self, title: &str, options: &[String]) -> Result<usize>;

    /// Pick at least `min` of `options`; returns ascending indices.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Prompt` when input is closed or fewer than `min`
    /// options exist.
    fn multi_select(&mut self, title: &str, options: &[String], min: usize) -> Result<Vec<usize>>;
}

/// Interactive console on the controlling terminal.
pub struct TerminalConsole {
    theme: ColorfulTheme,
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalConsole {
    /// Console bound to the process's terminal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Console for TerminalConsole {
    fn say(&mut self, message: &str) {
        println!("{message}");
    }

    fn progress(&mut self, message: &str) {
        print!("{message}\r");
        // A closed stdout is not worth aborting for.
        let _ = io::stdout().flush();
    }

    fn input(&mut self, message: &str) -> Result<String> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(message)
            .validate_with(|text: &String| {
                if text.trim().is_empty() {
                    Err("a value is required")
                } else {
                    Ok(())
                }
            })
            .interact_text()?;
        Ok(answer.trim().to_owned())
    }

    fn input_optional(&mut self, message: &str) -> Result<Option<String>> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()?;
        let answer = answer.trim();
        Ok((!answer.is_empty()).then(|| answer.to_owned()))
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(default)
            .interact()?)
    }

    fn select(&mut self, title: &str, options: &[String]) -> Result<usize> {
        if options.is_empty() {
            return Err(AppError::Prompt(format!("nothing to choose for: {title}")));
        }
        Ok(Select::with_theme(&self.theme)
            .with_prompt(title)
            .items(options)
            .default(0)
            .interact()?)
    }

    fn multi_select(&mut self, title: &str, options: &[String], min: usize) -> Result<Vec<usize>> {
        if options.len() < min {
            return Err(AppError::Prompt(format!(
                "need at least {min} options for: {title}"
            )));
        }
        loop {
            let mut picked = MultiSelect::with_theme(&self.theme)
                .with_prompt(format!("{title} (SPACE to toggle, ENTER to confirm)"))
                .items(options)
                .interact()?;
            if picked.len() >= min {
                picked.sort_unstable();
                return Ok(picked);
            }
            self.say(&format!("Select at least {min}."));
        }
    }
}
