//! Command templates for the build and clean tools.

use anyhow::{Result, anyhow};

use crate::core::tokenizer::split_words;

/// Token replaced with the target name when a build command is expanded.
pub const TARGET_SLOT: &str = "{}";

/// A tokenized command, held as an argument vector.
///
/// Build commands carry a reserved slot (`{}`) that [`expand`] fills with
/// the current target; clean commands are run verbatim via [`argv`]. The
/// same type serves both, so a clean command containing `{}` is legal but
/// never expanded.
///
/// [`expand`]: CommandTemplate::expand
/// [`argv`]: CommandTemplate::argv
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    argv: Vec<String>,
}

impl CommandTemplate {
    /// Parse a command string into a template.
    ///
    /// Fails when the string tokenizes to nothing, since there would be no
    /// program to run.
    pub fn parse(command: &str) -> Result<Self> {
        let argv = split_words(command);
        if argv.is_empty() {
            return Err(anyhow!("empty command: {command:?}"));
        }
        Ok(Self { argv })
    }

    /// The template's tokens, verbatim.
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Substitute `target` into the reserved slot.
    ///
    /// Every `{}` occurrence is replaced, including inside a larger token
    /// such as `{}.log`. A template with no slot gets the target appended
    /// as the final argument instead.
    pub fn expand(&self, target: &str) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.argv.len() + 1);
        let mut substituted = false;
        for token in &self.argv {
            if token.contains(TARGET_SLOT) {
                substituted = true;
                argv.push(token.replace(TARGET_SLOT, target));
            } else {
                argv.push(token.clone());
            }
        }
        if !substituted {
            argv.push(target.to_string());
        }
        argv
    }
}
