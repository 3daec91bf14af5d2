//! Shell completion generation command.

use crate::cli::Cli;
use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use std::io;

/// Name of the installed binary.
const BIN_NAME: &str = "rjsmerge";

/// Generate shell completion scripts
#[derive(Parser)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsCommand {
    /// Execute the completions command.
    pub fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut cmd = Cli::command();

        let hint = match self.shell {
            Shell::Bash => Some("rjsmerge completions bash > ~/.local/share/bash-completion/completions/rjsmerge"),
            Shell::Zsh => Some("rjsmerge completions zsh > ~/.zsh/completions/_rjsmerge"),
            Shell::Fish => Some("rjsmerge completions fish > ~/.config/fish/completions/rjsmerge.fish"),
            Shell::PowerShell => Some("rjsmerge completions powershell | Out-String | Invoke-Expression"),
            _ => None,
        };
        if let Some(hint) = hint {
            global.logger.info(&format!("install with: {hint}"));
        }

        generate(self.shell, &mut cmd, BIN_NAME, &mut io::stdout());

        Ok(())
    }
}
