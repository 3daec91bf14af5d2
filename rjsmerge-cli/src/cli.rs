//! CLI structure and command definitions.

use crate::commands::{
    CompletionsCommand, ConflictsCommand, MergeCommand, ModulesCommand, ValidateCommand,
};
use clap::{Parser, Subcommand};

/// Merge module-loader build configuration fragments.
#[derive(Parser)]
#[command(name = "rjsmerge")]
#[command(
    version,
    about = "Merge module-loader build configuration fragments",
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Merge fragment files into one build file
    Merge(MergeCommand),

    /// Show the overrides and warnings a merge produces
    Conflicts(ConflictsCommand),

    /// Check that fragment files are well formed
    Validate(ValidateCommand),

    /// Generate a modules fragment from a bundle layout and request log
    Modules(ModulesCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
