//! Main entry point for the rjsmerge CLI.
//!
//! Merges module-loader build configuration fragments from the shell:
//! - `merge`: Merge fragment files into one build file
//! - `conflicts`: Show the overrides a merge would resolve
//! - `validate`: Check fragment files without merging
//! - `modules`: Generate a `modules` fragment from a bundle layout

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    let cli = Cli::parse();

    let logger = rjsmerge::init_logger(cli.verbose, cli.quiet);
    logger.install();

    let global = GlobalOptions { logger };

    let result = match cli.command {
        cli::Command::Merge(cmd) => cmd.execute(&global),
        cli::Command::Conflicts(cmd) => cmd.execute(&global),
        cli::Command::Validate(cmd) => cmd.execute(&global),
        cli::Command::Modules(cmd) => cmd.execute(&global),
        cli::Command::Completions(cmd) => cmd.execute(&global),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
