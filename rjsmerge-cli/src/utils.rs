//! Utility functions for CLI operations.
//!
//! Shared argument groups, fragment loading, diagnostic reporting and
//! output writing used across commands.

use crate::error::CliError;
use clap::{Args, ValueEnum};
use rjsmerge::merge::DiagnosticLog;
use rjsmerge::serialize::DocumentFormat;
use rjsmerge::source::FragmentLoader;
use rjsmerge::{ConfigFragment, Logger, MergeOptions};
use std::fs;
use std::path::{Path, PathBuf};

/// Global CLI options shared across all commands.
///
/// `--verbose` and `--quiet` are resolved into the logger once, in `main`.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Logger picked from the flags and `RJSMERGE_LOG_MODE`.
    pub logger: Logger,
}

/// Fragment inputs and merge behaviour shared by `merge` and `conflicts`.
#[derive(Args, Debug, Clone)]
pub struct FragmentArgs {
    /// Fragment files (JSON, YAML, build file or requirejs-config.js), lowest precedence first
    #[arg(value_name = "FRAGMENT", required = true)]
    pub fragments: Vec<PathBuf>,

    /// Fail on the first value overridden by a later fragment
    #[arg(long, env = "RJSMERGE_STRICT")]
    pub strict: bool,

    /// Replace absolute-URL paths with "empty:" after merging
    #[arg(long, env = "RJSMERGE_STRIP_REMOTE_PATHS")]
    pub strip_remote_paths: bool,
}

impl FragmentArgs {
    /// Merge options for these flags.
    pub fn options(&self) -> MergeOptions {
        MergeOptions::default()
            .with_strict(self.strict)
            .with_strip_remote_paths(self.strip_remote_paths)
    }
}

/// Document format accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum FormatArg {
    /// `({...})` build file
    Build,
    /// Plain JSON
    Json,
}

impl From<FormatArg> for DocumentFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Build => DocumentFormat::BuildFile,
            FormatArg::Json => DocumentFormat::Json,
        }
    }
}

/// Load fragment files; a bare payload's precedence is its argument
/// position.
pub fn load_fragments(paths: &[PathBuf], logger: &Logger) -> Result<Vec<ConfigFragment>, CliError> {
    let fragments = FragmentLoader::load_all(paths)?;
    for fragment in &fragments {
        logger.info(&format!(
            "loaded fragment '{}' (precedence {})",
            fragment.source_id, fragment.precedence
        ));
    }
    Ok(fragments)
}

/// Print every diagnostic of a run as a warning.
pub fn report_diagnostics(diagnostics: &DiagnosticLog, logger: &Logger) {
    for diagnostic in diagnostics.iter() {
        logger.diagnostic(diagnostic);
    }
    if !diagnostics.is_empty() {
        logger.info(&format!(
            "{} diagnostics ({} conflicts)",
            diagnostics.len(),
            diagnostics.conflicts().count()
        ));
    }
}

/// Write `text` to `output`, or to stdout followed by a newline.
///
/// Files receive the text exactly as given.
pub fn write_output(output: Option<&Path>, text: &str) -> Result<(), CliError> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, text)?;
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// Read a whole file, naming it in the error.
pub fn read_input(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|e| {
        CliError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {e}", path.display()),
        ))
    })
}
