//! Conflicts command implementation.
//!
//! Merges fragments and prints the diagnostic log in various formats
//! (table, JSON, CSV, TSV) instead of the document.

use crate::error::CliError;
use crate::utils::{load_fragments, FragmentArgs, GlobalOptions};
use clap::{Args, ValueEnum};
use rjsmerge::merge::{Diagnostic, DiagnosticLog};
use rjsmerge::Aggregator;
use std::io::Write;

/// Column headers for CSV/TSV output.
const COLUMN_HEADERS: [&str; 6] = ["kind", "location", "source", "overridden", "old", "new"];

/// Show the overrides and warnings a merge produces.
#[derive(Args)]
pub struct ConflictsCommand {
    #[command(flatten)]
    pub inputs: FragmentArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "table", ignore_case = true)]
    pub format: LogFormat,

    /// Exit with status 1 when any value conflict was found
    #[arg(long)]
    pub fail_on_conflict: bool,
}

/// Output format for the conflicts command.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum LogFormat {
    /// Tab-separated table format (human-readable)
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
    /// TSV format (tab-separated values)
    Tsv,
}

impl ConflictsCommand {
    /// Execute the conflicts command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let fragments = load_fragments(&self.inputs.fragments, &global.logger)?;
        let result = Aggregator::new(self.inputs.options()).aggregate(&fragments)?;
        let diagnostics = result.diagnostics;

        match self.format {
            LogFormat::Table => format_as_table(&diagnostics)?,
            LogFormat::Json => format_as_json(&diagnostics)?,
            LogFormat::Csv => format_as_delimited(&diagnostics, b',')?,
            LogFormat::Tsv => format_as_delimited(&diagnostics, b'\t')?,
        }

        let conflicts = diagnostics.conflicts().count();
        if self.fail_on_conflict && conflicts > 0 {
            return Err(CliError::SemanticFailure(format!(
                "{conflicts} value conflicts found"
            )));
        }
        Ok(())
    }
}

/// The cells of one row, in [`COLUMN_HEADERS`] order.
fn row(diagnostic: &Diagnostic) -> [String; 6] {
    match diagnostic {
        Diagnostic::ValueConflict(record) => [
            diagnostic.kind().to_string(),
            diagnostic.location(),
            record.winning_source_id.clone(),
            record.overridden_source_id.clone().unwrap_or_default(),
            record.old_value.to_string(),
            record.new_value.to_string(),
        ],
        Diagnostic::UnknownKey { source_id, key } => [
            diagnostic.kind().to_string(),
            key.clone(),
            source_id.clone(),
            String::new(),
            String::new(),
            String::new(),
        ],
    }
}

/// Format diagnostics as a human-readable table.
fn format_as_table(diagnostics: &DiagnosticLog) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    let header_line = COLUMN_HEADERS
        .iter()
        .map(|s| s.to_uppercase())
        .collect::<Vec<_>>()
        .join("\t");
    writeln!(handle, "{header_line}")?;

    for diagnostic in diagnostics.iter() {
        let cells = row(diagnostic).map(|cell| if cell.is_empty() { "-".to_string() } else { cell });
        writeln!(handle, "{}", cells.join("\t"))?;
    }

    Ok(())
}

/// Format diagnostics as JSON.
fn format_as_json(diagnostics: &DiagnosticLog) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    serde_json::to_writer_pretty(&mut handle, diagnostics).map_err(std::io::Error::other)?;
    writeln!(handle)?;

    Ok(())
}

/// Convert csv::Error to CliError.
fn csv_error(e: csv::Error) -> CliError {
    CliError::Io(std::io::Error::other(e))
}

/// Format diagnostics as delimited output (CSV or TSV).
fn format_as_delimited(diagnostics: &DiagnosticLog, delimiter: u8) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let handle = stdout.lock();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(handle);

    writer.write_record(COLUMN_HEADERS).map_err(csv_error)?;
    for diagnostic in diagnostics.iter() {
        writer.write_record(row(diagnostic)).map_err(csv_error)?;
    }
    writer.flush()?;

    Ok(())
}
