//! Modules command implementation.
//!
//! Turns a bundle layout and a captured request log into a fragment
//! holding the optimizer `modules` list.

use crate::error::CliError;
use crate::utils::{read_input, write_output, GlobalOptions};
use clap::{Args, ValueEnum};
use rjsmerge::bundles::{generate_modules, parse_requests, BundleLayout};
use rjsmerge::{BuildModule, Error as LibError};
use serde::Serialize;
use std::path::PathBuf;

/// Serialization of the generated fragment.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum EnvelopeFormat {
    /// JSON
    Json,
    /// YAML
    Yaml,
}

/// A fragment file that names its own source id and precedence.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    source_id: &'a str,
    precedence: i64,
    payload: ModulesPayload,
}

#[derive(Serialize)]
struct ModulesPayload {
    modules: Vec<BuildModule>,
}

/// Generate a modules fragment from a bundle layout and request log.
#[derive(Args)]
pub struct ModulesCommand {
    /// Bundle layout (JSON or YAML)
    #[arg(long, value_name = "PATH")]
    pub layout: PathBuf,

    /// Request log captured from the storefront (JSON)
    #[arg(long, value_name = "PATH")]
    pub requests: PathBuf,

    /// Source id of the generated fragment
    #[arg(long, default_value = "bundle-layout")]
    pub source_id: String,

    /// Precedence of the generated fragment
    #[arg(long, default_value_t = 1000)]
    pub precedence: i64,

    /// Output format
    #[arg(long, value_enum, default_value = "json", ignore_case = true)]
    pub format: EnvelopeFormat,

    /// Write the fragment here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl ModulesCommand {
    /// Execute the modules command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let layout = BundleLayout::parse_for_path(&self.layout, &read_input(&self.layout)?)
            .map_err(|e| match e {
                LibError::Validation { .. } => CliError::Library(e),
                other => CliError::Config(format!("{}: {other}", self.layout.display())),
            })?;
        let requests = parse_requests(&read_input(&self.requests)?)
            .map_err(|e| CliError::Config(format!("{}: {e}", self.requests.display())))?;

        let modules = generate_modules(&layout, &requests);
        global.logger.info(&format!(
            "generated {} modules from {} requests",
            modules.len(),
            requests.len()
        ));

        let envelope = Envelope {
            source_id: &self.source_id,
            precedence: self.precedence,
            payload: ModulesPayload { modules },
        };
        let text = match self.format {
            EnvelopeFormat::Json => {
                serde_json::to_string_pretty(&envelope).map_err(std::io::Error::other)?
            }
            EnvelopeFormat::Yaml => {
                serde_yaml::to_string(&envelope).map_err(std::io::Error::other)?
            }
        };
        write_output(self.output.as_deref(), &text)
    }
}
