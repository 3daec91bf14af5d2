//! Merge command implementation.
//!
//! Loads fragment files, merges them, and writes the build file.

use crate::error::CliError;
use crate::utils::{load_fragments, report_diagnostics, write_output, FormatArg, FragmentArgs, GlobalOptions};
use clap::Args;
use rjsmerge::merge::OVERRIDES_SOURCE_ID;
use rjsmerge::serialize::{render_bundle_loaders, DocumentFormat};
use rjsmerge::{Aggregator, FragmentPayload};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Merge fragment files into one build file.
#[derive(Args)]
pub struct MergeCommand {
    #[command(flatten)]
    pub inputs: FragmentArgs,

    /// Output format
    #[arg(
        long,
        value_enum,
        default_value = "build",
        env = "RJSMERGE_OUTPUT_FORMAT",
        ignore_case = true
    )]
    pub format: FormatArg,

    /// Write the document here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Override the optimizer output directory
    #[arg(long, value_name = "DIR")]
    pub dir: Option<String>,

    /// Override the optimizer source directory
    #[arg(long, value_name = "DIR")]
    pub base_url: Option<String>,

    /// Override the optimizer minifier (e.g. none, uglify)
    #[arg(long, value_name = "MODE")]
    pub optimize: Option<String>,

    /// Also write the runtime bundle loader snippet to this file
    #[arg(long, value_name = "PATH")]
    pub loaders: Option<PathBuf>,
}

impl MergeCommand {
    /// Execute the merge command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let logger = &global.logger;

        if self.loaders.is_some() && self.loaders == self.output {
            return Err(CliError::InvalidArguments(
                "--loaders and --output must name different files".to_string(),
            ));
        }

        // 1. Load fragments
        let fragments = load_fragments(&self.inputs.fragments, logger)?;

        // 2. Merge, with command-line settings applied last
        let mut options = self.inputs.options();
        if let Some(overrides) = self.overrides()? {
            options = options.with_overrides(overrides);
        }
        let result = Aggregator::new(options).aggregate(&fragments)?;
        report_diagnostics(&result.diagnostics, logger);

        // 3. Render and write
        let format = DocumentFormat::from(self.format);
        let document = format.create_renderer().render(&result.config)?;
        write_output(self.output.as_deref(), &document)?;

        if let Some(ref path) = self.loaders {
            std::fs::write(path, render_bundle_loaders(&result.config))?;
            logger.info(&format!("wrote bundle loaders to {}", path.display()));
        }

        logger.info(&format!("merged {} fragments", fragments.len()));
        Ok(())
    }

    fn overrides(&self) -> Result<Option<FragmentPayload>, CliError> {
        let settings = [
            ("dir", &self.dir),
            ("baseUrl", &self.base_url),
            ("optimize", &self.optimize),
        ];

        let mut payload = Map::new();
        for (key, value) in settings {
            if let Some(value) = value {
                payload.insert(key.to_string(), Value::String(value.clone()));
            }
        }

        if payload.is_empty() {
            return Ok(None);
        }
        let payload = FragmentPayload::from_value(OVERRIDES_SOURCE_ID, &Value::Object(payload))?;
        Ok(Some(payload))
    }
}
