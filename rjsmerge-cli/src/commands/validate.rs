//! Validate command implementation.
//!
//! Checks that every fragment file parses and is well formed, and
//! optionally that the set merges without shape conflicts. A generated
//! `requirejs-config.js` is checked block by block.

use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::Args;
use rjsmerge::source::FragmentLoader;
use rjsmerge::{Aggregator, ConfigFragment};
use std::path::PathBuf;

/// Check that fragment files are well formed.
#[derive(Args)]
pub struct ValidateCommand {
    /// Fragment files to check
    #[arg(value_name = "FRAGMENT", required = true)]
    pub fragments: Vec<PathBuf>,

    /// Also merge the fragments to detect shape conflicts
    #[arg(long)]
    pub merge: bool,
}

impl ValidateCommand {
    /// Execute the validate command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let logger = &global.logger;
        let mut valid: Vec<ConfigFragment> = Vec::new();
        let mut failures = 0;

        for (position, path) in (0_i64..).zip(&self.fragments) {
            match FragmentLoader::load_file(path, position) {
                // A generated script reports each of its blocks
                Ok(fragments) if fragments.len() > 1 => {
                    for fragment in &fragments {
                        let keys = fragment.payload.present_keys();
                        println!("ok\t{}\t{} keys", fragment.source_id, keys.len());
                    }
                    valid.extend(fragments);
                }
                Ok(fragments) => {
                    let keys = fragments
                        .first()
                        .map_or(0, |fragment| fragment.payload.present_keys().len());
                    println!("ok\t{}\t{keys} keys", path.display());
                    valid.extend(fragments);
                }
                Err(e) => {
                    failures += 1;
                    println!("invalid\t{}", path.display());
                    logger.error(&e.to_string());
                }
            }
        }

        if failures > 0 {
            return Err(CliError::SemanticFailure(format!(
                "{failures} of {} fragments are invalid",
                self.fragments.len()
            )));
        }

        if self.merge {
            let result = Aggregator::default().aggregate(&valid)?;
            logger.info(&format!(
                "fragments merge cleanly with {} diagnostics",
                result.diagnostics.len()
            ));
        }

        Ok(())
    }
}
