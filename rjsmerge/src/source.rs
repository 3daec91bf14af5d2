//! File-based fragment loading.
//!
//! Reads fragment documents from disk so the engine can be driven from a
//! shell. The merge path itself never touches the filesystem.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::fragment::ConfigFragment;
use crate::generated::parse_generated_config;
use crate::serialize::parse_build_file;

/// Loads fragment files.
///
/// The format is chosen by extension: `.yaml`/`.yml` are YAML, anything
/// other than `.js` is JSON. A `.js` file starting with `({` is the build-file
/// form; any other `.js` file is a generated `requirejs-config.js` and yields
/// one fragment per configuration block.
///
/// # Examples
///
/// ```no_run
/// use rjsmerge::source::FragmentLoader;
/// use std::path::Path;
///
/// let fragments = FragmentLoader::load_all(&[
///     Path::new("fragments/Magento_Theme.json"),
///     Path::new("fragments/Vendor_Custom.yaml"),
/// ])
/// .unwrap();
/// println!("Loaded {} fragments", fragments.len());
/// ```
pub struct FragmentLoader;

impl FragmentLoader {
    /// Load several files; a bare payload's precedence is its position in
    /// `paths`.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`FragmentLoader::load_file`].
    pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ConfigFragment>> {
        let mut fragments = Vec::new();
        for (path, position) in paths.iter().zip(0_i64..) {
            fragments.extend(Self::load_file(path.as_ref(), position)?);
        }
        Ok(fragments)
    }

    /// Load the fragments in one file.
    ///
    /// A bare payload takes its source id from the path and its precedence
    /// from `default_precedence`; an envelope may state either. A generated
    /// script yields its blocks in file order, all at `default_precedence`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if the file cannot be read, a parse
    /// error if it is not valid JSON, YAML or JavaScript, or
    /// [`Error::MalformedFragment`] if a payload is not well formed.
    pub fn load_file(path: &Path, default_precedence: i64) -> Result<Vec<ConfigFragment>> {
        let contents = fs::read_to_string(path).map_err(|e| Error::InvalidPath {
            path: path.to_path_buf(),
            reason: format!("failed to read fragment: {e}"),
        })?;
        let source_id = path.display().to_string();

        let fragments = match path.extension().and_then(|ext| ext.to_str()) {
            Some("js") if !is_build_file(&contents) => {
                parse_generated_config(&source_id, default_precedence, &contents)?
            }
            extension => {
                let document = parse_document(extension, &contents)?;
                vec![ConfigFragment::from_document(
                    &source_id,
                    default_precedence,
                    &document,
                )?]
            }
        };

        log::debug!("loaded {} fragments from {source_id}", fragments.len());
        Ok(fragments)
    }
}

fn is_build_file(contents: &str) -> bool {
    contents
        .trim_start()
        .strip_prefix('(')
        .is_some_and(|rest| rest.trim_start().starts_with('{'))
}

fn parse_document(extension: Option<&str>, contents: &str) -> Result<Value> {
    match extension {
        Some("yaml" | "yml") => Ok(serde_yaml::from_str(contents)?),
        Some("js") => parse_build_file(contents),
        _ => Ok(serde_json::from_str(contents)?),
    }
}
