//! Error types for the rjsmerge library.
//!
//! Every fatal condition of an aggregation run is a variant of [`Error`].
//! Recoverable conditions (value overrides, unknown keys) are not errors;
//! they are collected in the [`DiagnosticLog`](crate::merge::DiagnosticLog)
//! returned with the merged document.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use crate::merge::Shape;

/// Result type alias for operations that may fail with an rjsmerge error.
///
/// # Examples
///
/// ```
/// use rjsmerge::{Error, Result};
///
/// fn example_operation() -> Result<usize> {
///     Ok(3)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the rjsmerge library.
#[derive(Debug, Error)]
pub enum Error {
    /// Two fragments disagree on the structural type stored at one path.
    ///
    /// Always fatal: the run is aborted and no document is produced.
    #[error("shape conflict at {path}: fragment '{source_id}' supplies a {incoming} where a {existing} is already defined")]
    ShapeConflict {
        /// The fragment whose contribution could not be merged.
        source_id: String,
        /// Location of the conflicting value.
        path: String,
        /// Shape already present in the merged document.
        existing: Shape,
        /// Shape supplied by the incoming fragment.
        incoming: Shape,
    },

    /// A scalar override that strict mode refuses to resolve silently.
    #[error("value conflict at {path}: fragment '{source_id}' overrides {old_value} with {new_value}")]
    ValueConflict {
        /// The fragment that attempted the override.
        source_id: String,
        /// Location of the overridden value.
        path: String,
        /// Value before the override.
        old_value: Value,
        /// Value the fragment tried to install.
        new_value: Value,
    },

    /// A fragment payload does not have the shape the loader expects.
    #[error("malformed fragment '{source_id}' at {path}: {reason}")]
    MalformedFragment {
        /// The offending fragment.
        source_id: String,
        /// Location inside the payload.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A JSON document could not be parsed or rendered.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML document could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A generated loader script is not valid JavaScript.
    #[error("failed to parse script '{source_id}': {reason}")]
    Script {
        /// The script that failed to parse.
        source_id: String,
        /// Parser diagnostics.
        reason: String,
    },

    /// A fragment or layout file could not be read.
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath {
        /// The path that could not be used.
        path: PathBuf,
        /// Why it could not be used.
        reason: String,
    },

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },
}

impl Error {
    /// Build a [`Error::MalformedFragment`].
    pub(crate) fn malformed(
        source_id: &str,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedFragment {
            source_id: source_id.to_string(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if the error is a merge conflict (shape, or value in strict mode).
    ///
    /// # Examples
    ///
    /// ```
    /// use rjsmerge::Error;
    /// use rjsmerge::merge::Shape;
    ///
    /// let err = Error::ShapeConflict {
    ///     source_id: "Magento_Theme".to_string(),
    ///     path: "map[\"*\"][\"rowBuilder\"]".to_string(),
    ///     existing: Shape::Scalar,
    ///     incoming: Shape::Mapping,
    /// };
    /// assert!(err.is_conflict());
    /// ```
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ShapeConflict { .. } | Self::ValueConflict { .. })
    }

    /// The fragment responsible for a merge failure, when there is one.
    #[must_use]
    pub fn source_id(&self) -> Option<&str> {
        match self {
            Self::ShapeConflict { source_id, .. }
            | Self::ValueConflict { source_id, .. }
            | Self::MalformedFragment { source_id, .. }
            | Self::Script { source_id, .. } => Some(source_id),
            _ => None,
        }
    }
}
