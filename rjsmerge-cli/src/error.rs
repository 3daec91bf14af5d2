//! CLI-specific error types with exit codes.
//!
//! Wraps library errors and maps every failure to a stable exit code.

use rjsmerge::Error as LibError;
use std::fmt;

/// CLI-specific error type with exit code mapping.
#[derive(Debug)]
pub enum CliError {
    /// Library error (wrapped).
    Library(LibError),

    /// Invalid command-line arguments.
    InvalidArguments(String),

    /// I/O error.
    Io(std::io::Error),

    /// Input that could not be used (bad layout, bad request log).
    Config(String),

    /// Semantic failure (e.g., conflicts found with `--fail-on-conflict`).
    SemanticFailure(String),
}

impl CliError {
    /// Get the appropriate exit code for this error.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: Semantic failure (merge conflicts, invalid fragments)
    /// - 4: Invalid arguments
    /// - 5: I/O error
    /// - 6: Other library error
    /// - 7: Malformed input
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::SemanticFailure(_) => 1,
            CliError::Library(lib_err) => match lib_err {
                LibError::ShapeConflict { .. } | LibError::ValueConflict { .. } => 1,
                LibError::Io(_) | LibError::InvalidPath { .. } => 5,
                LibError::MalformedFragment { .. }
                | LibError::Script { .. }
                | LibError::Json(_)
                | LibError::Yaml(_) => 7,
                LibError::Validation { .. } => 6,
            },
            CliError::InvalidArguments(_) => 4,
            CliError::Io(_) => 5,
            CliError::Config(_) => 7,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Library(e) => write!(f, "{e}"),
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
            CliError::Config(msg) => write!(f, "Invalid input: {msg}"),
            CliError::SemanticFailure(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Library(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LibError> for CliError {
    fn from(e: LibError) -> Self {
        CliError::Library(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rjsmerge::merge::Shape;

    #[test]
    fn test_exit_codes() {
        let conflict = CliError::from(LibError::ShapeConflict {
            source_id: "b".to_string(),
            path: "map[\"*\"][\"rowBuilder\"]".to_string(),
            existing: Shape::Scalar,
            incoming: Shape::Mapping,
        });
        assert_eq!(conflict.exit_code(), 1);

        let malformed = CliError::from(LibError::MalformedFragment {
            source_id: "a".to_string(),
            path: "deps".to_string(),
            reason: "expected an array".to_string(),
        });
        assert_eq!(malformed.exit_code(), 7);

        let script = CliError::from(LibError::Script {
            source_id: "requirejs-config.js".to_string(),
            reason: "Unexpected token".to_string(),
        });
        assert_eq!(script.exit_code(), 7);

        let missing = CliError::from(LibError::InvalidPath {
            path: "missing.json".into(),
            reason: "not found".to_string(),
        });
        assert_eq!(missing.exit_code(), 5);

        assert_eq!(CliError::InvalidArguments("x".into()).exit_code(), 4);
    }
}
