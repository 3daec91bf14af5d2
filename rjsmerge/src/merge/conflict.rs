//! Conflict detection and the diagnostic log.
//!
//! The reporter sees every replace decision the merge engines make. Scalar
//! overrides are logged (or, in strict mode, promoted to errors); structural
//! mismatches are always fatal.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};

/// Structural type of a configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// A JSON object.
    Mapping,
    /// A JSON array.
    List,
    /// A string, number, boolean or null.
    Scalar,
}

impl Shape {
    /// Classify a value.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::Mapping,
            Value::Array(_) => Self::List,
            _ => Self::Scalar,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mapping => write!(f, "mapping"),
            Self::List => write!(f, "list"),
            Self::Scalar => write!(f, "scalar"),
        }
    }
}

/// Location of a value inside the merged document.
///
/// The first segment is the top-level key; the rest are mapping keys.
/// Module ids contain `/` and `.`, so nested segments are rendered quoted.
///
/// # Examples
///
/// ```
/// use rjsmerge::merge::ConfigPath;
///
/// let path = ConfigPath::root("map").child("*").child("rowBuilder");
/// assert_eq!(path.to_string(), r#"map["*"]["rowBuilder"]"#);
/// assert_eq!(path.key(), Some("map"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigPath(Vec<String>);

impl ConfigPath {
    /// A path to a top-level key.
    pub fn root(key: impl Into<String>) -> Self {
        Self(vec![key.into()])
    }

    /// Extend the path by one segment.
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// The top-level key, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// All segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    fn prefix(&self, len: usize) -> Self {
        Self(self.0[..len].to_vec())
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segments = self.0.iter();
        match segments.next() {
            Some(first) => write!(f, "{first}")?,
            None => return write!(f, "<root>"),
        }
        for segment in segments {
            write!(f, "[{segment:?}]")?;
        }
        Ok(())
    }
}

impl Serialize for ConfigPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One scalar override resolved by precedence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictRecord {
    /// Top-level key the value lives under.
    pub key: String,
    /// Full location of the value.
    pub path: ConfigPath,
    /// Value before the override.
    pub old_value: Value,
    /// Value after the override.
    pub new_value: Value,
    /// Fragment whose value won.
    pub winning_source_id: String,
    /// Fragment that had supplied the overridden value, when known.
    pub overridden_source_id: Option<String>,
}

/// A non-fatal finding of an aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    /// A scalar was overridden by a later fragment.
    ValueConflict(ConflictRecord),
    /// A top-level key outside the registry was passed through.
    UnknownKey {
        /// Fragment that used the key.
        #[serde(rename = "sourceId")]
        source_id: String,
        /// The key.
        key: String,
    },
}

impl Diagnostic {
    /// Short machine-friendly kind name.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ValueConflict(_) => "value-conflict",
            Self::UnknownKey { .. } => "unknown-key",
        }
    }

    /// The fragment the diagnostic is attributed to.
    #[must_use]
    pub fn source_id(&self) -> &str {
        match self {
            Self::ValueConflict(record) => &record.winning_source_id,
            Self::UnknownKey { source_id, .. } => source_id,
        }
    }

    /// Rendered location of the diagnostic.
    #[must_use]
    pub fn location(&self) -> String {
        match self {
            Self::ValueConflict(record) => record.path.to_string(),
            Self::UnknownKey { key, .. } => key.clone(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValueConflict(record) => {
                write!(
                    f,
                    "{} overridden by '{}': {} -> {}",
                    record.path, record.winning_source_id, record.old_value, record.new_value
                )?;
                if let Some(ref loser) = record.overridden_source_id {
                    write!(f, " (was set by '{loser}')")?;
                }
                Ok(())
            }
            Self::UnknownKey { source_id, key } => {
                write!(f, "unknown key '{key}' in fragment '{source_id}' passed through")
            }
        }
    }
}

/// Ordered record of every diagnostic raised during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DiagnosticLog {
    entries: Vec<Diagnostic>,
}

impl DiagnosticLog {
    /// Append a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// All diagnostics in the order they were raised.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Only the value conflicts.
    pub fn conflicts(&self) -> impl Iterator<Item = &ConflictRecord> {
        self.entries.iter().filter_map(|d| match d {
            Diagnostic::ValueConflict(record) => Some(record),
            Diagnostic::UnknownKey { .. } => None,
        })
    }

    /// Only the unknown-key warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| matches!(d, Diagnostic::UnknownKey { .. }))
    }

    /// Whether any value conflict was recorded.
    #[must_use]
    pub fn has_conflicts(&self) -> bool {
        self.conflicts().next().is_some()
    }

    /// Number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the log.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

/// Observes merge decisions for one aggregation run.
///
/// Tracks which fragment last set each path so conflict records can name
/// both sides of an override.
#[derive(Debug, Default)]
pub struct ConflictReporter {
    strict: bool,
    log: DiagnosticLog,
    origins: HashMap<ConfigPath, String>,
}

impl ConflictReporter {
    /// A reporter; in strict mode value conflicts become errors.
    #[must_use]
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            ..Default::default()
        }
    }

    /// Switch strict mode on or off for the decisions that follow.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Note that `source_id` supplied the value at `path`.
    pub fn record_origin(&mut self, path: &ConfigPath, source_id: &str) {
        self.origins.insert(path.clone(), source_id.to_string());
    }

    /// The fragment that supplied `path` or its closest recorded ancestor.
    #[must_use]
    pub fn origin(&self, path: &ConfigPath) -> Option<&str> {
        (1..=path.depth())
            .rev()
            .find_map(|len| self.origins.get(&path.prefix(len)))
            .map(String::as_str)
    }

    /// Report a replace decision on an existing leaf.
    ///
    /// Equal values are not a conflict. Differing values are logged, or
    /// rejected in strict mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValueConflict`] in strict mode when the values differ.
    pub fn report_override(
        &mut self,
        path: &ConfigPath,
        old_value: &Value,
        new_value: &Value,
        source_id: &str,
    ) -> Result<()> {
        if old_value != new_value {
            if self.strict {
                return Err(Error::ValueConflict {
                    source_id: source_id.to_string(),
                    path: path.to_string(),
                    old_value: old_value.clone(),
                    new_value: new_value.clone(),
                });
            }

            log::debug!("{path}: '{source_id}' overrides {old_value} with {new_value}");
            let record = ConflictRecord {
                key: path.key().unwrap_or_default().to_string(),
                path: path.clone(),
                old_value: old_value.clone(),
                new_value: new_value.clone(),
                winning_source_id: source_id.to_string(),
                overridden_source_id: self.origin(path).map(str::to_string),
            };
            self.log.push(Diagnostic::ValueConflict(record));
        }

        self.record_origin(path, source_id);
        Ok(())
    }

    /// Report a top-level key the registry does not recognise.
    pub fn report_unknown_key(&mut self, source_id: &str, key: &str) {
        log::debug!("fragment '{source_id}' uses unknown key '{key}'; passing it through");
        self.log.push(Diagnostic::UnknownKey {
            source_id: source_id.to_string(),
            key: key.to_string(),
        });
    }

    /// Build the fatal error for a structural mismatch.
    #[must_use]
    pub fn shape_conflict(
        &self,
        path: &ConfigPath,
        existing: Shape,
        incoming: Shape,
        source_id: &str,
    ) -> Error {
        Error::ShapeConflict {
            source_id: source_id.to_string(),
            path: path.to_string(),
            existing,
            incoming,
        }
    }

    /// Finish the run and hand back the log.
    #[must_use]
    pub fn into_log(self) -> DiagnosticLog {
        self.log
    }
}
