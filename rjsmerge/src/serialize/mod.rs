//! Rendering merged documents.
//!
//! The merged document is rendered with its top-level keys in a fixed
//! canonical order so that the same merge always produces the same bytes:
//! optimizer settings first, then `paths`, `bundles`, `pkgs`, `shim`,
//! `config`, `map`, `deps` and `modules`, then unrecognised keys in the order
//! they were first seen. Nested keys keep first-seen order.
//!
//! # Examples
//!
//! ```
//! use rjsmerge::serialize::DocumentFormat;
//! use rjsmerge::MergedConfig;
//!
//! let mut config = MergedConfig::default();
//! config.deps.push("jquery".to_string());
//!
//! let rendered = DocumentFormat::Json.create_renderer().render(&config).unwrap();
//! assert!(rendered.starts_with("{\n  \"paths\": {},"));
//! ```

mod loaders;
mod renderers;

use serde_json::{Map, Value};

use crate::error::Result;
use crate::model::{MergedConfig, BUILD_SETTING_KEYS};

pub use loaders::render_bundle_loaders;
pub use renderers::{BuildFileRenderer, JsonRenderer};

/// Turns a merged document into text.
pub trait DocumentRenderer {
    /// Render `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if a table cannot be converted to JSON.
    fn render(&self, config: &MergedConfig) -> Result<String>;
}

/// Available document formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `({...})`, the form the optimizer reads as a build file.
    #[default]
    BuildFile,
    /// Plain pretty-printed JSON.
    Json,
}

impl DocumentFormat {
    /// Create a renderer for this format.
    #[must_use]
    pub fn create_renderer(&self) -> Box<dyn DocumentRenderer> {
        match self {
            Self::BuildFile => Box::new(BuildFileRenderer),
            Self::Json => Box::new(JsonRenderer),
        }
    }

    /// Conventional file extension.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::BuildFile => "js",
            Self::Json => "json",
        }
    }
}

/// Convert a merged document to a JSON value in canonical key order.
///
/// # Errors
///
/// Returns [`Error::Json`](crate::Error::Json) if a table cannot be
/// converted.
pub fn to_value(config: &MergedConfig) -> Result<Value> {
    let mut document = Map::new();

    for key in BUILD_SETTING_KEYS {
        if let Some(value) = config.settings.get(key) {
            document.insert(key.to_string(), value.clone());
        }
    }

    document.insert("paths".into(), serde_json::to_value(&config.paths)?);
    document.insert("bundles".into(), Value::Object(config.bundles.clone()));
    document.insert("pkgs".into(), Value::Object(config.pkgs.clone()));
    document.insert("shim".into(), serde_json::to_value(&config.shim)?);
    document.insert("config".into(), config_section(config)?);
    document.insert("map".into(), serde_json::to_value(&config.map)?);
    document.insert("deps".into(), serde_json::to_value(&config.deps)?);
    document.insert("modules".into(), serde_json::to_value(&config.modules)?);

    for (key, value) in &config.extra {
        document.insert(key.clone(), value.clone());
    }

    Ok(Value::Object(document))
}

fn config_section(config: &MergedConfig) -> Result<Value> {
    let mut section = Map::new();
    if !config.mixins.is_empty() {
        section.insert("mixins".into(), serde_json::to_value(&config.mixins)?);
    }
    for (key, value) in &config.config {
        section.insert(key.clone(), value.clone());
    }
    Ok(Value::Object(section))
}

/// Parse a document in either output format.
///
/// Accepts plain JSON or the `({...})` build-file form, with optional
/// surrounding whitespace and a trailing `;`.
///
/// # Errors
///
/// Returns [`Error::Json`](crate::Error::Json) if the body is not valid JSON.
///
/// # Examples
///
/// ```
/// use rjsmerge::serialize::parse_build_file;
///
/// let value = parse_build_file("({\"deps\": [\"jquery\"]});\n").unwrap();
/// assert_eq!(value["deps"][0], "jquery");
/// ```
pub fn parse_build_file(text: &str) -> Result<Value> {
    let mut body = text.trim();
    body = body.strip_suffix(';').map_or(body, str::trim_end);
    if let Some(inner) = body
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        body = inner;
    }
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BuildModule, ShimEntry};
    use serde_json::json;

    #[test]
    fn test_empty_document_has_all_sections() {
        let value = to_value(&MergedConfig::default()).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["paths", "bundles", "pkgs", "shim", "config", "map", "deps", "modules"]
        );
    }

    #[test]
    fn test_settings_render_in_canonical_order() {
        let mut config = MergedConfig::default();
        config.settings.insert("keepBuildDir".into(), json!(true));
        config.settings.insert("dir".into(), json!("out"));
        config.extra.insert("waitSeconds".into(), json!(0));

        let value = to_value(&config).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.first(), Some(&"dir"));
        assert_eq!(keys.get(1), Some(&"keepBuildDir"));
        assert_eq!(keys.last(), Some(&"waitSeconds"));
    }

    #[test]
    fn test_mixins_lead_the_config_section() {
        let mut config = MergedConfig::default();
        config
            .config
            .insert("text".into(), json!({"headers": {"X-Requested-With": "XMLHttpRequest"}}));
        config
            .mixins
            .entry("jquery/jstree/jquery.jstree".into())
            .or_default()
            .insert("mage/backend/jstree-mixin".into(), true);

        let value = to_value(&config).unwrap();
        let keys: Vec<&String> = value["config"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["mixins", "text"]);
    }

    #[test]
    fn test_build_file_form() {
        let mut config = MergedConfig::default();
        config.shim.insert("vimeoAPI".into(), ShimEntry::default());
        config.modules.push(BuildModule::named("requirejs/require"));

        let rendered = BuildFileRenderer.render(&config).unwrap();
        assert!(rendered.starts_with("({\n"));
        assert!(rendered.ends_with("\n})"));
        assert!(rendered.contains("\"vimeoAPI\": {}"));
        assert_eq!(
            parse_build_file(&rendered).unwrap()["modules"],
            json!([{"name": "requirejs/require"}])
        );
    }

    #[test]
    fn test_parse_plain_json() {
        assert_eq!(parse_build_file("  {\"a\": 1}\n").unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_build_file("require.config({});").is_err());
    }

    #[test]
    fn test_format_extension() {
        assert_eq!(DocumentFormat::BuildFile.extension(), "js");
        assert_eq!(DocumentFormat::default(), DocumentFormat::BuildFile);
    }
}
