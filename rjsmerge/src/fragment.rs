//! Configuration fragments and payload validation.
//!
//! A fragment is one package's partial build configuration. Payloads arrive
//! as raw JSON values and are checked here, once, so the merge engines only
//! ever see well-formed tables.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::merge::{ConfigPath, TopLevelKey};
use crate::model::{
    AliasTable, BuildModule, MapTable, MergedConfig, MixinTable, ModuleId, ShimEntry, ShimTable,
};

/// One partial configuration with its provenance.
///
/// # Examples
///
/// ```
/// use rjsmerge::ConfigFragment;
///
/// let fragment = ConfigFragment::from_json_str(
///     "Magento_Theme",
///     10,
///     r#"{"paths": {"menu": "mage/menu"}, "deps": ["jquery"]}"#,
/// )
/// .unwrap();
///
/// assert_eq!(fragment.source_id, "Magento_Theme");
/// assert_eq!(fragment.payload.paths["menu"], "mage/menu");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFragment {
    /// Identifier, unique within one aggregation run.
    pub source_id: String,
    /// Lower ranks are applied first and overridden by higher ranks.
    pub precedence: i64,
    /// The validated contribution.
    pub payload: FragmentPayload,
}

/// On-disk envelope carrying provenance next to the payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Envelope {
    source_id: String,
    #[serde(default)]
    precedence: Option<i64>,
    payload: Value,
}

impl ConfigFragment {
    /// Wrap an already validated payload.
    pub fn new(source_id: impl Into<String>, precedence: i64, payload: FragmentPayload) -> Self {
        Self {
            source_id: source_id.into(),
            precedence,
            payload,
        }
    }

    /// Validate a raw payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFragment`] when the payload is not well formed.
    pub fn from_value(source_id: impl Into<String>, precedence: i64, value: &Value) -> Result<Self> {
        let source_id = source_id.into();
        let payload = FragmentPayload::from_value(&source_id, value)?;
        Ok(Self::new(source_id, precedence, payload))
    }

    /// Parse and validate a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] when the text is not JSON, or
    /// [`Error::MalformedFragment`] when the payload is not well formed.
    pub fn from_json_str(source_id: impl Into<String>, precedence: i64, text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(source_id, precedence, &value)
    }

    /// Accept either an envelope `{sourceId, precedence?, payload}` or a bare
    /// payload.
    ///
    /// The defaults fill in whatever the document does not state itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFragment`] when the envelope or payload is
    /// not well formed.
    ///
    /// # Examples
    ///
    /// ```
    /// use rjsmerge::ConfigFragment;
    /// use serde_json::json;
    ///
    /// let doc = json!({"sourceId": "Magento_Ui", "payload": {"deps": ["uiRegistry"]}});
    /// let fragment = ConfigFragment::from_document("fallback.json", 3, &doc).unwrap();
    /// assert_eq!(fragment.source_id, "Magento_Ui");
    /// assert_eq!(fragment.precedence, 3);
    /// ```
    pub fn from_document(default_id: &str, default_precedence: i64, document: &Value) -> Result<Self> {
        if !is_envelope(document) {
            return Self::from_value(default_id, default_precedence, document);
        }

        let envelope: Envelope = serde_json::from_value(document.clone())
            .map_err(|e| Error::malformed(default_id, "<envelope>", e.to_string()))?;
        Self::from_value(
            envelope.source_id,
            envelope.precedence.unwrap_or(default_precedence),
            &envelope.payload,
        )
    }

    /// Turn a merged document back into a fragment.
    #[must_use]
    pub fn from_merged(source_id: impl Into<String>, precedence: i64, config: &MergedConfig) -> Self {
        Self::new(source_id, precedence, FragmentPayload::from(config))
    }
}

fn is_envelope(document: &Value) -> bool {
    document
        .as_object()
        .is_some_and(|object| object.contains_key("sourceId") && object.contains_key("payload"))
}

/// The validated contents of a fragment.
///
/// Empty tables mean the fragment does not contribute to that key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FragmentPayload {
    /// Optimizer settings.
    pub settings: Map<String, Value>,
    /// `paths`
    pub paths: AliasTable,
    /// `bundles`
    pub bundles: Map<String, Value>,
    /// `pkgs`
    pub pkgs: Map<String, Value>,
    /// `shim`
    pub shim: ShimTable,
    /// `config.mixins`
    pub mixins: MixinTable,
    /// `config` sections other than `mixins`.
    pub config: Map<String, Value>,
    /// `map`
    pub map: MapTable,
    /// `deps`
    pub deps: Vec<ModuleId>,
    /// `modules`
    pub modules: Vec<BuildModule>,
    /// Keys outside the registry, in the order the fragment listed them.
    pub unknown: Map<String, Value>,
}

impl FragmentPayload {
    /// Validate a raw payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFragment`] naming the first offending path.
    pub fn from_value(source_id: &str, value: &Value) -> Result<Self> {
        let Some(root) = value.as_object() else {
            return Err(Error::malformed(source_id, "<root>", "payload must be a mapping"));
        };

        let mut payload = Self::default();
        for (key, value) in root {
            let parser = Parser {
                source_id,
                path: ConfigPath::root(key.as_str()),
            };
            match TopLevelKey::parse(key) {
                TopLevelKey::Setting(name) => {
                    payload.settings.insert(name, value.clone());
                }
                TopLevelKey::Paths => payload.paths = parser.aliases(value)?,
                TopLevelKey::Bundles => payload.bundles = parser.object(value)?.clone(),
                TopLevelKey::Pkgs => payload.pkgs = parser.object(value)?.clone(),
                TopLevelKey::Shim => payload.shim = parser.shim(value)?,
                TopLevelKey::Config => {
                    let (mixins, rest) = parser.config(value)?;
                    payload.mixins = mixins;
                    payload.config = rest;
                }
                TopLevelKey::Map => payload.map = parser.map(value)?,
                TopLevelKey::Deps => payload.deps = parser.string_list(value)?,
                TopLevelKey::Modules => payload.modules = parser.modules(value)?,
                TopLevelKey::Unknown(name) => {
                    payload.unknown.insert(name, value.clone());
                }
            }
        }
        Ok(payload)
    }

    /// The top-level keys this payload contributes, settings first and
    /// unknown keys last.
    #[must_use]
    pub fn present_keys(&self) -> Vec<TopLevelKey> {
        let mut keys: Vec<TopLevelKey> = self
            .settings
            .keys()
            .map(|name| TopLevelKey::Setting(name.clone()))
            .collect();

        let tables = [
            (TopLevelKey::Paths, self.paths.is_empty()),
            (TopLevelKey::Bundles, self.bundles.is_empty()),
            (TopLevelKey::Pkgs, self.pkgs.is_empty()),
            (TopLevelKey::Shim, self.shim.is_empty()),
            (
                TopLevelKey::Config,
                self.mixins.is_empty() && self.config.is_empty(),
            ),
            (TopLevelKey::Map, self.map.is_empty()),
            (TopLevelKey::Deps, self.deps.is_empty()),
            (TopLevelKey::Modules, self.modules.is_empty()),
        ];
        keys.extend(
            tables
                .into_iter()
                .filter(|(_, empty)| !empty)
                .map(|(key, _)| key),
        );

        keys.extend(
            self.unknown
                .keys()
                .map(|name| TopLevelKey::Unknown(name.clone())),
        );
        keys
    }

    /// Whether the payload contributes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.present_keys().is_empty()
    }
}

impl From<&MergedConfig> for FragmentPayload {
    fn from(config: &MergedConfig) -> Self {
        Self {
            settings: config.settings.clone(),
            paths: config.paths.clone(),
            bundles: config.bundles.clone(),
            pkgs: config.pkgs.clone(),
            shim: config.shim.clone(),
            mixins: config.mixins.clone(),
            config: config.config.clone(),
            map: config.map.clone(),
            deps: config.deps.clone(),
            modules: config.modules.clone(),
            unknown: config.extra.clone(),
        }
    }
}

/// Shape checks for one top-level key.
struct Parser<'a> {
    source_id: &'a str,
    path: ConfigPath,
}

impl Parser<'_> {
    fn fail(&self, path: &ConfigPath, reason: impl Into<String>) -> Error {
        Error::malformed(self.source_id, path.to_string(), reason)
    }

    fn object<'v>(&self, value: &'v Value) -> Result<&'v Map<String, Value>> {
        self.object_at(&self.path, value)
    }

    fn object_at<'v>(&self, path: &ConfigPath, value: &'v Value) -> Result<&'v Map<String, Value>> {
        value
            .as_object()
            .ok_or_else(|| self.fail(path, format!("expected a mapping, found {}", kind(value))))
    }

    fn string_at(&self, path: &ConfigPath, value: &Value) -> Result<String> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.fail(path, format!("expected a string, found {}", kind(value))))
    }

    fn string_list(&self, value: &Value) -> Result<Vec<ModuleId>> {
        self.string_list_at(&self.path, value)
    }

    fn string_list_at(&self, path: &ConfigPath, value: &Value) -> Result<Vec<ModuleId>> {
        let Some(items) = value.as_array() else {
            return Err(self.fail(
                path,
                format!("expected an array of module ids, found {}", kind(value)),
            ));
        };
        items
            .iter()
            .enumerate()
            .map(|(index, item)| self.string_at(&path.child(index.to_string()), item))
            .collect()
    }

    fn aliases(&self, value: &Value) -> Result<AliasTable> {
        self.object(value)?
            .iter()
            .map(|(alias, target)| {
                let target = self.string_at(&self.path.child(alias.as_str()), target)?;
                Ok((alias.clone(), target))
            })
            .collect()
    }

    fn shim(&self, value: &Value) -> Result<ShimTable> {
        let mut table = ShimTable::new();
        for (module, entry) in self.object(value)? {
            let path = self.path.child(module.as_str());
            let shim = match entry {
                // Loader shorthand: `"module": ["dep", ...]`.
                Value::Array(_) => ShimEntry {
                    deps: Some(self.string_list_at(&path, entry)?),
                    exports: None,
                },
                Value::Object(fields) => {
                    let mut shim = ShimEntry::default();
                    for (field, field_value) in fields {
                        let field_path = path.child(field.as_str());
                        match field.as_str() {
                            "deps" => shim.deps = Some(self.string_list_at(&field_path, field_value)?),
                            "exports" => shim.exports = Some(self.string_at(&field_path, field_value)?),
                            other => {
                                return Err(self.fail(
                                    &field_path,
                                    format!("unsupported shim field '{other}'"),
                                ))
                            }
                        }
                    }
                    shim
                }
                other => {
                    return Err(self.fail(
                        &path,
                        format!("expected a shim mapping or dependency array, found {}", kind(other)),
                    ))
                }
            };
            table.insert(module.clone(), shim);
        }
        Ok(table)
    }

    fn config(&self, value: &Value) -> Result<(MixinTable, Map<String, Value>)> {
        let mut mixins = MixinTable::new();
        let mut rest = Map::new();

        for (section, body) in self.object(value)? {
            if section != "mixins" {
                rest.insert(section.clone(), body.clone());
                continue;
            }

            let mixins_path = self.path.child("mixins");
            for (target, flags) in self.object_at(&mixins_path, body)? {
                let target_path = mixins_path.child(target.as_str());
                let bucket: &mut indexmap::IndexMap<ModuleId, bool> =
                    mixins.entry(target.clone()).or_default();
                for (mixin, enabled) in self.object_at(&target_path, flags)? {
                    let Some(enabled) = enabled.as_bool() else {
                        return Err(self.fail(
                            &target_path.child(mixin.as_str()),
                            format!("mixin flag must be a boolean, found {}", kind(enabled)),
                        ));
                    };
                    bucket.insert(mixin.clone(), enabled);
                }
            }
        }
        Ok((mixins, rest))
    }

    fn map(&self, value: &Value) -> Result<MapTable> {
        self.object(value)?
            .iter()
            .map(|(context, substitutions)| {
                let substitutions =
                    self.object_at(&self.path.child(context.as_str()), substitutions)?;
                Ok((context.clone(), substitutions.clone()))
            })
            .collect()
    }

    fn modules(&self, value: &Value) -> Result<Vec<BuildModule>> {
        let Some(items) = value.as_array() else {
            return Err(self.fail(
                &self.path,
                format!("expected an array of module descriptors, found {}", kind(value)),
            ));
        };
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                BuildModule::deserialize(item)
                    .map_err(|e| self.fail(&self.path.child(index.to_string()), e.to_string()))
            })
            .collect()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}
