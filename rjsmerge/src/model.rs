//! The merged build configuration and its component tables.
//!
//! Every nested table is insertion ordered so that rendering the same merge
//! twice produces the same bytes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A module identifier as understood by the loader (`"jquery/ui"`).
pub type ModuleId = String;

/// `paths`: module alias to target path, `"empty:"`, or an absolute URL.
pub type AliasTable = IndexMap<String, String>;

/// `config.mixins`: target module to (mixin module to enabled flag).
pub type MixinTable = IndexMap<ModuleId, IndexMap<ModuleId, bool>>;

/// `map`: context (`"*"` or a module id) to (source module to replacement).
///
/// Leaves are kept as raw values so that a fragment supplying a mapping
/// where another supplied a module id surfaces as a shape conflict.
pub type MapTable = IndexMap<String, Map<String, Value>>;

/// `shim`: module id to shim settings.
pub type ShimTable = IndexMap<ModuleId, ShimEntry>;

/// The `map` context that applies to every module.
pub const GLOBAL_MAP_CONTEXT: &str = "*";

/// Null-module sentinel the optimizer skips when tracing dependencies.
pub const NULL_MODULE: &str = "empty:";

/// Loader module that heads every optimizer `modules` list.
pub const LOADER_MODULE: &str = "requirejs/require";

/// Top-level optimizer settings, in the order they are rendered.
pub const BUILD_SETTING_KEYS: [&str; 6] = [
    "dir",
    "baseUrl",
    "optimize",
    "generateSourceMaps",
    "keepBuildDir",
    "inlineText",
];

/// Shim settings for a non-AMD script.
///
/// # Examples
///
/// ```
/// use rjsmerge::ShimEntry;
///
/// let entry = ShimEntry::with_deps(["jquery"]);
/// assert_eq!(entry.deps.as_deref(), Some(&["jquery".to_string()][..]));
/// assert!(entry.exports.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShimEntry {
    /// Scripts that must load first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deps: Option<Vec<ModuleId>>,

    /// Global the script leaves behind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports: Option<String>,
}

impl ShimEntry {
    /// A shim that only declares dependencies.
    pub fn with_deps<I, S>(deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ModuleId>,
    {
        Self {
            deps: Some(deps.into_iter().map(Into::into).collect()),
            exports: None,
        }
    }

    /// A shim that only declares an exported global.
    pub fn with_exports(exports: impl Into<String>) -> Self {
        Self {
            deps: None,
            exports: Some(exports.into()),
        }
    }
}

/// One optimizer bundle descriptor from the `modules` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildModule {
    /// Bundle or entry module name.
    pub name: ModuleId,

    /// Modules pulled into the bundle.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<ModuleId>,

    /// Modules (or bundles) left out of the bundle.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<ModuleId>,

    /// Whether the optimizer should create the bundle file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<bool>,
}

impl BuildModule {
    /// A bare descriptor, as used for bootstrap entry modules.
    pub fn named(name: impl Into<ModuleId>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// The result of an aggregation run.
///
/// Fields mirror the top-level keys of an optimizer build file. Build
/// settings and unrecognised keys are kept as raw values; everything else is
/// typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedConfig {
    /// `dir`, `baseUrl`, `optimize` and the other [`BUILD_SETTING_KEYS`].
    pub settings: Map<String, Value>,
    /// Module aliases.
    pub paths: AliasTable,
    /// `bundles` passthrough (bundle id to module list).
    pub bundles: Map<String, Value>,
    /// `pkgs` passthrough.
    pub pkgs: Map<String, Value>,
    /// Legacy-script shims.
    pub shim: ShimTable,
    /// `config.mixins`.
    pub mixins: MixinTable,
    /// Every other `config` section (`text`, per-module settings).
    pub config: Map<String, Value>,
    /// Module substitutions.
    pub map: MapTable,
    /// Eagerly loaded modules.
    pub deps: Vec<ModuleId>,
    /// Bootstrap entry modules and bundles.
    pub modules: Vec<BuildModule>,
    /// Keys the registry does not recognise, passed through unchanged.
    pub extra: Map<String, Value>,
}

impl MergedConfig {
    /// Target modules that have at least one mixin declared, in output order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rjsmerge::MergedConfig;
    ///
    /// let mut config = MergedConfig::default();
    /// config
    ///     .mixins
    ///     .entry("jquery/jstree/jquery.jstree".to_string())
    ///     .or_default()
    ///     .insert("mage/backend/jstree-mixin".to_string(), true);
    /// assert_eq!(config.mixin_targets(), vec!["jquery/jstree/jquery.jstree"]);
    /// ```
    #[must_use]
    pub fn mixin_targets(&self) -> Vec<&str> {
        self.mixins
            .iter()
            .filter(|(_, mixins)| !mixins.is_empty())
            .map(|(target, _)| target.as_str())
            .collect()
    }

    /// Rewrite every remote `paths` target to [`NULL_MODULE`].
    ///
    /// The optimizer cannot trace modules served from another origin, so
    /// they must be excluded from the build. Returns the rewritten aliases.
    ///
    /// # Examples
    ///
    /// ```
    /// use rjsmerge::MergedConfig;
    ///
    /// let mut config = MergedConfig::default();
    /// config.paths.insert("one".into(), "one/one".into());
    /// config.paths.insert("two".into(), "http://two.com/two".into());
    ///
    /// assert_eq!(config.strip_remote_paths(), vec!["two".to_string()]);
    /// assert_eq!(config.paths["one"], "one/one");
    /// assert_eq!(config.paths["two"], "empty:");
    /// ```
    pub fn strip_remote_paths(&mut self) -> Vec<String> {
        let mut stripped = Vec::new();
        for (alias, target) in &mut self.paths {
            if is_remote_target(target) {
                *target = NULL_MODULE.to_string();
                stripped.push(alias.clone());
            }
        }
        stripped
    }

    /// Look up a top-level build setting.
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }
}

/// Whether a `paths` target points at another origin.
#[must_use]
pub fn is_remote_target(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://") || target.starts_with("//")
}
