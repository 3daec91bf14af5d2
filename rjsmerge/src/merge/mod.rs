//! Fragment aggregation.
//!
//! Fragments are applied one at a time, lowest precedence first, onto a
//! single [`MergedConfig`]. Each top-level key is dispatched by its
//! [`MergeStrategy`] to the replace, deep or list engine, and every replace
//! decision is observed by the [`ConflictReporter`].
//!
//! # Examples
//!
//! ```
//! use rjsmerge::{Aggregator, ConfigFragment, MergeOptions};
//! use serde_json::json;
//!
//! let base = ConfigFragment::from_value(
//!     "Magento_Theme",
//!     0,
//!     &json!({"paths": {"mixins": "mage/requirejs/mixins"}, "deps": ["jquery"]}),
//! )
//! .unwrap();
//! let custom = ConfigFragment::from_value(
//!     "Vendor_Custom",
//!     10,
//!     &json!({"paths": {"mixins": "custom/mixins"}, "deps": ["jquery", "mage/common"]}),
//! )
//! .unwrap();
//!
//! let result = Aggregator::new(MergeOptions::default())
//!     .aggregate(&[custom, base])
//!     .unwrap();
//!
//! assert_eq!(result.config.paths["mixins"], "custom/mixins");
//! assert_eq!(result.config.deps, vec!["jquery", "mage/common"]);
//! assert!(result.diagnostics.has_conflicts());
//! ```

pub mod conflict;
pub mod deep;
pub mod list;
pub mod strategy;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::fragment::{ConfigFragment, FragmentPayload};
use crate::model::MergedConfig;

pub use conflict::{ConfigPath, ConflictRecord, ConflictReporter, Diagnostic, DiagnosticLog, Shape};
pub use deep::MergeContext;
pub use strategy::{MergeStrategy, TopLevelKey};

/// Source id under which [`MergeOptions::overrides`] are applied.
pub const OVERRIDES_SOURCE_ID: &str = "<overrides>";

/// Settings for one aggregation run.
///
/// # Examples
///
/// ```
/// use rjsmerge::MergeOptions;
///
/// let options = MergeOptions::default()
///     .with_strict(true)
///     .with_strip_remote_paths(true);
/// assert!(options.strict);
/// assert!(options.overrides.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOptions {
    /// Promote value conflicts between fragments to errors.
    pub strict: bool,
    /// Rewrite absolute-URL `paths` targets to `"empty:"` after merging.
    pub strip_remote_paths: bool,
    /// Applied after every fragment; typically build settings from the
    /// command line.
    pub overrides: Option<FragmentPayload>,
}

impl MergeOptions {
    /// Set strict mode.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set remote path stripping.
    #[must_use]
    pub fn with_strip_remote_paths(mut self, strip: bool) -> Self {
        self.strip_remote_paths = strip;
        self
    }

    /// Set the override payload.
    #[must_use]
    pub fn with_overrides(mut self, overrides: FragmentPayload) -> Self {
        self.overrides = Some(overrides);
        self
    }
}

/// The outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// The merged document.
    pub config: MergedConfig,
    /// Overrides and warnings raised on the way.
    pub diagnostics: DiagnosticLog,
}

/// Runs aggregations with fixed options.
///
/// An aggregator holds no per-run state, so one instance can serve any
/// number of runs, including from several threads.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    options: MergeOptions,
}

impl Aggregator {
    /// Create an aggregator.
    #[must_use]
    pub fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    /// The options in effect.
    #[must_use]
    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Merge `fragments` into one document.
    ///
    /// Fragments are applied in ascending precedence; fragments of equal
    /// precedence keep their order in the slice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFragment`] on duplicate source ids,
    /// [`Error::ShapeConflict`] on structural mismatches, and
    /// [`Error::ValueConflict`] on overrides in strict mode. No partial
    /// document is returned.
    pub fn aggregate(&self, fragments: &[ConfigFragment]) -> Result<Aggregation> {
        check_unique_ids(fragments)?;

        let mut ordered: Vec<&ConfigFragment> = fragments.iter().collect();
        ordered.sort_by_key(|fragment| fragment.precedence);

        let mut config = MergedConfig::default();
        let mut reporter = ConflictReporter::new(self.options.strict);

        for fragment in ordered {
            log::debug!(
                "applying fragment '{}' (precedence {})",
                fragment.source_id,
                fragment.precedence
            );
            merge_into(&mut config, &fragment.source_id, &fragment.payload, &mut reporter)?;
        }

        if let Some(ref overrides) = self.options.overrides {
            log::debug!("applying overrides");
            reporter.set_strict(false);
            merge_into(&mut config, OVERRIDES_SOURCE_ID, overrides, &mut reporter)?;
        }

        if self.options.strip_remote_paths {
            for alias in config.strip_remote_paths() {
                log::debug!("paths[{alias:?}] points at a remote origin; replaced with empty:");
            }
        }

        Ok(Aggregation {
            config,
            diagnostics: reporter.into_log(),
        })
    }
}

/// Merge `fragments` with `options`.
///
/// # Errors
///
/// See [`Aggregator::aggregate`].
pub fn aggregate(fragments: &[ConfigFragment], options: &MergeOptions) -> Result<Aggregation> {
    Aggregator::new(options.clone()).aggregate(fragments)
}

fn check_unique_ids(fragments: &[ConfigFragment]) -> Result<()> {
    let mut seen = HashSet::new();
    for fragment in fragments {
        if !seen.insert(fragment.source_id.as_str()) {
            return Err(Error::malformed(
                &fragment.source_id,
                "<root>",
                "source id is used by more than one fragment",
            ));
        }
    }
    Ok(())
}

/// Apply one payload to `target` (payload overwrites target).
///
/// Each present key is routed by its [`MergeStrategy`] to the replace,
/// shallow, deep or list engine.
///
/// # Errors
///
/// Returns [`Error::ShapeConflict`], or [`Error::ValueConflict`] when the
/// reporter is strict.
pub fn merge_into(
    target: &mut MergedConfig,
    source_id: &str,
    payload: &FragmentPayload,
    reporter: &mut ConflictReporter,
) -> Result<()> {
    let mut ctx = MergeContext::new(source_id, reporter);

    for key in payload.present_keys() {
        let path = ConfigPath::root(key.as_str());
        match key.strategy() {
            MergeStrategy::Replace => replace_key(target, &key, payload, &path, &mut ctx)?,
            MergeStrategy::ShallowMerge => shallow_merge_key(target, &key, payload, &path, &mut ctx)?,
            MergeStrategy::DeepMerge2Level => deep_merge_key(target, &key, payload, &path, &mut ctx)?,
            MergeStrategy::ConcatDedupList => concat_key(target, &key, payload)?,
        }
    }

    Ok(())
}

fn replace_key(
    target: &mut MergedConfig,
    key: &TopLevelKey,
    payload: &FragmentPayload,
    path: &ConfigPath,
    ctx: &mut MergeContext<'_>,
) -> Result<()> {
    match key {
        TopLevelKey::Setting(name) => {
            if let Some(value) = payload.settings.get(name) {
                deep::merge_entry(&mut target.settings, name, value, path, ctx)?;
            }
        }
        TopLevelKey::Unknown(name) => {
            ctx.report_unknown_key(name);
            if let Some(value) = payload.unknown.get(name) {
                deep::merge_entry(&mut target.extra, name, value, path, ctx)?;
            }
        }
        other => return Err(unroutable(other)),
    }
    Ok(())
}

fn shallow_merge_key(
    target: &mut MergedConfig,
    key: &TopLevelKey,
    payload: &FragmentPayload,
    path: &ConfigPath,
    ctx: &mut MergeContext<'_>,
) -> Result<()> {
    match key {
        TopLevelKey::Paths => deep::merge_aliases(&mut target.paths, &payload.paths, path, ctx),
        TopLevelKey::Bundles => deep::merge_shallow(&mut target.bundles, &payload.bundles, path, ctx),
        TopLevelKey::Pkgs => deep::merge_shallow(&mut target.pkgs, &payload.pkgs, path, ctx),
        other => Err(unroutable(other)),
    }
}

fn deep_merge_key(
    target: &mut MergedConfig,
    key: &TopLevelKey,
    payload: &FragmentPayload,
    path: &ConfigPath,
    ctx: &mut MergeContext<'_>,
) -> Result<()> {
    match key {
        TopLevelKey::Shim => deep::merge_shim(&mut target.shim, &payload.shim, path, ctx),
        TopLevelKey::Config => {
            deep::merge_mixins(&mut target.mixins, &payload.mixins, &path.child("mixins"), ctx)?;
            deep::merge_object(&mut target.config, &payload.config, path, ctx)
        }
        TopLevelKey::Map => deep::merge_map_table(&mut target.map, &payload.map, path, ctx),
        other => Err(unroutable(other)),
    }
}

fn concat_key(target: &mut MergedConfig, key: &TopLevelKey, payload: &FragmentPayload) -> Result<()> {
    match key {
        TopLevelKey::Deps => {
            list::merge_deps(&mut target.deps, &payload.deps);
        }
        TopLevelKey::Modules => {
            list::merge_modules(&mut target.modules, &payload.modules);
        }
        other => return Err(unroutable(other)),
    }
    Ok(())
}

fn unroutable(key: &TopLevelKey) -> Error {
    Error::Validation {
        field: key.to_string(),
        message: format!("no {} engine handles this key", key.strategy()),
    }
}
