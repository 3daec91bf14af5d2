//! Key merge strategy registry.
//!
//! Each top-level key of a build configuration merges differently. The set
//! of keys and behaviours is fixed, so dispatch is a closed enum rather than
//! a trait object.

use std::fmt;

use crate::model::BUILD_SETTING_KEYS;

/// How values under a top-level key combine across fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// The later fragment's value replaces the earlier one.
    Replace,
    /// Entries are unioned by key; colliding entries are replaced whole.
    ShallowMerge,
    /// Two nested levels are unioned; leaves are replaced.
    DeepMerge2Level,
    /// Lists are concatenated without duplicates, first-seen order kept.
    ConcatDedupList,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::ShallowMerge => write!(f, "shallow-merge"),
            Self::DeepMerge2Level => write!(f, "deep-merge"),
            Self::ConcatDedupList => write!(f, "concat-dedup"),
        }
    }
}

/// A top-level configuration key, classified.
///
/// # Examples
///
/// ```
/// use rjsmerge::merge::{MergeStrategy, TopLevelKey};
///
/// assert_eq!(TopLevelKey::parse("shim"), TopLevelKey::Shim);
/// assert_eq!(TopLevelKey::parse("deps").strategy(), MergeStrategy::ConcatDedupList);
/// assert!(!TopLevelKey::parse("waitSeconds").is_known());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TopLevelKey {
    /// One of the optimizer settings (`dir`, `baseUrl`, ...).
    Setting(String),
    /// `paths`
    Paths,
    /// `bundles`
    Bundles,
    /// `pkgs`
    Pkgs,
    /// `shim`
    Shim,
    /// `config`
    Config,
    /// `map`
    Map,
    /// `deps`
    Deps,
    /// `modules`
    Modules,
    /// Anything else; passed through with a warning.
    Unknown(String),
}

impl TopLevelKey {
    /// Classify a key name.
    #[must_use]
    pub fn parse(key: &str) -> Self {
        match key {
            "paths" => Self::Paths,
            "bundles" => Self::Bundles,
            "pkgs" => Self::Pkgs,
            "shim" => Self::Shim,
            "config" => Self::Config,
            "map" => Self::Map,
            "deps" => Self::Deps,
            "modules" => Self::Modules,
            other if BUILD_SETTING_KEYS.contains(&other) => Self::Setting(other.to_string()),
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The key as it appears in a document.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Setting(name) | Self::Unknown(name) => name,
            Self::Paths => "paths",
            Self::Bundles => "bundles",
            Self::Pkgs => "pkgs",
            Self::Shim => "shim",
            Self::Config => "config",
            Self::Map => "map",
            Self::Deps => "deps",
            Self::Modules => "modules",
        }
    }

    /// The merge behaviour for this key.
    #[must_use]
    pub fn strategy(&self) -> MergeStrategy {
        match self {
            Self::Setting(_) | Self::Unknown(_) => MergeStrategy::Replace,
            Self::Paths | Self::Bundles | Self::Pkgs => MergeStrategy::ShallowMerge,
            Self::Shim | Self::Config | Self::Map => MergeStrategy::DeepMerge2Level,
            Self::Deps | Self::Modules => MergeStrategy::ConcatDedupList,
        }
    }

    /// Whether the registry recognises this key.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for TopLevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
