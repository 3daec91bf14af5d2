//! Bundle module generation.
//!
//! A bundle layout names the bundles to build and the storefront URLs each
//! one serves, nested so that a child bundle only loads on pages reached
//! through its parent. Paired with a log of module requests captured while
//! browsing those URLs, it yields the optimizer `modules` list.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fragment::{ConfigFragment, FragmentPayload};
use crate::model::{BuildModule, ModuleId, LOADER_MODULE};

/// The bundle tree to generate modules for.
///
/// # Examples
///
/// ```
/// use rjsmerge::bundles::BundleLayout;
///
/// let layout = BundleLayout::from_yaml_str(
///     "bundles:\n  - name: bundles/main\n    urls: [\"/\"]\n    children: []\n",
/// )
/// .unwrap();
/// assert_eq!(layout.bundles[0].name, "bundles/main");
/// assert!(layout.module_blacklist.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleLayout {
    /// Top-level bundles.
    pub bundles: Vec<BundleItem>,
    /// Modules never placed in any bundle.
    #[serde(default)]
    pub module_blacklist: Option<Vec<ModuleId>>,
}

/// One bundle and the bundles that depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleItem {
    /// Bundle module name.
    pub name: ModuleId,
    /// Pages whose requests feed this bundle.
    #[serde(default)]
    pub urls: Vec<String>,
    /// Bundles loaded on top of this one.
    #[serde(default)]
    pub children: Vec<BundleItem>,
}

/// One captured module request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    /// URL of the requested file.
    pub url: String,
    /// Module id the loader asked for.
    pub id: ModuleId,
    /// Page the request was made from.
    pub referrer: String,
}

impl BundleLayout {
    /// Parse a JSON layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the text is not a layout, or
    /// [`Error::Validation`] if bundle names are empty or repeated.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let layout: Self = serde_json::from_str(text)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Parse a YAML layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Yaml`] if the text is not a layout, or
    /// [`Error::Validation`] if bundle names are empty or repeated.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let layout: Self = serde_yaml::from_str(text)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Parse a layout, choosing YAML for `.yaml`/`.yml` paths.
    ///
    /// # Errors
    ///
    /// Returns a parse error for either format.
    pub fn parse_for_path(path: &Path, text: &str) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(text),
            _ => Self::from_json_str(text),
        }
    }

    /// Check that every bundle in the tree has a unique, non-empty name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending bundle.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let mut pending: Vec<&BundleItem> = self.bundles.iter().collect();
        while let Some(item) = pending.pop() {
            if item.name.trim().is_empty() {
                return Err(Error::Validation {
                    field: "bundles.name".to_string(),
                    message: "bundle names must not be empty".to_string(),
                });
            }
            if item.name == LOADER_MODULE || !seen.insert(item.name.as_str()) {
                return Err(Error::Validation {
                    field: "bundles.name".to_string(),
                    message: format!("bundle name '{}' is used more than once", item.name),
                });
            }
            pending.extend(item.children.iter());
        }
        Ok(())
    }

    fn is_blacklisted(&self, id: &str) -> bool {
        self.module_blacklist
            .as_ref()
            .is_some_and(|list| list.iter().any(|entry| entry == id))
    }
}

/// Parse a JSON request log.
///
/// # Errors
///
/// Returns [`Error::Json`](crate::Error::Json) if the text is not a list of
/// request records.
pub fn parse_requests(text: &str) -> Result<Vec<RequestRecord>> {
    Ok(serde_json::from_str(text)?)
}

/// The id a bundle should include for a request.
///
/// Templates are inlined through the text plugin, so `.html` requests
/// become `text!<id>.html`.
///
/// # Examples
///
/// ```
/// use rjsmerge::bundles::{entry_point, RequestRecord};
///
/// let request = RequestRecord {
///     url: "one/two/three.html".into(),
///     id: "one/two/three".into(),
///     referrer: String::new(),
/// };
/// assert_eq!(entry_point(&request), "text!one/two/three.html");
/// ```
#[must_use]
pub fn entry_point(request: &RequestRecord) -> ModuleId {
    match Path::new(&request.url).extension().and_then(|ext| ext.to_str()) {
        Some("html") => format!("text!{}.html", request.id),
        _ => request.id.clone(),
    }
}

/// Generate the optimizer `modules` list.
///
/// The loader module comes first, followed by one created bundle per
/// layout item in depth-first order. A bundle includes the sorted ids
/// requested from its pages, minus blacklisted ids and ids already placed in
/// an ancestor or an earlier bundle; it excludes the chain of bundles above
/// it.
#[must_use]
pub fn generate_modules(layout: &BundleLayout, requests: &[RequestRecord]) -> Vec<BuildModule> {
    let mut modules = vec![BuildModule::named(LOADER_MODULE)];
    let mut placed = HashSet::new();
    collect(
        layout,
        requests,
        &layout.bundles,
        &mut placed,
        &[LOADER_MODULE.to_string()],
        &mut modules,
    );
    modules
}

fn collect(
    layout: &BundleLayout,
    requests: &[RequestRecord],
    items: &[BundleItem],
    placed: &mut HashSet<ModuleId>,
    parents: &[ModuleId],
    modules: &mut Vec<BuildModule>,
) {
    for item in items {
        let mut include: Vec<ModuleId> = requests
            .iter()
            .filter(|request| item.urls.contains(&request.referrer))
            .map(entry_point)
            .filter(|id| !placed.contains(id) && !layout.is_blacklisted(id))
            .collect();
        include.sort();
        include.dedup();

        log::debug!("bundle {} takes {} modules", item.name, include.len());
        placed.extend(include.iter().cloned());
        modules.push(BuildModule {
            name: item.name.clone(),
            include,
            exclude: parents.to_vec(),
            create: Some(true),
        });

        let mut chain = parents.to_vec();
        chain.push(item.name.clone());
        collect(layout, requests, &item.children, placed, &chain, modules);
    }
}

/// Wrap generated modules in a fragment so they merge like any other.
#[must_use]
pub fn modules_fragment(
    source_id: impl Into<String>,
    precedence: i64,
    layout: &BundleLayout,
    requests: &[RequestRecord],
) -> ConfigFragment {
    let payload = FragmentPayload {
        modules: generate_modules(layout, requests),
        ..Default::default()
    };
    ConfigFragment::new(source_id, precedence, payload)
}
