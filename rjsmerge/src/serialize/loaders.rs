//! Runtime bundle loader snippet.
//!
//! Once bundles are built, the storefront needs a `require.config` call per
//! bundle telling the loader which modules live in it. Modules that carry
//! mixins are left commented out so the loader still fetches them
//! individually and applies the mixins.

use std::collections::HashSet;

use crate::model::MergedConfig;

/// Render one `require.config({bundles: ...})` call per created bundle.
///
/// Only modules with `create: true` are bundles; entry modules such as
/// `requirejs/require` are skipped. Returns an empty string when there are no
/// bundles.
///
/// # Examples
///
/// ```
/// use rjsmerge::serialize::render_bundle_loaders;
/// use rjsmerge::{BuildModule, MergedConfig};
///
/// let mut config = MergedConfig::default();
/// config.modules.push(BuildModule::named("requirejs/require"));
/// config.modules.push(BuildModule {
///     name: "bundles/main".to_string(),
///     include: vec!["js/menu".to_string()],
///     create: Some(true),
///     ..Default::default()
/// });
///
/// let snippet = render_bundle_loaders(&config);
/// assert!(snippet.contains("\"bundles/main\": ["));
/// assert!(snippet.contains("        \"js/menu\","));
/// ```
#[must_use]
pub fn render_bundle_loaders(config: &MergedConfig) -> String {
    let triggers: HashSet<&str> = config.mixin_targets().into_iter().collect();

    config
        .modules
        .iter()
        .filter(|module| module.create == Some(true))
        .map(|module| {
            let entries: String = module
                .include
                .iter()
                .map(|id| {
                    if triggers.contains(id.as_str()) {
                        format!("         // mixin trigger: \"{id}\",\n")
                    } else {
                        format!("        \"{id}\",\n")
                    }
                })
                .collect();
            format!(
                "require.config({{\n  bundles: {{\n    \"{}\": [\n{entries}    ]\n  }}\n}});",
                module.name
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
