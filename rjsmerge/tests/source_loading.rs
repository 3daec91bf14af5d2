//! Integration tests for loading fragments from disk.

mod common;

use common::{example_build_text, fixture_path, write_file};
use rjsmerge::bundles::{modules_fragment, parse_requests, BundleLayout};
use rjsmerge::serialize::{render_bundle_loaders, BuildFileRenderer, DocumentRenderer};
use rjsmerge::source::FragmentLoader;
use rjsmerge::{Aggregator, Error, MergeOptions, ShimEntry};
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_fixture_loads_as_build_file() {
    let fragments = FragmentLoader::load_file(&fixture_path("example-build.js"), 0).unwrap();
    assert_eq!(fragments.len(), 1);
    let result = Aggregator::default().aggregate(&fragments).unwrap();
    assert_eq!(
        BuildFileRenderer.render(&result.config).unwrap(),
        example_build_text()
    );
}

#[test]
fn test_mixed_formats_merge_in_argument_order() {
    let dir = TempDir::new().unwrap();
    let theme = write_file(
        dir.path(),
        "Magento_Theme.json",
        r#"{"paths": {"menu": "mage/menu"}, "deps": ["jquery"]}"#,
    );
    let custom = write_file(
        dir.path(),
        "Vendor_Custom.yaml",
        "paths:\n  menu: Vendor_Custom/js/menu\ndeps:\n  - Vendor_Custom/js/init\n",
    );

    let fragments = FragmentLoader::load_all(&[theme, custom]).unwrap();
    let result = Aggregator::default().aggregate(&fragments).unwrap();

    assert_eq!(result.config.paths["menu"], "Vendor_Custom/js/menu");
    assert_eq!(result.config.deps, ["jquery", "Vendor_Custom/js/init"]);
    let record = result.diagnostics.conflicts().next().unwrap();
    assert!(record.winning_source_id.ends_with("Vendor_Custom.yaml"));
}

#[test]
fn test_envelope_precedence_beats_argument_order() {
    let dir = TempDir::new().unwrap();
    let high = write_file(
        dir.path(),
        "high.json",
        r#"{"sourceId": "Vendor_Theme", "precedence": 100, "payload": {"optimize": "uglify"}}"#,
    );
    let low = write_file(dir.path(), "low.json", r#"{"optimize": "none"}"#);

    let fragments = FragmentLoader::load_all(&[high, low]).unwrap();
    let result = Aggregator::default().aggregate(&fragments).unwrap();
    assert_eq!(
        result.config.setting("optimize"),
        Some(&json!("uglify"))
    );
}

#[test]
fn test_strip_remote_paths_from_files() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "payments.json",
        r#"{"paths": {"braintree": "https://js.braintreegateway.com/v2/braintree"}}"#,
    );
    let fragments = FragmentLoader::load_all(&[path]).unwrap();
    let result = Aggregator::new(MergeOptions::default().with_strip_remote_paths(true))
        .aggregate(&fragments)
        .unwrap();
    assert_eq!(result.config.paths["braintree"], "empty:");
}

#[test]
fn test_generated_config_splits_into_blocks_in_file_order() {
    let path = fixture_path("requirejs-config.js");
    let fragments = FragmentLoader::load_file(&path, 0).unwrap();

    let source = path.display().to_string();
    let ids: Vec<&str> = fragments.iter().map(|f| f.source_id.as_str()).collect();
    assert_eq!(
        ids,
        [format!("{source}#1"), format!("{source}#2"), format!("{source}#3")]
    );

    let result = Aggregator::default().aggregate(&fragments).unwrap();
    let config = &result.config;

    assert_eq!(
        config.shim["jquery/ui"],
        ShimEntry::with_deps(["jquery", "jquery/jquery-migrate"])
    );
    assert_eq!(
        config.deps,
        [
            "jquery/jquery.mobile.custom",
            "mage/common",
            "mage/dataPost",
            "Magento_Theme/js/theme"
        ]
    );
    let global_map: Vec<&str> = config.map["*"].keys().map(String::as_str).collect();
    assert_eq!(
        global_map,
        ["rowBuilder", "toggleAdvanced", "translateInline", "ko", "knockout"]
    );
    assert_eq!(
        config.map["Magento_Checkout/js/view/payment"]["jquery/ui"],
        "Magento_Checkout/js/jquery-ui-shim"
    );
    assert_eq!(config.mixin_targets(), ["jquery/jstree/jquery.jstree"]);
    assert_eq!(
        config.config["text"],
        json!({"headers": {"X-Requested-With": "XMLHttpRequest"}})
    );
    assert_eq!(config.config["Magento_Ui/js/core/app"], json!({}));
    assert!(config.extra.is_empty());
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_generated_config_merges_with_other_fragments() {
    let dir = TempDir::new().unwrap();
    let custom = write_file(
        dir.path(),
        "Vendor_Custom.json",
        r#"{"paths": {"jquery/ui": "Vendor_Custom/js/jquery-ui"}}"#,
    );

    let fragments = FragmentLoader::load_all(&[fixture_path("requirejs-config.js"), custom]).unwrap();
    let result = Aggregator::new(MergeOptions::default().with_strip_remote_paths(true))
        .aggregate(&fragments)
        .unwrap();

    assert_eq!(result.config.paths["jquery/ui"], "Vendor_Custom/js/jquery-ui");
    assert_eq!(result.config.paths["braintree"], "empty:");
    let record = result.diagnostics.conflicts().next().unwrap();
    assert!(record.winning_source_id.ends_with("Vendor_Custom.json"));
    assert!(record
        .overridden_source_id
        .as_deref()
        .is_some_and(|id| id.ends_with("requirejs-config.js#1")));
}

#[test]
fn test_malformed_file_names_its_path() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "broken.json", r#"{"deps": "jquery"}"#);
    let err = FragmentLoader::load_file(&path, 0).unwrap_err();
    assert!(matches!(err, Error::MalformedFragment { .. }));
    assert_eq!(err.source_id(), Some(path.display().to_string().as_str()));
}

#[test]
fn test_generated_modules_merge_and_render_loaders() {
    let layout = BundleLayout::from_yaml_str(
        "module_blacklist: [mage/bootstrap]\nbundles:\n  - name: bundles/main\n    urls: ['/']\n    children: []\n",
    )
    .unwrap();
    let requests = parse_requests(
        r#"[
            {"url": "/static/jquery.js", "id": "jquery", "referrer": "/"},
            {"url": "/static/mage/bootstrap.js", "id": "mage/bootstrap", "referrer": "/"},
            {"url": "/static/mage/validation.js", "id": "mage/validation", "referrer": "/"}
        ]"#,
    )
    .unwrap();

    let base = common::fragment(
        "Magento_Theme",
        0,
        json!({
            "modules": [{"name": "requirejs/require"}],
            "config": {"mixins": {"mage/validation": {"Vendor/js/validation-mixin": true}}}
        }),
    );
    let generated = modules_fragment("bundles", 1, &layout, &requests);
    let result = Aggregator::default().aggregate(&[base, generated]).unwrap();

    assert_eq!(result.config.modules.len(), 2);
    assert_eq!(result.config.modules[1].include, ["jquery", "mage/validation"]);

    let loaders = render_bundle_loaders(&result.config);
    assert!(loaders.contains("        \"jquery\","));
    assert!(loaders.contains("// mixin trigger: \"mage/validation\","));
}
