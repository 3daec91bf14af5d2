//! Integration tests for the `merge` command.

mod common;

use common::{example_build_path, example_build_text, TestEnv};
use predicates::prelude::*;
use serde_json::json;

#[test]
fn test_merge_fixture_to_stdout_is_byte_exact() {
    let env = TestEnv::new();

    let output = env
        .command()
        .arg("merge")
        .arg(example_build_path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout, format!("{}\n", example_build_text()));
}

#[test]
fn test_merge_fixture_to_output_file_is_byte_exact() {
    let env = TestEnv::new();
    let out = env.path().join("pub/static/build.js");

    env.command()
        .arg("merge")
        .arg(example_build_path())
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(std::fs::read_to_string(&out).unwrap(), example_build_text());
}

#[test]
fn test_merge_concatenates_shim_deps_in_argument_order() {
    let env = TestEnv::new();
    let ui = env.write_fragment(
        "Magento_Ui.json",
        &json!({"shim": {"jquery/ui": {"deps": ["jquery"]}}}),
    );
    let theme = env.write_fragment(
        "Magento_Theme.json",
        &json!({"shim": {"jquery/ui": {"deps": ["jquery/jquery-migrate"]}}}),
    );

    let output = env
        .command()
        .args(["merge", "--format", "json"])
        .arg(&ui)
        .arg(&theme)
        .output()
        .unwrap();

    assert!(output.status.success());
    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        document["shim"]["jquery/ui"]["deps"],
        json!(["jquery", "jquery/jquery-migrate"])
    );
}

#[test]
fn test_merge_format_from_env() {
    let env = TestEnv::new();
    let fragment = env.write_fragment("a.json", &json!({"deps": ["jquery"]}));

    env.command()
        .env("RJSMERGE_OUTPUT_FORMAT", "JSON")
        .arg("merge")
        .arg(&fragment)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{"));
}

#[test]
fn test_merge_setting_overrides_win_in_strict_mode() {
    let env = TestEnv::new();
    let fragment = env.write_fragment(
        "settings.json",
        &json!({"dir": "pub/static/frontend/Magento/luma/en_US", "optimize": "uglify"}),
    );

    let output = env
        .command()
        .args(["merge", "--strict"])
        .arg(&fragment)
        .args(["--dir", "var/build", "--optimize", "none"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("({\n  \"dir\": \"var/build\",\n"));
    assert!(stdout.contains("\"optimize\": \"none\""));
    assert!(String::from_utf8_lossy(&output.stderr).contains("overridden by '<overrides>'"));
}

#[test]
fn test_merge_reports_overrides_as_warnings() {
    let env = TestEnv::new();
    let a = env.write_fragment("a.json", &json!({"paths": {"mixins": "mage/requirejs/mixins"}}));
    let b = env.write_fragment("b.json", &json!({"paths": {"mixins": "custom/mixins"}}));

    env.command()
        .arg("merge")
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mixins\": \"custom/mixins\""))
        .stderr(predicate::str::contains("WARN: [value-conflict]"))
        .stderr(predicate::str::contains("paths[\"mixins\"]"));
}

#[test]
fn test_merge_strict_fails_on_override() {
    let env = TestEnv::new();
    let a = env.write_fragment("a.json", &json!({"paths": {"mixins": "mage/requirejs/mixins"}}));
    let b = env.write_fragment("b.json", &json!({"paths": {"mixins": "custom/mixins"}}));

    env.command()
        .arg("merge")
        .arg("--strict")
        .arg(&a)
        .arg(&b)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("value conflict at paths[\"mixins\"]"));
}

#[test]
fn test_merge_strict_from_env() {
    let env = TestEnv::new();
    let a = env.write_fragment("a.json", &json!({"paths": {"mixins": "a"}}));
    let b = env.write_fragment("b.json", &json!({"paths": {"mixins": "b"}}));

    env.command()
        .env("RJSMERGE_STRICT", "true")
        .arg("merge")
        .arg(&a)
        .arg(&b)
        .assert()
        .code(1);
}

#[test]
fn test_merge_strip_remote_paths() {
    let env = TestEnv::new();
    let fragment = env.write_fragment(
        "paypal.json",
        &json!({"paths": {"paypalInContextExpressCheckout": "https://www.paypalobjects.com/api/checkout"}}),
    );

    env.command()
        .arg("merge")
        .arg("--strip-remote-paths")
        .arg(&fragment)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "\"paypalInContextExpressCheckout\": \"empty:\"",
        ));
}

#[test]
fn test_merge_writes_bundle_loaders() {
    let env = TestEnv::new();
    let fragment = env.write_fragment(
        "bundles.json",
        &json!({
            "config": {"mixins": {"js/shane": {"js/shane-mixin": true}}},
            "modules": [
                {"name": "requirejs/require"},
                {"name": "bundles/main", "include": ["js/kittie", "js/shane"], "create": true}
            ]
        }),
    );
    let loaders = env.path().join("loaders.js");

    env.command()
        .arg("merge")
        .arg(&fragment)
        .arg("--loaders")
        .arg(&loaders)
        .assert()
        .success();

    let snippet = std::fs::read_to_string(&loaders).unwrap();
    assert!(snippet.starts_with("require.config({\n  bundles: {\n    \"bundles/main\": ["));
    assert!(snippet.contains("        \"js/kittie\",\n"));
    assert!(snippet.contains("         // mixin trigger: \"js/shane\",\n"));
}

#[test]
fn test_merge_rejects_same_loaders_and_output() {
    let env = TestEnv::new();
    let fragment = env.write_fragment("a.json", &json!({}));
    let target = env.path().join("build.js");

    env.command()
        .arg("merge")
        .arg(&fragment)
        .arg("--output")
        .arg(&target)
        .arg("--loaders")
        .arg(&target)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("--loaders"));
}

#[test]
fn test_merge_reads_yaml_and_envelopes() {
    let env = TestEnv::new();
    let base = env.write(
        "Magento_Theme.yaml",
        "map:\n  \"*\":\n    rowBuilder: Magento_Theme/js/row-builder\n",
    );
    // The envelope's precedence puts it first despite its position.
    let early = env.write(
        "early.json",
        r#"{"sourceId": "Vendor_Early", "precedence": -5, "payload": {"map": {"*": {"rowBuilder": "Vendor_Early/js/row"}}}}"#,
    );

    let output = env
        .command()
        .args(["merge", "--format", "json"])
        .arg(&base)
        .arg(&early)
        .output()
        .unwrap();

    assert!(output.status.success());
    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        document["map"]["*"]["rowBuilder"],
        "Magento_Theme/js/row-builder"
    );
}

#[test]
fn test_merge_reads_generated_requirejs_config() {
    let env = TestEnv::new();
    let generated = env.write(
        "requirejs-config.js",
        "(function(require){\n\
         (function() {\n var config = { shim: { 'jquery/ui': ['jquery'] }, deps: ['mage/common'] };\n require.config(config);\n})();\n\
         (function() {\n var config = { shim: { 'jquery/ui': { deps: ['jquery/jquery-migrate'] } } };\n require.config(config);\n})();\n\
         })(require);\n",
    );

    let output = env
        .command()
        .args(["merge", "--format", "json"])
        .arg(&generated)
        .output()
        .unwrap();

    assert!(output.status.success());
    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        document["shim"]["jquery/ui"]["deps"],
        json!(["jquery", "jquery/jquery-migrate"])
    );
    assert_eq!(document["deps"], json!(["mage/common"]));
}

#[test]
fn test_merge_invalid_script_is_malformed_input() {
    let env = TestEnv::new();
    let broken = env.write("requirejs-config.js", "(function() { var config = {");

    env.command()
        .arg("merge")
        .arg(&broken)
        .assert()
        .code(7)
        .stderr(predicate::str::contains("failed to parse script"));
}
