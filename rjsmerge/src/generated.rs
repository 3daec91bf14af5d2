//! Reading the loader configuration a storefront generates at deploy time.
//!
//! A deployed theme ships one `requirejs-config.js` that concatenates every
//! module's configuration, each wrapped in its own function:
//!
//! ```js
//! (function() {
//!     var config = { map: { "*": { rowBuilder: "Magento_Theme/js/row-builder" } } };
//!     require.config(config);
//! })();
//! ```
//!
//! The script is parsed, never run. Every `var config = {...}` and every
//! `require.config({...})` object literal becomes one fragment, in file
//! order. Only the keys the storefront generator writes (`paths`, `map`,
//! `deps`, `config`, `shim`) are kept, and only literal values: functions,
//! identifiers and other computed values are dropped.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ArrayExpressionElement, Expression, ObjectExpression, ObjectPropertyKind, PropertyKey,
    Statement,
};
use oxc_parser::Parser;
use oxc_span::SourceType;
use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};
use crate::fragment::ConfigFragment;

/// Top-level keys taken from each configuration block.
pub const GENERATED_KEYS: &[&str] = &["paths", "map", "deps", "config", "shim"];

const LOADER_GLOBALS: &[&str] = &["require", "requirejs"];

/// Split a generated `requirejs-config.js` into fragments.
///
/// Block `n` (1-based, counting non-empty blocks) gets the source id
/// `"{source_id}#{n}"`. All blocks share `precedence`, so a stable merge
/// applies them in file order.
///
/// # Errors
///
/// Returns [`Error::Script`] if `text` is not valid JavaScript, or
/// [`Error::MalformedFragment`] if a block's literal values have the wrong
/// shape.
///
/// # Examples
///
/// ```
/// use rjsmerge::generated::parse_generated_config;
///
/// let script = r#"
/// (function() {
///     var config = { deps: ["jquery/jquery.mobile.custom", "mage/common"] };
///     require.config(config);
/// })();
/// (function() {
///     var config = { paths: { "jquery/ui": "jquery/jquery-ui" } };
///     require.config(config);
/// })();
/// require(["jquery"], function($) { $.noConflict(); });
/// "#;
///
/// let fragments = parse_generated_config("requirejs-config.js", 0, script).unwrap();
/// assert_eq!(fragments.len(), 2);
/// assert_eq!(fragments[1].source_id, "requirejs-config.js#2");
/// assert_eq!(fragments[1].payload.paths["jquery/ui"], "jquery/jquery-ui");
/// ```
pub fn parse_generated_config(
    source_id: &str,
    precedence: i64,
    text: &str,
) -> Result<Vec<ConfigFragment>> {
    config_blocks(source_id, text)?
        .into_iter()
        .filter(|block| !block.is_empty())
        .zip(1..)
        .map(|(block, n)| {
            ConfigFragment::from_value(format!("{source_id}#{n}"), precedence, &Value::Object(block))
        })
        .collect()
}

/// Every configuration object literal in `text`, in file order, reduced to
/// [`GENERATED_KEYS`] and literal values. Blocks may be empty.
///
/// # Errors
///
/// Returns [`Error::Script`] if `text` is not valid JavaScript.
pub fn config_blocks(source_id: &str, text: &str) -> Result<Vec<Map<String, Value>>> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, text, SourceType::cjs()).parse();

    if parsed.panicked || !parsed.errors.is_empty() {
        let reason = parsed
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Error::Script {
            source_id: source_id.to_string(),
            reason,
        });
    }

    let mut blocks = Vec::new();
    collect_blocks(&parsed.program.body, &mut blocks);
    log::debug!("{source_id}: found {} configuration blocks", blocks.len());
    Ok(blocks)
}

fn collect_blocks(statements: &[Statement<'_>], blocks: &mut Vec<Map<String, Value>>) {
    for statement in statements {
        match statement {
            Statement::VariableDeclaration(declaration) => {
                for declarator in &declaration.declarations {
                    let named_config = declarator
                        .id
                        .get_identifier_name()
                        .is_some_and(|name| name.as_str() == "config");
                    if !named_config {
                        continue;
                    }
                    if let Some(Expression::ObjectExpression(object)) =
                        declarator.init.as_ref().map(unwrap_parens)
                    {
                        blocks.push(block_from(object));
                    }
                }
            }
            Statement::ExpressionStatement(statement) => {
                collect_from_expression(&statement.expression, blocks);
            }
            Statement::BlockStatement(block) => collect_blocks(&block.body, blocks),
            _ => {}
        }
    }
}

/// Follow immediately invoked functions and `require.config({...})` calls.
fn collect_from_expression(expression: &Expression<'_>, blocks: &mut Vec<Map<String, Value>>) {
    let Expression::CallExpression(call) = unwrap_parens(expression) else {
        return;
    };

    match unwrap_parens(&call.callee) {
        Expression::FunctionExpression(function) => {
            if let Some(body) = &function.body {
                collect_blocks(&body.statements, blocks);
            }
        }
        Expression::ArrowFunctionExpression(arrow) => collect_blocks(&arrow.body.statements, blocks),
        Expression::StaticMemberExpression(member) if member.property.name.as_str() == "config" => {
            let on_loader = matches!(
                unwrap_parens(&member.object),
                Expression::Identifier(ident) if LOADER_GLOBALS.contains(&ident.name.as_str())
            );
            if !on_loader {
                return;
            }
            // `require.config(config)` repeats a block already taken from its `var`.
            if let Some(Expression::ObjectExpression(object)) = call
                .arguments
                .first()
                .and_then(|argument| argument.as_expression())
                .map(unwrap_parens)
            {
                blocks.push(block_from(object));
            }
        }
        _ => {}
    }
}

fn unwrap_parens<'e, 'a>(mut expression: &'e Expression<'a>) -> &'e Expression<'a> {
    while let Expression::ParenthesizedExpression(inner) = expression {
        expression = &inner.expression;
    }
    expression
}

fn block_from(object: &ObjectExpression<'_>) -> Map<String, Value> {
    let mut block = literal_object(object);
    block.retain(|key, _| GENERATED_KEYS.contains(&key.as_str()));
    block
}

fn literal_object(object: &ObjectExpression<'_>) -> Map<String, Value> {
    let mut map = Map::new();
    for property in &object.properties {
        let ObjectPropertyKind::ObjectProperty(property) = property else {
            continue;
        };
        let Some(key) = property_key(&property.key) else {
            continue;
        };
        if let Some(value) = literal_value(&property.value) {
            map.insert(key, value);
        }
    }
    map
}

fn property_key(key: &PropertyKey<'_>) -> Option<String> {
    match key {
        PropertyKey::StaticIdentifier(ident) => Some(ident.name.to_string()),
        PropertyKey::StringLiteral(lit) => Some(lit.value.to_string()),
        PropertyKey::NumericLiteral(lit) => Some(lit.value.to_string()),
        _ => None,
    }
}

fn literal_value(expression: &Expression<'_>) -> Option<Value> {
    match unwrap_parens(expression) {
        Expression::StringLiteral(lit) => Some(Value::String(lit.value.to_string())),
        Expression::BooleanLiteral(lit) => Some(Value::Bool(lit.value)),
        Expression::NullLiteral(_) => Some(Value::Null),
        Expression::NumericLiteral(lit) => number(lit.value),
        Expression::ArrayExpression(array) => Some(Value::Array(
            array
                .elements
                .iter()
                .filter_map(ArrayExpressionElement::as_expression)
                .filter_map(literal_value)
                .collect(),
        )),
        Expression::ObjectExpression(object) => Some(Value::Object(literal_object(object))),
        _ => None,
    }
}

/// Whole numbers stay integers so `waitSeconds: 0` does not render as `0.0`.
#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
fn number(value: f64) -> Option<Value> {
    if value.trunc() == value && value.abs() < 9.0e15 {
        return Some(Value::from(value as i64));
    }
    Number::from_f64(value).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_syntax_error_is_a_script_error() {
        let err = config_blocks("broken.js", "(function() { var config = {;").unwrap_err();
        assert!(matches!(err, Error::Script { ref source_id, .. } if source_id == "broken.js"));
        assert_eq!(err.source_id(), Some("broken.js"));
    }

    #[test]
    fn test_non_literal_values_are_dropped() {
        let script = r#"
            var config = {
                paths: { "jquery/ui": "jquery/jquery-ui", dynamic: base + "/x" },
                config: { "Magento_Ui/js/core/app": { onLoad: function() {}, timeout: 30 } },
                deps: ["jquery", someVariable]
            };
        "#;
        let blocks = config_blocks("a.js", script).unwrap();
        assert_eq!(
            Value::Object(blocks[0].clone()),
            json!({
                "paths": {"jquery/ui": "jquery/jquery-ui"},
                "config": {"Magento_Ui/js/core/app": {"timeout": 30}},
                "deps": ["jquery"]
            })
        );
    }

    #[test]
    fn test_only_generated_keys_are_kept() {
        let script = r"require.config({ baseUrl: 'static', waitSeconds: 0, deps: ['x'] });";
        let blocks = config_blocks("a.js", script).unwrap();
        assert_eq!(Value::Object(blocks[0].clone()), json!({"deps": ["x"]}));
    }

    #[test]
    fn test_config_calls_on_other_objects_are_ignored() {
        let script = r"
            window.config({ deps: ['a'] });
            requirejs.config({ deps: ['b'] });
            var settings = { deps: ['c'] };
        ";
        let blocks = config_blocks("a.js", script).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0]["deps"], json!(["b"]));
    }

    #[test]
    fn test_nested_wrappers_are_followed() {
        let script = r"
            (function(require) {
                (function() {
                    var config = { deps: ['one'] };
                    require.config(config);
                })();
                (() => { var config = { deps: ['two'] }; require.config(config); })();
            })(require);
        ";
        let blocks = config_blocks("a.js", script).unwrap();
        let deps: Vec<&Value> = blocks.iter().map(|block| &block["deps"]).collect();
        assert_eq!(deps, [&json!(["one"]), &json!(["two"])]);
    }

    #[test]
    fn test_empty_blocks_are_skipped_when_numbering() {
        let script = r"
            (function() { var config = { waitSeconds: 7 }; require.config(config); })();
            (function() { var config = { deps: ['x'] }; require.config(config); })();
        ";
        let fragments = parse_generated_config("rc.js", 3, script).unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].source_id, "rc.js#1");
        assert_eq!(fragments[0].precedence, 3);
    }

    #[test]
    fn test_malformed_literal_is_reported_against_its_block() {
        let script = r"
            (function() { var config = { deps: ['x'] }; require.config(config); })();
            (function() { var config = { shim: { 'jquery/ui': 'jquery' } }; require.config(config); })();
        ";
        let err = parse_generated_config("rc.js", 0, script).unwrap_err();
        assert!(matches!(err, Error::MalformedFragment { .. }));
        assert_eq!(err.source_id(), Some("rc.js#2"));
    }

    #[test]
    fn test_whole_numbers_stay_integers() {
        assert_eq!(number(30.0), Some(json!(30)));
        assert_eq!(number(1.5), Some(json!(1.5)));
    }
}
