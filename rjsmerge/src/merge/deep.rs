//! Deep merge engine for mapping-valued keys.
//!
//! Mappings are unioned key by key. When both sides hold a mapping the
//! merge recurses; when both hold a leaf the incoming value replaces the
//! existing one and the decision goes to the conflict reporter. A mapping
//! meeting a list or scalar is a fatal shape conflict.

use serde_json::{Map, Value};

use crate::error::Result;
use crate::merge::conflict::{ConfigPath, ConflictReporter, Shape};
use crate::merge::list;
use crate::model::{AliasTable, MapTable, MixinTable, ShimTable};

/// The fragment being applied and the reporter observing it.
pub struct MergeContext<'a> {
    source_id: &'a str,
    reporter: &'a mut ConflictReporter,
}

impl<'a> MergeContext<'a> {
    /// Start applying the fragment `source_id`.
    pub fn new(source_id: &'a str, reporter: &'a mut ConflictReporter) -> Self {
        Self {
            source_id,
            reporter,
        }
    }

    /// The fragment being applied.
    #[must_use]
    pub fn source_id(&self) -> &str {
        self.source_id
    }

    /// Note an unknown top-level key.
    pub fn report_unknown_key(&mut self, key: &str) {
        self.reporter.report_unknown_key(self.source_id, key);
    }

    fn inserted(&mut self, path: &ConfigPath) {
        self.reporter.record_origin(path, self.source_id);
    }

    fn replace(&mut self, path: &ConfigPath, old_value: &Value, new_value: &Value) -> Result<()> {
        self.reporter
            .report_override(path, old_value, new_value, self.source_id)
    }
}

/// Recursively merge `incoming` into `existing`.
///
/// # Errors
///
/// Returns a shape conflict when the two values have different shapes, or a
/// value conflict in strict mode when leaves differ.
pub fn merge_value(
    existing: &mut Value,
    incoming: &Value,
    path: &ConfigPath,
    ctx: &mut MergeContext<'_>,
) -> Result<()> {
    let (have, want) = (Shape::of(existing), Shape::of(incoming));
    if have != want {
        return Err(ctx
            .reporter
            .shape_conflict(path, have, want, ctx.source_id));
    }

    match (existing, incoming) {
        (Value::Object(current), Value::Object(next)) => merge_object(current, next, path, ctx),
        (slot, next) => replace_leaf(slot, next, path, ctx),
    }
}

/// Union two mappings, recursing into shared keys.
///
/// # Errors
///
/// Propagates errors from [`merge_value`].
pub fn merge_object(
    existing: &mut Map<String, Value>,
    incoming: &Map<String, Value>,
    path: &ConfigPath,
    ctx: &mut MergeContext<'_>,
) -> Result<()> {
    for (key, value) in incoming {
        let child = path.child(key.as_str());
        match existing.get_mut(key) {
            Some(current) => merge_value(current, value, &child, ctx)?,
            None => {
                existing.insert(key.clone(), value.clone());
                ctx.inserted(&child);
            }
        }
    }
    Ok(())
}

/// Union two mappings, replacing colliding entries whole.
///
/// Used for `bundles`, `pkgs`, top-level settings and passthrough keys.
///
/// # Errors
///
/// Returns a shape conflict when a colliding entry changes shape, or a value
/// conflict in strict mode.
pub fn merge_shallow(
    existing: &mut Map<String, Value>,
    incoming: &Map<String, Value>,
    path: &ConfigPath,
    ctx: &mut MergeContext<'_>,
) -> Result<()> {
    for (key, value) in incoming {
        merge_entry(existing, key, value, &path.child(key.as_str()), ctx)?;
    }
    Ok(())
}

/// Replace-or-insert a single entry.
///
/// # Errors
///
/// As for [`merge_shallow`].
pub fn merge_entry(
    existing: &mut Map<String, Value>,
    key: &str,
    incoming: &Value,
    path: &ConfigPath,
    ctx: &mut MergeContext<'_>,
) -> Result<()> {
    match existing.get_mut(key) {
        Some(current) => {
            let (have, want) = (Shape::of(current), Shape::of(incoming));
            if have != want {
                return Err(ctx
                    .reporter
                    .shape_conflict(path, have, want, ctx.source_id));
            }
            replace_leaf(current, incoming, path, ctx)
        }
        None => {
            existing.insert(key.to_string(), incoming.clone());
            ctx.inserted(path);
            Ok(())
        }
    }
}

fn replace_leaf(
    slot: &mut Value,
    incoming: &Value,
    path: &ConfigPath,
    ctx: &mut MergeContext<'_>,
) -> Result<()> {
    ctx.replace(path, slot, incoming)?;
    if slot != incoming {
        *slot = incoming.clone();
    }
    Ok(())
}

/// Merge alias tables; the later target wins.
///
/// # Errors
///
/// Returns a value conflict in strict mode when an alias is retargeted.
pub fn merge_aliases(
    existing: &mut AliasTable,
    incoming: &AliasTable,
    path: &ConfigPath,
    ctx: &mut MergeContext<'_>,
) -> Result<()> {
    for (alias, target) in incoming {
        let child = path.child(alias.as_str());
        match existing.get_mut(alias) {
            Some(current) => {
                ctx.replace(
                    &child,
                    &Value::String(current.clone()),
                    &Value::String(target.clone()),
                )?;
                current.clone_from(target);
            }
            None => {
                existing.insert(alias.clone(), target.clone());
                ctx.inserted(&child);
            }
        }
    }
    Ok(())
}

/// Merge shim tables.
///
/// `deps` lists concatenate without duplicates; `exports` is replaced.
///
/// # Errors
///
/// Returns a value conflict in strict mode when `exports` changes.
pub fn merge_shim(
    existing: &mut ShimTable,
    incoming: &ShimTable,
    path: &ConfigPath,
    ctx: &mut MergeContext<'_>,
) -> Result<()> {
    for (module, entry) in incoming {
        let child = path.child(module.as_str());
        let current = match existing.get_mut(module) {
            Some(current) => current,
            None => {
                let mut fresh = entry.clone();
                if let Some(ref mut deps) = fresh.deps {
                    let mut unique = Vec::with_capacity(deps.len());
                    list::merge_deps(&mut unique, deps);
                    *deps = unique;
                }
                existing.insert(module.clone(), fresh);
                ctx.inserted(&child);
                continue;
            }
        };

        if let Some(ref deps) = entry.deps {
            list::merge_deps(current.deps.get_or_insert_with(Vec::new), deps);
        }

        if let Some(ref exports) = entry.exports {
            let exports_path = child.child("exports");
            match current.exports {
                Some(ref mut value) => {
                    ctx.replace(
                        &exports_path,
                        &Value::String(value.clone()),
                        &Value::String(exports.clone()),
                    )?;
                    value.clone_from(exports);
                }
                None => {
                    current.exports = Some(exports.clone());
                    ctx.inserted(&exports_path);
                }
            }
        }
    }
    Ok(())
}

/// Merge mixin tables; union at both levels, the later flag wins.
///
/// # Errors
///
/// Returns a value conflict in strict mode when a flag flips.
pub fn merge_mixins(
    existing: &mut MixinTable,
    incoming: &MixinTable,
    path: &ConfigPath,
    ctx: &mut MergeContext<'_>,
) -> Result<()> {
    for (target, mixins) in incoming {
        let target_path = path.child(target.as_str());
        if !existing.contains_key(target) {
            ctx.inserted(&target_path);
        }
        let bucket = existing.entry(target.clone()).or_default();

        for (mixin, enabled) in mixins {
            let mixin_path = target_path.child(mixin.as_str());
            match bucket.get_mut(mixin) {
                Some(current) => {
                    ctx.replace(&mixin_path, &Value::Bool(*current), &Value::Bool(*enabled))?;
                    *current = *enabled;
                }
                None => {
                    bucket.insert(mixin.clone(), *enabled);
                    ctx.inserted(&mixin_path);
                }
            }
        }
    }
    Ok(())
}

/// Merge module substitution tables context by context.
///
/// Contexts are independent namespaces: only the same context and source
/// module can collide.
///
/// # Errors
///
/// Returns a shape conflict when a substitution changes shape, or a value
/// conflict in strict mode.
pub fn merge_map_table(
    existing: &mut MapTable,
    incoming: &MapTable,
    path: &ConfigPath,
    ctx: &mut MergeContext<'_>,
) -> Result<()> {
    for (context, substitutions) in incoming {
        let context_path = path.child(context.as_str());
        match existing.get_mut(context) {
            Some(bucket) => merge_object(bucket, substitutions, &context_path, ctx)?,
            None => {
                existing.insert(context.clone(), substitutions.clone());
                ctx.inserted(&context_path);
            }
        }
    }
    Ok(())
}
