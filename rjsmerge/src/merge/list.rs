//! List merge engine for `deps` and `modules`.
//!
//! Lists concatenate without duplicates. An element keeps the position at
//! which it was first introduced; existing elements are never reordered.

use std::collections::HashSet;

use crate::model::{BuildModule, ModuleId};

/// Append the elements of `incoming` whose key is not yet present.
///
/// Returns how many elements were appended.
///
/// # Examples
///
/// ```
/// use rjsmerge::merge::list::merge_list_by;
///
/// let mut existing = vec!["jquery".to_string(), "mage/common".to_string()];
/// let incoming = vec!["mage/common".to_string(), "underscore".to_string()];
/// let added = merge_list_by(&mut existing, &incoming, String::as_str);
///
/// assert_eq!(added, 1);
/// assert_eq!(existing, vec!["jquery", "mage/common", "underscore"]);
/// ```
pub fn merge_list_by<T, F>(existing: &mut Vec<T>, incoming: &[T], key: F) -> usize
where
    T: Clone,
    F: Fn(&T) -> &str,
{
    let mut seen: HashSet<String> = existing.iter().map(|item| key(item).to_owned()).collect();
    let before = existing.len();

    for item in incoming {
        if seen.insert(key(item).to_owned()) {
            existing.push(item.clone());
        }
    }

    existing.len() - before
}

/// Merge eagerly loaded module ids, deduplicating by value.
pub fn merge_deps(existing: &mut Vec<ModuleId>, incoming: &[ModuleId]) -> usize {
    merge_list_by(existing, incoming, String::as_str)
}

/// Merge bootstrap descriptors, deduplicating by `name`.
///
/// The first descriptor seen for a name is kept as is; later descriptors
/// with the same name are dropped.
pub fn merge_modules(existing: &mut Vec<BuildModule>, incoming: &[BuildModule]) -> usize {
    merge_list_by(existing, incoming, |module| module.name.as_str())
}
