//! Property-based tests for fragment aggregation.

use super::{Aggregator, MergeOptions};
use crate::fragment::ConfigFragment;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

// Module ids in the shape the loader uses.
fn module_id() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,5}_[A-Z][a-z]{2,5}/js/[a-z]{1,6}"
}

// A payload touching every mergeable key.
fn payload_strategy() -> impl Strategy<Value = Value> {
    (
        prop::collection::btree_map(module_id(), module_id(), 0..4),
        prop::collection::btree_map(module_id(), prop::collection::vec(module_id(), 0..3), 0..3),
        prop::collection::btree_map(module_id(), any::<bool>(), 0..3),
        prop::collection::btree_map(module_id(), module_id(), 0..3),
        prop::collection::vec(module_id(), 0..5),
    )
        .prop_map(|(paths, shim, mixins, map, deps)| {
            let shim: Map<String, Value> = shim
                .into_iter()
                .map(|(module, deps)| (module, json!({ "deps": deps })))
                .collect();
            json!({
                "paths": paths,
                "shim": shim,
                "config": {"mixins": {"mage/common": mixins}},
                "map": {"*": map},
                "deps": deps,
            })
        })
}

fn fragments_strategy() -> impl Strategy<Value = Vec<ConfigFragment>> {
    prop::collection::vec(payload_strategy(), 1..5).prop_map(|payloads| {
        payloads
            .iter()
            .enumerate()
            .map(|(index, payload)| {
                ConfigFragment::from_value(format!("fragment-{index}"), index as i64, payload)
                    .expect("generated payloads are well formed")
            })
            .collect()
    })
}

proptest! {
    /// Property: feeding the merged document back as a final fragment
    /// changes nothing.
    #[test]
    fn prop_aggregation_is_idempotent(fragments in fragments_strategy()) {
        let aggregator = Aggregator::new(MergeOptions::default());
        let first = aggregator.aggregate(&fragments).unwrap();

        let mut again = fragments.clone();
        again.push(ConfigFragment::from_merged("merged", i64::MAX, &first.config));
        let second = aggregator.aggregate(&again).unwrap();

        prop_assert_eq!(first.config, second.config);
    }

    /// Property: deps never contain duplicates.
    #[test]
    fn prop_deps_are_unique(fragments in fragments_strategy()) {
        let result = Aggregator::default().aggregate(&fragments).unwrap();
        let mut seen = std::collections::HashSet::new();
        for id in &result.config.deps {
            prop_assert!(seen.insert(id.clone()), "duplicate dep {}", id);
        }
    }

    /// Property: reordering fragments never changes which keys exist.
    #[test]
    fn prop_reordering_preserves_shape(fragments in fragments_strategy()) {
        let forward = Aggregator::default().aggregate(&fragments).unwrap().config;

        let reversed: Vec<ConfigFragment> = fragments
            .iter()
            .rev()
            .enumerate()
            .map(|(index, fragment)| {
                ConfigFragment::new(fragment.source_id.clone(), index as i64, fragment.payload.clone())
            })
            .collect();
        let backward = Aggregator::default().aggregate(&reversed).unwrap().config;

        let keys = |config: &crate::MergedConfig| {
            let mut paths: Vec<String> = config.paths.keys().cloned().collect();
            paths.sort();
            let mut shim: Vec<String> = config.shim.keys().cloned().collect();
            shim.sort();
            let mut deps = config.deps.clone();
            deps.sort();
            (paths, shim, deps)
        };
        prop_assert_eq!(keys(&forward), keys(&backward));
    }
}
