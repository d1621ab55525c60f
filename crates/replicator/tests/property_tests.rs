use proptest::prelude::*;
use replicator::{
    deep_freeze, is_deep_frozen, FreezeStrategy, Key, NodeRef, Replicator, ReplicatorConfig,
    Value,
};
use serde_json::json;
use std::sync::Arc;

fn arb_json() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        any::<i64>().prop_map(serde_json::Value::from),
        "[a-z]{0,8}".prop_map(serde_json::Value::from),
    ];
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
        ]
    })
}

fn as_root(json: serde_json::Value) -> NodeRef {
    Value::from(json!({ "root": json, "sibling": {"kept": true} }))
        .as_node()
        .cloned()
        .unwrap()
}

/// Path of keys leading to some container in `root`, chosen by `choices`
fn pick_path(root: &NodeRef, choices: &[usize]) -> Vec<Key> {
    let mut path = Vec::new();
    let mut current = Arc::clone(root);
    for choice in choices {
        let containers: Vec<(Key, NodeRef)> = current
            .keys()
            .into_iter()
            .filter_map(|k| current.get(&k)?.as_node().cloned().map(|n| (k, n)))
            .collect();
        if containers.is_empty() {
            break;
        }
        let (key, next) = containers[choice % containers.len()].clone();
        path.push(key);
        current = next;
    }
    path
}

fn build(root: &NodeRef, path: &[Key]) -> Replicator {
    path.iter()
        .cloned()
        .fold(Replicator::for_node(root), |builder, key| builder.child(key))
}

fn resolve(root: &NodeRef, path: &[Key]) -> NodeRef {
    path.iter().fold(Arc::clone(root), |node, key| {
        node.get(key).unwrap().as_node().cloned().unwrap()
    })
}

proptest! {
    #[test]
    fn prop_original_is_never_modified(
        json in arb_json(),
        choices in prop::collection::vec(any::<usize>(), 0..5),
    ) {
        let root = as_root(json);
        let before = Value::from(&root).to_json().unwrap();
        let path = pick_path(&root, &choices);

        let leaf = resolve(&root, &path);
        let target = leaf.keys().into_iter().next().unwrap_or(Key::Index(0));
        let result = build(&root, &path).modify(target).to("replaced").replicate();

        prop_assert!(result.is_ok());
        prop_assert_eq!(Value::from(&root).to_json().unwrap(), before);
    }

    #[test]
    fn prop_target_changes_and_siblings_are_shared(
        json in arb_json(),
        choices in prop::collection::vec(any::<usize>(), 0..5),
    ) {
        let root = as_root(json);
        let path = pick_path(&root, &choices);
        let leaf = resolve(&root, &path);
        let target = leaf.keys().into_iter().next().unwrap_or(Key::Index(0));

        let result = build(&root, &path)
            .modify(target.clone())
            .to(Value::from("replaced"))
            .replicate()
            .unwrap();

        let new_leaf = resolve(&result, &path);
        prop_assert_eq!(new_leaf.get(&target), Some(Value::from("replaced")));
        prop_assert_eq!(new_leaf.kind(), leaf.kind());
        for key in leaf.keys() {
            if key != target {
                prop_assert_eq!(new_leaf.get(&key), leaf.get(&key));
            }
        }
        if path.first() != Some(&Key::from("sibling")) {
            prop_assert_eq!(
                result.get(&Key::from("sibling")),
                root.get(&Key::from("sibling"))
            );
        }
    }

    #[test]
    fn prop_frozen_state_is_propagated(
        json in arb_json(),
        choices in prop::collection::vec(any::<usize>(), 0..5),
        frozen in any::<bool>(),
        full in any::<bool>(),
    ) {
        let root = as_root(json);
        if frozen {
            deep_freeze(&root);
        }
        let strategy = if full { FreezeStrategy::FullTraversal } else { FreezeStrategy::PathOnly };
        let path = pick_path(&root, &choices);
        let leaf = resolve(&root, &path);
        let target = leaf.keys().into_iter().next().unwrap_or(Key::Index(0));

        let result = build(&root, &path)
            .with_config(ReplicatorConfig::new().with_freeze_strategy(strategy))
            .modify(target)
            .to(Value::from(json!({"fresh": [1, 2]})))
            .replicate()
            .unwrap();

        prop_assert_eq!(is_deep_frozen(&result), frozen);
        prop_assert_eq!(result.is_frozen(), frozen);
    }
}
