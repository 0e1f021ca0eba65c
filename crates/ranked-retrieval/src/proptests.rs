use super::*;

use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};

fn sealed(key: &str) -> Payload {
    Payload::new(format!("sealed:{key}").into_bytes())
}

fn unseal(payload: &Payload) -> String {
    String::from_utf8(payload.as_bytes()["sealed:".len()..].to_vec()).unwrap()
}

/// Build an index plus a plain model of key → popularity.
fn build(keys: &[String], selections: &[usize]) -> (PrefixIndex, BTreeMap<String, u64>) {
    let mut index = PrefixIndex::new();
    let mut model = BTreeMap::new();
    for key in keys {
        index.insert(key, sealed(key));
        model.entry(key.clone()).or_insert(0u64);
    }
    if !keys.is_empty() {
        for &i in selections {
            let key = &keys[i % keys.len()];
            assert!(index.record_selection(key));
            *model.get_mut(key).unwrap() += 1;
        }
    }
    (index, model)
}

fn expected(model: &BTreeMap<String, u64>, prefix: &str) -> Vec<String> {
    let mut matching: Vec<(&String, u64)> = model
        .iter()
        .filter(|(k, _)| k.starts_with(prefix))
        .map(|(k, &p)| (k, p))
        .collect();
    matching.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    matching.into_iter().map(|(k, _)| k.clone()).collect()
}

proptest! {
    #[test]
    fn rank_matches_model(
        keys in prop::collection::vec("[a-c]{0,4}", 0..24),
        selections in prop::collection::vec(0usize..64, 0..40),
        prefix in "[a-c]{0,2}",
    ) {
        let (index, model) = build(&keys, &selections);
        let ranked: Vec<String> = rank(&index, &prefix).iter().map(unseal).collect();
        prop_assert_eq!(ranked, expected(&model, &prefix));
    }

    #[test]
    fn rank_has_no_duplicate_payloads(
        keys in prop::collection::vec("[a-b]{1,3}", 0..32),
        prefix in "[a-b]{0,1}",
    ) {
        let (index, model) = build(&keys, &[]);
        let ranked = rank(&index, &prefix);
        let distinct: HashSet<&Payload> = ranked.iter().collect();
        prop_assert_eq!(distinct.len(), ranked.len());
        prop_assert_eq!(
            ranked.len(),
            model.keys().filter(|k| k.starts_with(prefix.as_str())).count()
        );
    }

    #[test]
    fn selection_adds_exactly_one_point(
        keys in prop::collection::vec("[a-c]{1,4}", 1..16),
        pick in 0usize..16,
        rank_calls in 0usize..5,
    ) {
        let (mut index, _) = build(&keys, &[]);
        let key = keys[pick % keys.len()].clone();
        let before = index.popularity(&key).unwrap();

        index.record_selection(&key);
        for _ in 0..rank_calls {
            rank(&index, "");
        }

        prop_assert_eq!(index.popularity(&key), Some(before + 1));
    }

    #[test]
    fn unknown_selection_changes_nothing(
        keys in prop::collection::vec("[a-c]{1,4}", 0..16),
        selections in prop::collection::vec(0usize..16, 0..10),
        unknown in "[d-f]{1,4}",
        prefix in "[a-c]{0,1}",
    ) {
        let (mut index, _) = build(&keys, &selections);
        let before = rank(&index, &prefix);
        prop_assert!(!index.record_selection(&unknown));
        prop_assert_eq!(rank(&index, &prefix), before);
    }
}
