//! Property-based tests for the local collection under arbitrary event sequences.
//!
//! A small id alphabet makes duplicate inserts and deletes of absent ids
//! frequent, so every sequence exercises the replay paths.

use std::collections::HashSet;

use bookmark_sync::managers::collection_state::LocalCollection;
use bookmark_sync::types::bookmark::Bookmark;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(String),
    Delete(String),
}

fn arb_id() -> impl Strategy<Value = String> {
    "[a-f]"
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => arb_id().prop_map(Op::Insert),
        1 => arb_id().prop_map(Op::Delete),
    ]
}

fn bookmark(id: &str, step: usize) -> Bookmark {
    Bookmark {
        id: id.to_string(),
        title: format!("Bookmark {}", id),
        url: format!("https://example.com/{}", id),
        owner_id: "alice".to_string(),
        created_at: step as i64,
    }
}

// Ids stay unique and the collection matches a set-based model after any
// sequence of inserts and deletes.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn ids_stay_unique_under_any_event_sequence(
        ops in proptest::collection::vec(arb_op(), 0..60),
    ) {
        let mut collection = LocalCollection::new();
        let mut model: Vec<String> = Vec::new();

        for (step, op) in ops.iter().enumerate() {
            match op {
                Op::Insert(id) => {
                    let changed = collection.prepend(bookmark(id, step));
                    prop_assert_eq!(changed, !model.contains(id));
                    if changed {
                        model.insert(0, id.clone());
                    }
                }
                Op::Delete(id) => {
                    let changed = collection.remove_by_id(id);
                    prop_assert_eq!(changed, model.contains(id));
                    model.retain(|m| m != id);
                }
            }

            let ids: Vec<String> = collection.snapshot().into_iter().map(|b| b.id).collect();
            let unique: HashSet<&String> = ids.iter().collect();
            prop_assert_eq!(unique.len(), ids.len());
            prop_assert_eq!(&ids, &model);
        }
    }

    #[test]
    fn replaying_an_insert_is_a_noop(
        ops in proptest::collection::vec(arb_op(), 1..40),
        replay in arb_id(),
    ) {
        let mut collection = LocalCollection::new();
        for (step, op) in ops.iter().enumerate() {
            match op {
                Op::Insert(id) => { collection.prepend(bookmark(id, step)); }
                Op::Delete(id) => { collection.remove_by_id(id); }
            }
        }
        collection.prepend(bookmark(&replay, 0));

        let before = collection.clone();
        prop_assert!(!collection.prepend(bookmark(&replay, 999)));
        prop_assert_eq!(&collection, &before);
    }

    #[test]
    fn deleting_an_absent_id_is_a_noop(
        seed in proptest::collection::vec(arb_id(), 0..10),
    ) {
        let mut collection = LocalCollection::new();
        collection.seed(seed.iter().enumerate().map(|(i, id)| bookmark(id, i)).collect());

        let before = collection.clone();
        prop_assert!(!collection.remove_by_id("zz-not-present"));
        prop_assert_eq!(&collection, &before);
    }

    #[test]
    fn seed_keeps_first_occurrence_order(
        seed in proptest::collection::vec(arb_id(), 0..20),
    ) {
        let mut collection = LocalCollection::new();
        collection.seed(seed.iter().enumerate().map(|(i, id)| bookmark(id, i)).collect());

        let mut expected: Vec<String> = Vec::new();
        for id in &seed {
            if !expected.contains(id) {
                expected.push(id.clone());
            }
        }
        let ids: Vec<String> = collection.snapshot().into_iter().map(|b| b.id).collect();
        prop_assert_eq!(ids, expected);
    }
}
