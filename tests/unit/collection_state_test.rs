//! Unit tests for the local collection: seeding, id-deduplicated prepend and
//! removal semantics.

use bookmark_sync::managers::collection_state::LocalCollection;
use bookmark_sync::types::bookmark::Bookmark;

fn bookmark(id: &str, created_at: i64) -> Bookmark {
    Bookmark {
        id: id.to_string(),
        title: format!("Bookmark {}", id),
        url: format!("https://example.com/{}", id),
        owner_id: "alice".to_string(),
        created_at,
    }
}

fn ids(collection: &LocalCollection) -> Vec<String> {
    collection.snapshot().into_iter().map(|b| b.id).collect()
}

#[test]
fn test_new_collection_is_empty() {
    let collection = LocalCollection::new();
    assert!(collection.is_empty());
    assert!(collection.snapshot().is_empty());
}

#[test]
fn test_seed_keeps_given_order() {
    let mut collection = LocalCollection::new();
    collection.seed(vec![bookmark("1", 10), bookmark("2", 5)]);
    assert_eq!(ids(&collection), vec!["1", "2"]);
}

#[test]
fn test_seed_replaces_previous_contents_and_dedupes() {
    let mut collection = LocalCollection::new();
    collection.seed(vec![bookmark("old", 1)]);
    collection.seed(vec![bookmark("a", 3), bookmark("a", 2), bookmark("b", 1)]);

    assert_eq!(ids(&collection), vec!["a", "b"]);
    assert_eq!(collection.snapshot()[0].created_at, 3, "first occurrence wins");
}

/// Insert after the snapshot is prepended, not sorted by timestamp.
#[test]
fn test_prepend_goes_to_head_regardless_of_timestamp() {
    let mut collection = LocalCollection::new();
    collection.seed(vec![bookmark("1", 10), bookmark("2", 5)]);

    assert!(collection.prepend(bookmark("3", 20)));
    assert_eq!(ids(&collection), vec!["3", "1", "2"]);

    assert!(collection.prepend(bookmark("4", 1)));
    assert_eq!(ids(&collection), vec!["4", "3", "1", "2"]);
}

#[test]
fn test_prepend_existing_id_is_noop_and_keeps_original() {
    let mut collection = LocalCollection::new();
    collection.seed(vec![bookmark("1", 10)]);

    let mut replay = bookmark("1", 99);
    replay.title = "replayed".to_string();
    assert!(!collection.prepend(replay));

    let items = collection.snapshot();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Bookmark 1");
    assert_eq!(items[0].created_at, 10);
}

#[test]
fn test_remove_by_id() {
    let mut collection = LocalCollection::new();
    collection.seed(vec![bookmark("1", 10), bookmark("2", 5)]);

    assert!(collection.remove_by_id("1"));
    assert_eq!(ids(&collection), vec!["2"]);
}

#[test]
fn test_remove_absent_id_is_noop() {
    let mut collection = LocalCollection::new();
    collection.seed(vec![bookmark("1", 10)]);
    let before = collection.clone();

    assert!(!collection.remove_by_id("missing"));
    assert_eq!(collection, before);

    assert!(collection.remove_by_id("1"));
    assert!(!collection.remove_by_id("1"), "second delete of same id is a no-op");
}

#[test]
fn test_clear_empties_collection() {
    let mut collection = LocalCollection::new();
    collection.seed(vec![bookmark("1", 10)]);
    collection.clear();
    assert!(collection.is_empty());
    assert!(!collection.contains("1"));
}
