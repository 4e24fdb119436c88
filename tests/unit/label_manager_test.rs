//! Unit tests for the LabelManager public API.

use marksync::database::Database;
use marksync::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use marksync::managers::label_manager::{LabelManager, LabelManagerTrait};
use marksync::types::bookmark::NewBookmark;
use marksync::types::errors::StoreError;
use marksync::types::outcome::InsertOutcome;

fn setup() -> Database {
    Database::open_in_memory().expect("Failed to open in-memory database")
}

fn add_bookmark(db: &Database, ext: &str) -> i64 {
    BookmarkManager::new(db.connection())
        .insert(NewBookmark::new(ext, format!("https://{}.example", ext)))
        .unwrap()
        .id()
        .unwrap()
}

#[test]
fn test_create_is_idempotent_by_title() {
    let db = setup();
    let mut labels = LabelManager::new(db.connection());

    let first = labels.create("rust").unwrap();
    assert!(matches!(first, InsertOutcome::Inserted(_)));
    assert_eq!(labels.create("rust").unwrap(), InsertOutcome::ConflictIgnored);
    assert_eq!(labels.list().unwrap().len(), 1);

    let found = labels.find_by_title("rust").unwrap().unwrap();
    assert_eq!(Some(found.id), first.id());
    assert_eq!(found.count, 0);
}

#[test]
fn test_create_rejects_blank_title() {
    let db = setup();
    let mut labels = LabelManager::new(db.connection());
    assert!(matches!(labels.create("  "), Err(StoreError::MissingField("title"))));
}

#[test]
fn test_list_is_ordered_by_title() {
    let db = setup();
    let mut labels = LabelManager::new(db.connection());
    for t in ["work", "art", "music"] {
        labels.create(t).unwrap();
    }
    let titles: Vec<String> = labels.list().unwrap().into_iter().map(|l| l.title).collect();
    assert_eq!(titles, vec!["art", "music", "work"]);
}

#[test]
fn test_attach_and_detach() {
    let db = setup();
    let bookmark = add_bookmark(&db, "one");
    let mut labels = LabelManager::new(db.connection());
    let label = labels.create("reading").unwrap().id().unwrap();

    assert!(matches!(labels.attach(label, bookmark).unwrap(), InsertOutcome::Inserted(_)));
    assert_eq!(labels.attach(label, bookmark).unwrap(), InsertOutcome::ConflictIgnored);
    assert_eq!(labels.labels_for(bookmark).unwrap(), vec!["reading"]);

    assert!(labels.detach(label, bookmark).unwrap());
    assert!(!labels.detach(label, bookmark).unwrap());
    assert!(labels.labels_for(bookmark).unwrap().is_empty());
}

#[test]
fn test_attach_to_missing_bookmark_fails() {
    let db = setup();
    let mut labels = LabelManager::new(db.connection());
    let label = labels.create("orphan").unwrap().id().unwrap();
    assert!(matches!(
        labels.attach(label, 404),
        Err(StoreError::StorageFailure(_))
    ));
}

/// Deleting a label removes its associations and keeps the bookmarks.
#[test]
fn test_delete_cascades_to_associations_only() {
    let db = setup();
    let a = add_bookmark(&db, "a");
    let b = add_bookmark(&db, "b");
    let mut labels = LabelManager::new(db.connection());
    let label = labels.create("shared").unwrap().id().unwrap();
    labels.attach(label, a).unwrap();
    labels.attach(label, b).unwrap();

    assert!(labels.delete(label).unwrap());
    assert!(labels.get(label).unwrap().is_none());

    let links: i64 = db
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM bookmark_labels WHERE label_id = ?1",
            [label],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(links, 0);
    assert_eq!(BookmarkManager::new(db.connection()).count().unwrap(), 2);
}

#[test]
fn test_recount_refreshes_cached_counts() {
    let db = setup();
    let a = add_bookmark(&db, "a");
    let b = add_bookmark(&db, "b");
    let mut labels = LabelManager::new(db.connection());
    let busy = labels.create("busy").unwrap().id().unwrap();
    labels.create("idle").unwrap();
    labels.attach(busy, a).unwrap();
    labels.attach(busy, b).unwrap();

    assert_eq!(labels.recount().unwrap(), 1);
    assert_eq!(labels.get(busy).unwrap().unwrap().count, 2);
    assert_eq!(labels.find_by_title("idle").unwrap().unwrap().count, 0);
    assert_eq!(labels.recount().unwrap(), 0);
}
