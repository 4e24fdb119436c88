//! Property-based tests for bookmark record operations.
//!
//! These tests verify identity-based conflict handling, timestamp defaults and
//! the search index for arbitrary valid URLs and titles.

use marksync::database::Database;
use marksync::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use marksync::services::resource_router::bookmarks_address;
use marksync::types::bookmark::NewBookmark;
use marksync::types::outcome::InsertOutcome;
use marksync::types::query::QueryRequest;
use marksync::Provider;
use proptest::prelude::*;

/// Strategy for generating valid URL strings.
fn arb_url() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("https"), Just("http")],
        "[a-z][a-z0-9]{2,15}",
        prop_oneof![Just(".com"), Just(".org"), Just(".net"), Just(".io")],
        proptest::option::of("/[a-z0-9]{1,10}"),
    )
        .prop_map(|(scheme, host, tld, path)| {
            format!("{}://{}{}{}", scheme, host, tld, path.unwrap_or_default())
        })
}

/// Strategy for generating non-empty bookmark titles.
fn arb_title() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9 ]{1,30}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Inserting the same identity twice keeps the first row exactly.
    #[test]
    fn duplicate_identity_never_changes_stored_row(
        url in arb_url(),
        other_url in arb_url(),
        title in arb_title(),
        other_title in arb_title(),
        created in 0i64..2_000_000_000_000,
    ) {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        let mut mgr = BookmarkManager::new(db.connection());

        let id = mgr
            .insert(NewBookmark::new("ext", url.clone()).with_title(title.clone()).with_timestamps(created, created))
            .unwrap()
            .id()
            .unwrap();
        let before = mgr.get(id).unwrap().unwrap();

        let second = mgr
            .insert(NewBookmark::new("ext", other_url).with_title(other_title))
            .unwrap();
        prop_assert_eq!(second, InsertOutcome::ConflictIgnored);
        prop_assert_eq!(mgr.count().unwrap(), 1);
        prop_assert_eq!(mgr.get(id).unwrap().unwrap(), before);
    }

    /// Absent timestamps fall inside the insert window; supplied ones are kept.
    #[test]
    fn timestamps_default_to_insert_time(
        url in arb_url(),
        supplied in proptest::option::of((0i64..1_000_000, 0i64..1_000_000)),
    ) {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        let mut mgr = BookmarkManager::new(db.connection());

        let mut payload = NewBookmark::new("ext", url);
        if let Some((c, m)) = supplied {
            payload = payload.with_timestamps(c, m);
        }
        let start = BookmarkManager::now();
        let id = mgr.insert(payload).unwrap().id().unwrap();
        let end = BookmarkManager::now();
        let b = mgr.get(id).unwrap().unwrap();

        match supplied {
            Some((c, m)) => prop_assert_eq!((b.created, b.modified), (c, m)),
            None => {
                prop_assert!(b.created >= start && b.created <= end);
                prop_assert!(b.modified >= start && b.modified <= end);
            }
        }
    }

    /// Every stored title word is findable through the search address.
    #[test]
    fn insert_then_search_by_title_word(
        url in arb_url(),
        word in "[a-z]{4,12}",
    ) {
        let provider = Provider::open_in_memory().expect("Failed to open store");
        let id = provider
            .bookmarks()
            .insert(NewBookmark::new("ext", url).with_title(format!("About {}", word)))
            .unwrap()
            .id()
            .unwrap();

        let hits = provider
            .query(
                &format!("{}/search?q={}", bookmarks_address(), word),
                &QueryRequest::new().project(["id"]),
            )
            .unwrap();
        prop_assert!(hits.iter().any(|r| r.integer("id") == Some(id)));
    }
}
