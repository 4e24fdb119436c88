//! Unit tests for read and write planning.

use rstest::rstest;
use rusqlite::types::Value;

use marksync::services::query_planner::{plan, plan_write, WriteOp, WriteTarget};
use marksync::types::errors::PlanError;
use marksync::types::query::QueryRequest;
use marksync::types::resource::ResourceKind;

#[test]
fn collection_defaults_to_all_columns_newest_first() {
    let p = plan(&ResourceKind::Collection, &QueryRequest::new()).unwrap();
    assert_eq!(p.from, "bookmarks");
    assert_eq!(
        p.column_names(),
        vec!["id", "external_id", "title", "host", "url", "description", "created", "modified"]
    );
    assert!(p.predicates.is_empty());
    assert_eq!(p.order_by, "bookmarks.modified DESC, bookmarks.id DESC");
}

#[test]
fn item_appends_its_id_after_caller_params() {
    let request = QueryRequest::new().filter("host = ?", vec![Value::Text("a.example".into())]);
    let p = plan(&ResourceKind::Item(5), &request).unwrap();
    assert_eq!(p.predicates, vec!["(host = ?)", "bookmarks.id = ?"]);
    assert_eq!(
        p.params,
        vec![Value::Text("a.example".into()), Value::Integer(5)]
    );
}

#[test]
fn label_filter_forces_modified_desc() {
    let request = QueryRequest::new().sort("title ASC");
    let p = plan(&ResourceKind::FilteredCollection { label_id: 3 }, &request).unwrap();
    assert!(p.from.contains("JOIN bookmark_labels"));
    assert_eq!(p.order_by, "bookmarks.modified DESC, bookmarks.id DESC");
    assert_eq!(p.params, vec![Value::Integer(3)]);
}

#[test]
fn quick_folder_projects_id_and_name() {
    let p = plan(&ResourceKind::QuickFolder, &QueryRequest::new().sort("name")).unwrap();
    assert_eq!(p.column_names(), vec!["id", "name"]);
    assert_eq!(p.order_by, "bookmarks.modified DESC, bookmarks.id DESC");
    assert!(p.to_sql().contains("bookmarks.title AS \"name\""));
}

#[test]
fn labels_default_to_title_order() {
    let p = plan(&ResourceKind::LabelCollection, &QueryRequest::new()).unwrap();
    assert_eq!(p.column_names(), vec!["id", "title", "count"]);
    assert_eq!(p.order_by, "labels.title ASC");

    let p = plan(&ResourceKind::LabelCollection, &QueryRequest::new().sort("count DESC")).unwrap();
    assert_eq!(p.order_by, "labels.\"count\" DESC");
}

#[test]
fn search_with_text_joins_the_index() {
    let kind = ResourceKind::Search {
        query: Some("rust lang".to_string()),
    };
    let p = plan(&kind, &QueryRequest::new()).unwrap();
    assert!(p.from.contains("search_index"));
    assert_eq!(p.predicates, vec!["search_index MATCH ?"]);
    assert_eq!(p.params, vec![Value::Text("\"rust\" \"lang\"".into())]);
}

#[test]
fn search_without_text_needs_a_bound_filter() {
    let kind = ResourceKind::Search { query: None };
    assert_eq!(
        plan(&kind, &QueryRequest::new()),
        Err(PlanError::MissingSearchCriteria)
    );
    assert_eq!(
        plan(&kind, &QueryRequest::new().filter("title LIKE ?", vec![])),
        Err(PlanError::MissingSearchCriteria)
    );

    let blank = ResourceKind::Search {
        query: Some("   ".to_string()),
    };
    assert_eq!(
        plan(&blank, &QueryRequest::new()),
        Err(PlanError::MissingSearchCriteria)
    );

    let request = QueryRequest::new().filter("title LIKE ?", vec![Value::Text("%rust%".into())]);
    let p = plan(&kind, &request).unwrap();
    assert_eq!(p.from, "bookmarks");
    assert_eq!(p.predicates, vec!["(title LIKE ?)"]);
}

#[rstest]
#[case(QueryRequest::new().project(["id", "password"]), PlanError::InvalidColumn("password".into()))]
#[case(QueryRequest::new().sort("title; DROP TABLE bookmarks"), PlanError::InvalidSort("title; DROP TABLE bookmarks".into()))]
#[case(QueryRequest::new().sort("secret DESC"), PlanError::InvalidSort("secret DESC".into()))]
fn rejects_names_outside_the_allow_list(#[case] request: QueryRequest, #[case] expected: PlanError) {
    assert_eq!(plan(&ResourceKind::Collection, &request), Err(expected));
}

#[test]
fn projection_keeps_caller_order() {
    let p = plan(
        &ResourceKind::Collection,
        &QueryRequest::new().project(["title", "id"]),
    )
    .unwrap();
    assert_eq!(p.column_names(), vec!["title", "id"]);
    assert_eq!(
        p.to_sql(),
        "SELECT bookmarks.title AS \"title\", bookmarks.id AS \"id\" FROM bookmarks \
         ORDER BY bookmarks.modified DESC, bookmarks.id DESC"
    );
}

#[rstest]
#[case(ResourceKind::Collection, WriteOp::Insert, Some(WriteTarget::Bookmarks(None)))]
#[case(ResourceKind::Collection, WriteOp::Delete, Some(WriteTarget::Bookmarks(None)))]
#[case(ResourceKind::Item(4), WriteOp::Update, Some(WriteTarget::Bookmarks(Some(4))))]
#[case(ResourceKind::Item(4), WriteOp::Insert, None)]
#[case(ResourceKind::LabelCollection, WriteOp::Insert, Some(WriteTarget::Labels(None)))]
#[case(ResourceKind::LabelItem(2), WriteOp::Delete, Some(WriteTarget::Labels(Some(2))))]
#[case(ResourceKind::Search { query: None }, WriteOp::Delete, None)]
#[case(ResourceKind::FilteredCollection { label_id: 1 }, WriteOp::Update, None)]
#[case(ResourceKind::QuickFolder, WriteOp::Insert, None)]
fn write_support_by_kind(
    #[case] kind: ResourceKind,
    #[case] op: WriteOp,
    #[case] expected: Option<WriteTarget>,
) {
    match (plan_write(&kind, op), expected) {
        (Ok(target), Some(want)) => assert_eq!(target, want),
        (Err(PlanError::UnknownResource(_)), None) => {}
        (other, want) => panic!("{:?} {:?}: got {:?}, want {:?}", kind, op, other, want),
    }
}
