//! Query Planner for Marksync.
//!
//! Turns a resolved [`ResourceKind`] plus a caller [`QueryRequest`] into a
//! [`QueryPlan`]: table set, join, predicates, bind parameters and ordering.
//! Column names from the caller never reach SQL verbatim; they are looked up
//! in the immutable allow-lists below.

use rusqlite::types::Value;

use crate::types::errors::PlanError;
use crate::types::query::QueryRequest;
use crate::types::resource::ResourceKind;

/// Public column name → SQL expression.
pub type ColumnMap = &'static [(&'static str, &'static str)];

pub const BOOKMARK_COLUMNS: ColumnMap = &[
    ("id", "bookmarks.id"),
    ("external_id", "bookmarks.external_id"),
    ("title", "bookmarks.title"),
    ("host", "bookmarks.host"),
    ("url", "bookmarks.url"),
    ("description", "bookmarks.description"),
    ("created", "bookmarks.created"),
    ("modified", "bookmarks.modified"),
];

pub const LABEL_COLUMNS: ColumnMap = &[
    ("id", "labels.id"),
    ("title", "labels.title"),
    ("count", "labels.\"count\""),
];

pub const QUICK_FOLDER_COLUMNS: ColumnMap = &[("id", "bookmarks.id"), ("name", "bookmarks.title")];

/// Columns a caller may set on a bookmark row.
pub const BOOKMARK_WRITABLE: ColumnMap = &[
    ("external_id", "external_id"),
    ("title", "title"),
    ("url", "url"),
    ("host", "host"),
    ("description", "description"),
    ("created", "created"),
    ("modified", "modified"),
];

/// Columns a caller may set on a label row.
pub const LABEL_WRITABLE: ColumnMap = &[("title", "title"), ("count", "\"count\"")];

/// Columns a new label may carry; its count starts at zero.
pub const LABEL_INSERTABLE: ColumnMap = &[("title", "title")];

const BOOKMARKS: &str = "bookmarks";
const BOOKMARKS_BY_LABEL: &str =
    "bookmarks JOIN bookmark_labels ON bookmarks.id = bookmark_labels.bookmark_id";
const BOOKMARKS_BY_TEXT: &str = "bookmarks JOIN search_index ON search_index.rowid = bookmarks.id";
const LABELS: &str = "labels";

const BOOKMARK_DEFAULT_ORDER: &str = "bookmarks.modified DESC, bookmarks.id DESC";
const LABEL_DEFAULT_ORDER: &str = "labels.title ASC";

/// A safe, fully-assembled SELECT.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub from: &'static str,
    /// (public name, SQL expression), in projection order.
    pub columns: Vec<(&'static str, &'static str)>,
    /// ANDed together. A caller filter, when present, comes first so its
    /// positional parameters line up with the front of `params`.
    pub predicates: Vec<String>,
    pub params: Vec<Value>,
    pub order_by: String,
}

impl QueryPlan {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|(n, _)| n.to_string()).collect()
    }

    pub fn to_sql(&self) -> String {
        let select = self
            .columns
            .iter()
            .map(|(name, expr)| format!("{} AS \"{}\"", expr, name))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {} FROM {}", select, self.from);
        if !self.predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.predicates.join(" AND "));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(&self.order_by);
        sql
    }
}

/// Write operations an address may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Insert,
    Update,
    Delete,
}

/// Table and optional primary key a write is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteTarget {
    Bookmarks(Option<i64>),
    Labels(Option<i64>),
}

impl WriteTarget {
    pub fn writable_columns(&self) -> ColumnMap {
        match self {
            WriteTarget::Bookmarks(_) => BOOKMARK_WRITABLE,
            WriteTarget::Labels(_) => LABEL_WRITABLE,
        }
    }

    pub fn insertable_columns(&self) -> ColumnMap {
        match self {
            WriteTarget::Bookmarks(_) => BOOKMARK_WRITABLE,
            WriteTarget::Labels(_) => LABEL_INSERTABLE,
        }
    }
}

/// Looks up a caller-supplied name in an allow-list.
pub fn allowed(map: ColumnMap, name: &str) -> Result<(&'static str, &'static str), PlanError> {
    map.iter()
        .find(|(n, _)| *n == name)
        .copied()
        .ok_or_else(|| PlanError::InvalidColumn(name.to_string()))
}

fn project(map: ColumnMap, projection: Option<&[String]>) -> Result<Vec<(&'static str, &'static str)>, PlanError> {
    match projection {
        None => Ok(map.to_vec()),
        Some([]) => Ok(map.to_vec()),
        Some(names) => names.iter().map(|n| allowed(map, n.trim())).collect(),
    }
}

/// Parses `col [ASC|DESC], ...` against an allow-list.
fn parse_sort(map: ColumnMap, sort: &str) -> Result<String, PlanError> {
    let invalid = || PlanError::InvalidSort(sort.to_string());
    let mut terms = Vec::new();
    for term in sort.split(',') {
        let mut words = term.split_whitespace();
        let column = words.next().ok_or_else(invalid)?;
        let (_, expr) = allowed(map, column).map_err(|_| invalid())?;
        let direction = match words.next() {
            None => "ASC",
            Some(d) if d.eq_ignore_ascii_case("asc") => "ASC",
            Some(d) if d.eq_ignore_ascii_case("desc") => "DESC",
            Some(_) => return Err(invalid()),
        };
        if words.next().is_some() {
            return Err(invalid());
        }
        terms.push(format!("{} {}", expr, direction));
    }
    Ok(terms.join(", "))
}

/// Quotes every whitespace-separated term so arbitrary user text is a valid
/// FTS5 query (terms are implicitly ANDed).
pub fn match_expression(text: &str) -> Option<String> {
    let terms: Vec<String> = text
        .split_whitespace()
        .map(|t| format!("\"{}\"", t.replace('"', "\"\"")))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|f| !f.trim().is_empty())
}

/// Builds the read plan for `kind`.
///
/// # Errors
/// - `MissingSearchCriteria` for a search with neither query text nor a bound filter.
/// - `InvalidColumn` / `InvalidSort` for names outside the allow-list.
pub fn plan(kind: &ResourceKind, request: &QueryRequest) -> Result<QueryPlan, PlanError> {
    let filter = non_empty(request.filter.as_deref());
    let mut predicates: Vec<String> = filter.map(|f| format!("({})", f)).into_iter().collect();
    let mut params = request.params.clone();
    let projection = request.projection.as_deref();

    let (from, map, default_order, forced_order) = match kind {
        ResourceKind::Collection => (BOOKMARKS, BOOKMARK_COLUMNS, BOOKMARK_DEFAULT_ORDER, false),
        ResourceKind::Item(id) => {
            predicates.push("bookmarks.id = ?".to_string());
            params.push(Value::Integer(*id));
            (BOOKMARKS, BOOKMARK_COLUMNS, BOOKMARK_DEFAULT_ORDER, false)
        }
        ResourceKind::FilteredCollection { label_id } => {
            predicates.push("bookmark_labels.label_id = ?".to_string());
            params.push(Value::Integer(*label_id));
            (BOOKMARKS_BY_LABEL, BOOKMARK_COLUMNS, BOOKMARK_DEFAULT_ORDER, true)
        }
        ResourceKind::Search { query } => {
            match query.as_deref().and_then(match_expression) {
                Some(expr) => {
                    predicates.push("search_index MATCH ?".to_string());
                    params.push(Value::Text(expr));
                    (BOOKMARKS_BY_TEXT, BOOKMARK_COLUMNS, BOOKMARK_DEFAULT_ORDER, false)
                }
                None if filter.is_some() && !request.params.is_empty() => {
                    (BOOKMARKS, BOOKMARK_COLUMNS, BOOKMARK_DEFAULT_ORDER, false)
                }
                None => return Err(PlanError::MissingSearchCriteria),
            }
        }
        ResourceKind::LabelCollection => (LABELS, LABEL_COLUMNS, LABEL_DEFAULT_ORDER, false),
        ResourceKind::LabelItem(id) => {
            predicates.push("labels.id = ?".to_string());
            params.push(Value::Integer(*id));
            (LABELS, LABEL_COLUMNS, LABEL_DEFAULT_ORDER, false)
        }
        // Quick-folder views always list newest first, whatever the caller asked for.
        ResourceKind::QuickFolder => (BOOKMARKS, QUICK_FOLDER_COLUMNS, BOOKMARK_DEFAULT_ORDER, true),
    };

    let columns = project(map, projection)?;
    let order_by = match non_empty(request.sort.as_deref()) {
        Some(sort) if !forced_order => parse_sort(map, sort)?,
        _ => default_order.to_string(),
    };

    Ok(QueryPlan {
        from,
        columns,
        predicates,
        params,
        order_by,
    })
}

/// Checks that `kind` accepts `op` and returns the table it writes to.
///
/// # Errors
/// `UnknownResource` when the address family does not support the operation,
/// e.g. inserting into a search result.
pub fn plan_write(kind: &ResourceKind, op: WriteOp) -> Result<WriteTarget, PlanError> {
    use WriteOp::*;
    let target = match (kind, op) {
        (ResourceKind::Collection, _) => WriteTarget::Bookmarks(None),
        (ResourceKind::Item(id), Update | Delete) => WriteTarget::Bookmarks(Some(*id)),
        (ResourceKind::LabelCollection, _) => WriteTarget::Labels(None),
        (ResourceKind::LabelItem(id), Update | Delete) => WriteTarget::Labels(Some(*id)),
        _ => {
            return Err(PlanError::UnknownResource(format!(
                "{} does not support {:?}",
                kind.name(),
                op
            )))
        }
    };
    Ok(target)
}
