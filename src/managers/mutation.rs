//! Address-level UPDATE/DELETE shared by the record managers.
//!
//! Table and column names come from the crate's own allow-lists; only values
//! and the caller's raw filter come from outside, and values are always bound.

use rusqlite::types::Value;
use rusqlite::{ffi, params_from_iter, Connection};
use tracing::debug;

/// Builds `WHERE (filter) AND id = ?`, or whichever half is present.
fn where_clause(id: Option<i64>, filter: Option<&str>) -> String {
    let mut parts = Vec::new();
    if let Some(f) = filter.filter(|f| !f.trim().is_empty()) {
        parts.push(format!("({})", f));
    }
    if id.is_some() {
        parts.push("id = ?".to_string());
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// True for a UNIQUE constraint failure, the one conflict an update skips.
fn is_unique_conflict(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// `UPDATE <table> SET ...` over the matching rows, one row at a time.
///
/// A row whose new values would collide with another row's unique key is
/// skipped and not counted. Any other constraint failure, NOT NULL included,
/// is returned and the caller's write scope rolls back.
pub(crate) fn update_rows(
    conn: &Connection,
    table: &str,
    sets: &[(&str, Value)],
    id: Option<i64>,
    filter: Option<&str>,
    params: &[Value],
) -> rusqlite::Result<usize> {
    if sets.is_empty() {
        return Ok(0);
    }

    let filter_params: &[Value] = if filter.is_some_and(|f| !f.trim().is_empty()) {
        params
    } else {
        &[]
    };
    let select = format!("SELECT id FROM {}{}", table, where_clause(id, filter));
    let targets = conn
        .prepare(&select)?
        .query_map(
            params_from_iter(filter_params.iter().cloned().chain(id.map(Value::Integer))),
            |row| row.get::<_, i64>(0),
        )?
        .collect::<rusqlite::Result<Vec<i64>>>()?;

    let assignments = sets
        .iter()
        .map(|(col, _)| format!("{} = ?", col))
        .collect::<Vec<_>>()
        .join(", ");
    let mut stmt = conn.prepare(&format!("UPDATE {} SET {} WHERE id = ?", table, assignments))?;

    let mut changed = 0;
    for row_id in targets {
        let binds = sets
            .iter()
            .map(|(_, v)| v.clone())
            .chain(std::iter::once(Value::Integer(row_id)));
        match stmt.execute(params_from_iter(binds)) {
            Ok(n) => changed += n,
            Err(e) if is_unique_conflict(&e) => {
                debug!("Skipped {} row {} on unique conflict", table, row_id)
            }
            Err(e) => return Err(e),
        }
    }
    Ok(changed)
}

/// `DELETE FROM <table>` over the matching rows.
pub(crate) fn delete_rows(
    conn: &Connection,
    table: &str,
    id: Option<i64>,
    filter: Option<&str>,
    params: &[Value],
) -> rusqlite::Result<usize> {
    let sql = format!("DELETE FROM {}{}", table, where_clause(id, filter));
    let filter_params: &[Value] = if filter.is_some_and(|f| !f.trim().is_empty()) {
        params
    } else {
        &[]
    };
    let binds = filter_params
        .iter()
        .cloned()
        .chain(id.map(Value::Integer));
    conn.execute(&sql, params_from_iter(binds))
}
