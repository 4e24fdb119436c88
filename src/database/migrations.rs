//! Schema migrations for the Marksync SQLite database.
//!
//! Uses a `schema_version` table to track which migrations have been applied.
//! Each migration runs exactly once and is recorded with a timestamp.

use rusqlite::Connection;
use tracing::info;

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Returns the highest applied schema version, 0 for a fresh database.
///
/// # Errors
/// Fails if `schema_version` cannot be read; `run_all` creates it first.
pub fn get_schema_version(conn: &Connection) -> Result<i32, rusqlite::Error> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
}

/// Runs all pending schema migrations against the provided connection.
///
/// Foreign-key enforcement is per connection in SQLite and is switched on
/// here on every open; cascading deletes of label associations depend on it.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn)?;

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Initial schema: bookmarks, labels, cookies, search index")?;
    }

    if current < 2 {
        migration_v2(conn)?;
        record_version(conn, 2, "Maintain search index with triggers")?;
    }

    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![version, now, description],
    )?;
    info!("Applied schema version {}: {}", version, description);
    Ok(())
}

/// V1: Create all core tables.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS session_cookies (
            name TEXT NOT NULL PRIMARY KEY,
            value TEXT NOT NULL,
            domain TEXT,
            path TEXT,
            expires INTEGER,
            secure INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS bookmarks (
            id INTEGER PRIMARY KEY,
            external_id TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            url TEXT NOT NULL,
            host TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created INTEGER NOT NULL,
            modified INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_bookmarks_url ON bookmarks(url ASC);

        CREATE VIRTUAL TABLE IF NOT EXISTS search_index USING fts5(
            title_text,
            host_text,
            description_text,
            label_text
        );

        CREATE TABLE IF NOT EXISTS labels (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL UNIQUE,
            "count" INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS bookmark_labels (
            label_id INTEGER NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
            bookmark_id INTEGER NOT NULL REFERENCES bookmarks(id) ON DELETE CASCADE
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_bookmark_labels_ref
            ON bookmark_labels(label_id, bookmark_id);
        CREATE INDEX IF NOT EXISTS idx_bookmark_labels_bookmark
            ON bookmark_labels(bookmark_id);
        "#,
    )
}

/// Label text of one bookmark, as indexed in `search_index.label_text`.
const LABEL_TEXT_FOR: &str = "(SELECT COALESCE(group_concat(l.title, ' '), '') \
     FROM labels l JOIN bookmark_labels bl ON bl.label_id = l.id \
     WHERE bl.bookmark_id = {id})";

fn label_text_for(id_expr: &str) -> String {
    LABEL_TEXT_FOR.replace("{id}", id_expr)
}

/// V2: Keep `search_index` in step with bookmarks, associations and label
/// titles, and backfill rows written before the triggers existed.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    let sql = format!(
        r#"
        CREATE TRIGGER IF NOT EXISTS bookmarks_search_ai AFTER INSERT ON bookmarks BEGIN
            INSERT INTO search_index (rowid, title_text, host_text, description_text, label_text)
            VALUES (NEW.id, NEW.title, NEW.host, NEW.description, {new_labels});
        END;

        CREATE TRIGGER IF NOT EXISTS bookmarks_search_au AFTER UPDATE ON bookmarks BEGIN
            DELETE FROM search_index WHERE rowid = OLD.id;
            INSERT INTO search_index (rowid, title_text, host_text, description_text, label_text)
            VALUES (NEW.id, NEW.title, NEW.host, NEW.description, {new_labels});
        END;

        CREATE TRIGGER IF NOT EXISTS bookmarks_search_ad AFTER DELETE ON bookmarks BEGIN
            DELETE FROM search_index WHERE rowid = OLD.id;
        END;

        CREATE TRIGGER IF NOT EXISTS bookmark_labels_search_ai AFTER INSERT ON bookmark_labels BEGIN
            UPDATE search_index SET label_text = {new_assoc}
            WHERE rowid = NEW.bookmark_id;
        END;

        CREATE TRIGGER IF NOT EXISTS bookmark_labels_search_ad AFTER DELETE ON bookmark_labels BEGIN
            UPDATE search_index SET label_text = {old_assoc}
            WHERE rowid = OLD.bookmark_id;
        END;

        CREATE TRIGGER IF NOT EXISTS labels_search_au AFTER UPDATE OF title ON labels BEGIN
            UPDATE search_index SET label_text = {indexed}
            WHERE rowid IN (SELECT bookmark_id FROM bookmark_labels WHERE label_id = NEW.id);
        END;

        DELETE FROM search_index;
        INSERT INTO search_index (rowid, title_text, host_text, description_text, label_text)
        SELECT b.id, b.title, b.host, b.description, {backfill} FROM bookmarks b;
        "#,
        new_labels = label_text_for("NEW.id"),
        new_assoc = label_text_for("NEW.bookmark_id"),
        old_assoc = label_text_for("OLD.bookmark_id"),
        indexed = label_text_for("search_index.rowid"),
        backfill = label_text_for("b.id"),
    );
    conn.execute_batch(&sql)
}
