//! Bookmark Manager for Marksync.
//!
//! Implements `BookmarkManagerTrait`: the record store for bookmarks, backed
//! by SQLite via `rusqlite`. Identity is the remote `external_id`; inserting a
//! second record with the same identity is silently ignored rather than
//! raised, so a sync pass can replay remote data safely.

use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, instrument};

use super::label_manager::{LabelManager, LabelManagerTrait};
use super::mutation;
use crate::database::scope::WriteScope;
use crate::types::bookmark::{host_of, Bookmark, BookmarkRef, Lookup, NewBookmark};
use crate::types::errors::StoreError;
use crate::types::outcome::{InsertOutcome, ReconcileOutcome, UpdateOutcome};

/// Title used when neither the caller nor the localizer supplies one.
pub const FALLBACK_UNTITLED: &str = "Untitled";

/// Trait defining bookmark record operations.
pub trait BookmarkManagerTrait {
    fn insert(&mut self, bookmark: NewBookmark) -> Result<InsertOutcome, StoreError>;
    fn update(&mut self, bookmark: &Bookmark) -> Result<UpdateOutcome, StoreError>;
    fn delete(&mut self, id: i64) -> Result<bool, StoreError>;
    fn get(&self, id: i64) -> Result<Option<Bookmark>, StoreError>;
    fn find(&self, lookup: Lookup<'_>) -> Result<Option<BookmarkRef>, StoreError>;
    fn reconcile(&mut self, bookmark: NewBookmark) -> Result<ReconcileOutcome, StoreError>;
    fn count(&self) -> Result<i64, StoreError>;
}

/// Bookmark manager backed by a SQLite connection.
pub struct BookmarkManager<'a> {
    conn: &'a Connection,
    untitled: String,
}

impl<'a> BookmarkManager<'a> {
    /// Creates a manager that titles untitled bookmarks with [`FALLBACK_UNTITLED`].
    pub fn new(conn: &'a Connection) -> Self {
        Self::with_untitled(conn, FALLBACK_UNTITLED)
    }

    /// Creates a manager with a localized default title.
    pub fn with_untitled(conn: &'a Connection, untitled: impl Into<String>) -> Self {
        Self {
            conn,
            untitled: untitled.into(),
        }
    }

    /// Current time in epoch milliseconds.
    pub fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    fn exists(&self, id: i64) -> Result<bool, StoreError> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT id FROM bookmarks WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    /// Reads a single bookmark row, without labels.
    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        Ok(Bookmark {
            id: Some(row.get(0)?),
            external_id: row.get(1)?,
            title: row.get(2)?,
            url: row.get(3)?,
            host: row.get(4)?,
            description: row.get(5)?,
            created: row.get(6)?,
            modified: row.get(7)?,
            labels: Vec::new(),
        })
    }

    /// Address-level update of bookmark rows. `sets` carries allow-listed columns.
    ///
    /// Rows whose new values would collide with another row's `external_id`
    /// are skipped.
    pub fn update_where(
        &mut self,
        id: Option<i64>,
        sets: &[(&str, Value)],
        filter: Option<&str>,
        params: &[Value],
    ) -> Result<usize, StoreError> {
        let scope = WriteScope::begin(self.conn)?;
        let n = mutation::update_rows(self.conn, "bookmarks", sets, id, filter, params)?;
        scope.commit()?;
        debug!("Updated {} bookmark(s)", n);
        Ok(n)
    }

    /// Address-level delete of bookmark rows. Label associations cascade.
    pub fn delete_where(
        &mut self,
        id: Option<i64>,
        filter: Option<&str>,
        params: &[Value],
    ) -> Result<usize, StoreError> {
        let scope = WriteScope::begin(self.conn)?;
        let n = mutation::delete_rows(self.conn, "bookmarks", id, filter, params)?;
        scope.commit()?;
        debug!("Deleted {} bookmark(s)", n);
        Ok(n)
    }

    /// Merges a remote payload over the stored row: fields the payload leaves
    /// out keep their local value, except `modified`, which moves to now.
    fn merge(&self, current: Bookmark, incoming: NewBookmark) -> Result<Bookmark, StoreError> {
        if incoming.url.trim().is_empty() {
            return Err(StoreError::MissingField("url"));
        }
        let host = match incoming.host.filter(|h| !h.is_empty()) {
            Some(h) => h,
            None if incoming.url == current.url => current.host,
            None => host_of(&incoming.url)?,
        };
        Ok(Bookmark {
            id: current.id,
            external_id: incoming.external_id,
            title: incoming
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(current.title),
            url: incoming.url,
            host,
            description: incoming.description.unwrap_or(current.description),
            created: incoming.created.unwrap_or(current.created),
            modified: incoming.modified.unwrap_or_else(Self::now),
            labels: incoming.labels,
        })
    }
}

impl<'a> BookmarkManagerTrait for BookmarkManager<'a> {
    /// Stores a new bookmark, filling in defaults for absent optional fields.
    ///
    /// Returns `ConflictIgnored` when a bookmark with the same `external_id`
    /// exists; the stored row is not touched.
    #[instrument(skip_all, fields(external_id = %bookmark.external_id), level = "debug")]
    fn insert(&mut self, bookmark: NewBookmark) -> Result<InsertOutcome, StoreError> {
        let b = bookmark.into_bookmark(Self::now, &self.untitled)?;

        let scope = WriteScope::begin(self.conn)?;
        let affected = self.conn.execute(
            "INSERT OR IGNORE INTO bookmarks (external_id, title, url, host, description, created, modified)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![b.external_id, b.title, b.url, b.host, b.description, b.created, b.modified],
        )?;
        if affected == 0 {
            scope.commit()?;
            debug!("Bookmark already stored, insert ignored");
            return Ok(InsertOutcome::ConflictIgnored);
        }

        let id = self.conn.last_insert_rowid();
        LabelManager::new(self.conn).replace_labels(id, &b.labels)?;
        scope.commit()?;
        debug!("Inserted bookmark {}", id);
        Ok(InsertOutcome::Inserted(id))
    }

    /// Rewrites every column of an existing bookmark and replaces its labels.
    ///
    /// A blank host is derived from the url.
    ///
    /// # Errors
    /// `MissingField("id")` for a bookmark that was never stored,
    /// `MissingField("url")` for a blank url, `NotFound` when the id no
    /// longer exists.
    #[instrument(skip_all, fields(id = ?bookmark.id), level = "debug")]
    fn update(&mut self, bookmark: &Bookmark) -> Result<UpdateOutcome, StoreError> {
        let id = bookmark.id.ok_or(StoreError::MissingField("id"))?;
        if bookmark.external_id.trim().is_empty() {
            return Err(StoreError::MissingField("external_id"));
        }
        if bookmark.url.trim().is_empty() {
            return Err(StoreError::MissingField("url"));
        }
        let title = if bookmark.title.trim().is_empty() {
            self.untitled.as_str()
        } else {
            bookmark.title.as_str()
        };
        let host = if bookmark.host.trim().is_empty() {
            host_of(&bookmark.url)?
        } else {
            bookmark.host.clone()
        };

        let scope = WriteScope::begin(self.conn)?;
        let affected = self.conn.execute(
            "UPDATE OR IGNORE bookmarks
             SET external_id = ?1, title = ?2, url = ?3, host = ?4, description = ?5,
                 created = ?6, modified = ?7
             WHERE id = ?8",
            params![
                bookmark.external_id,
                title,
                bookmark.url,
                host,
                bookmark.description,
                bookmark.created,
                bookmark.modified,
                id
            ],
        )?;
        if affected == 0 {
            if !self.exists(id)? {
                return Err(StoreError::NotFound(id));
            }
            scope.commit()?;
            debug!("Update of bookmark {} ignored on conflict", id);
            return Ok(UpdateOutcome::ConflictIgnored);
        }

        LabelManager::new(self.conn).replace_labels(id, &bookmark.labels)?;
        scope.commit()?;
        Ok(UpdateOutcome::Updated)
    }

    /// Removes a bookmark. Returns `false` if there was nothing to remove.
    fn delete(&mut self, id: i64) -> Result<bool, StoreError> {
        let affected = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// Full bookmark including its label titles.
    fn get(&self, id: i64) -> Result<Option<Bookmark>, StoreError> {
        let bookmark = self
            .conn
            .query_row(
                "SELECT id, external_id, title, url, host, description, created, modified
                 FROM bookmarks WHERE id = ?1",
                params![id],
                Self::row_to_bookmark,
            )
            .optional()?;
        match bookmark {
            Some(mut b) => {
                b.labels = LabelManager::new(self.conn).labels_for(id)?;
                Ok(Some(b))
            }
            None => Ok(None),
        }
    }

    /// Point lookup by URL or external id. Several bookmarks may share a URL;
    /// the oldest row wins.
    fn find(&self, lookup: Lookup<'_>) -> Result<Option<BookmarkRef>, StoreError> {
        let (sql, key) = match lookup {
            Lookup::Url(url) => (
                "SELECT id, external_id, title FROM bookmarks WHERE url = ?1 ORDER BY id ASC LIMIT 1",
                url,
            ),
            Lookup::ExternalId(ext) => (
                "SELECT id, external_id, title FROM bookmarks WHERE external_id = ?1",
                ext,
            ),
        };
        let found = self
            .conn
            .query_row(sql, params![key], |row| {
                Ok(BookmarkRef {
                    id: row.get(0)?,
                    external_id: row.get(1)?,
                    title: row.get(2)?,
                })
            })
            .optional()?;
        Ok(found)
    }

    /// Inserts the payload, or merges it into the bookmark with the same
    /// `external_id`. The lookup and the write happen in one write scope.
    #[instrument(skip_all, fields(external_id = %bookmark.external_id), level = "debug")]
    fn reconcile(&mut self, bookmark: NewBookmark) -> Result<ReconcileOutcome, StoreError> {
        if bookmark.external_id.trim().is_empty() {
            return Err(StoreError::MissingField("external_id"));
        }

        let scope = WriteScope::begin(self.conn)?;
        let existing = self.find(Lookup::ExternalId(&bookmark.external_id))?;
        let outcome = match existing {
            None => match self.insert(bookmark)? {
                InsertOutcome::Inserted(id) => ReconcileOutcome::Inserted(id),
                InsertOutcome::ConflictIgnored => ReconcileOutcome::ConflictIgnored,
            },
            Some(found) => {
                let current = self.get(found.id)?.ok_or(StoreError::NotFound(found.id))?;
                let merged = self.merge(current, bookmark)?;
                match self.update(&merged)? {
                    UpdateOutcome::Updated => ReconcileOutcome::Updated(found.id),
                    UpdateOutcome::ConflictIgnored => ReconcileOutcome::ConflictIgnored,
                }
            }
        };
        scope.commit()?;
        Ok(outcome)
    }

    fn count(&self) -> Result<i64, StoreError> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM bookmarks", [], |row| row.get(0))?;
        Ok(n)
    }
}
