//! Label Manager for Marksync.
//!
//! Implements `LabelManagerTrait`: label rows, their many-to-many association
//! with bookmarks, and the advisory `count` cache.

use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, instrument};

use super::mutation;
use crate::database::scope::WriteScope;
use crate::types::errors::StoreError;
use crate::types::label::Label;
use crate::types::outcome::InsertOutcome;

/// Trait defining label operations.
pub trait LabelManagerTrait {
    fn create(&mut self, title: &str) -> Result<InsertOutcome, StoreError>;
    fn get(&self, id: i64) -> Result<Option<Label>, StoreError>;
    fn find_by_title(&self, title: &str) -> Result<Option<Label>, StoreError>;
    fn list(&self) -> Result<Vec<Label>, StoreError>;
    fn delete(&mut self, id: i64) -> Result<bool, StoreError>;
    fn attach(&mut self, label_id: i64, bookmark_id: i64) -> Result<InsertOutcome, StoreError>;
    fn detach(&mut self, label_id: i64, bookmark_id: i64) -> Result<bool, StoreError>;
    fn labels_for(&self, bookmark_id: i64) -> Result<Vec<String>, StoreError>;
    fn recount(&mut self) -> Result<usize, StoreError>;
}

/// Label manager backed by a SQLite connection.
pub struct LabelManager<'a> {
    conn: &'a Connection,
}

impl<'a> LabelManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_label(row: &rusqlite::Row) -> rusqlite::Result<Label> {
        Ok(Label {
            id: row.get(0)?,
            title: row.get(1)?,
            count: row.get(2)?,
        })
    }

    /// Id of the label titled `title`, creating it if needed.
    fn ensure(&self, title: &str) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO labels (title) VALUES (?1)",
            params![title],
        )?;
        let id = self.conn.query_row(
            "SELECT id FROM labels WHERE title = ?1",
            params![title],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Makes `titles` the complete label set of `bookmark_id`, in that order.
    ///
    /// Missing labels are created. Blank titles and repeats are skipped.
    pub fn replace_labels(&mut self, bookmark_id: i64, titles: &[String]) -> Result<(), StoreError> {
        let scope = WriteScope::begin(self.conn)?;
        self.conn.execute(
            "DELETE FROM bookmark_labels WHERE bookmark_id = ?1",
            params![bookmark_id],
        )?;
        for title in titles.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            let label_id = self.ensure(title)?;
            self.conn.execute(
                "INSERT OR IGNORE INTO bookmark_labels (label_id, bookmark_id) VALUES (?1, ?2)",
                params![label_id, bookmark_id],
            )?;
        }
        scope.commit()?;
        Ok(())
    }

    /// Address-level update of label rows. `sets` carries allow-listed columns.
    pub fn update_where(
        &mut self,
        id: Option<i64>,
        sets: &[(&str, Value)],
        filter: Option<&str>,
        params: &[Value],
    ) -> Result<usize, StoreError> {
        let scope = WriteScope::begin(self.conn)?;
        let n = mutation::update_rows(self.conn, "labels", sets, id, filter, params)?;
        scope.commit()?;
        debug!("Updated {} label(s)", n);
        Ok(n)
    }

    /// Address-level delete of label rows; associations cascade.
    pub fn delete_where(
        &mut self,
        id: Option<i64>,
        filter: Option<&str>,
        params: &[Value],
    ) -> Result<usize, StoreError> {
        let scope = WriteScope::begin(self.conn)?;
        let n = mutation::delete_rows(self.conn, "labels", id, filter, params)?;
        scope.commit()?;
        debug!("Deleted {} label(s)", n);
        Ok(n)
    }
}

impl<'a> LabelManagerTrait for LabelManager<'a> {
    /// Creates a label. An existing label with the same title is left alone.
    #[instrument(skip(self), level = "debug")]
    fn create(&mut self, title: &str) -> Result<InsertOutcome, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::MissingField("title"));
        }
        let affected = self.conn.execute(
            "INSERT OR IGNORE INTO labels (title) VALUES (?1)",
            params![title],
        )?;
        if affected == 0 {
            debug!("Label '{}' already exists", title);
            return Ok(InsertOutcome::ConflictIgnored);
        }
        Ok(InsertOutcome::Inserted(self.conn.last_insert_rowid()))
    }

    fn get(&self, id: i64) -> Result<Option<Label>, StoreError> {
        let label = self
            .conn
            .query_row(
                "SELECT id, title, \"count\" FROM labels WHERE id = ?1",
                params![id],
                Self::row_to_label,
            )
            .optional()?;
        Ok(label)
    }

    fn find_by_title(&self, title: &str) -> Result<Option<Label>, StoreError> {
        let label = self
            .conn
            .query_row(
                "SELECT id, title, \"count\" FROM labels WHERE title = ?1",
                params![title],
                Self::row_to_label,
            )
            .optional()?;
        Ok(label)
    }

    /// All labels ordered by title.
    fn list(&self) -> Result<Vec<Label>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, \"count\" FROM labels ORDER BY title ASC")?;
        let labels = stmt
            .query_map([], Self::row_to_label)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(labels)
    }

    /// Deletes a label. Its bookmark associations go with it; the bookmarks stay.
    #[instrument(skip(self), level = "debug")]
    fn delete(&mut self, id: i64) -> Result<bool, StoreError> {
        let affected = self
            .conn
            .execute("DELETE FROM labels WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// Associates a label with a bookmark. Repeating an association is a no-op.
    ///
    /// # Errors
    /// `StorageFailure` if either side does not exist.
    fn attach(&mut self, label_id: i64, bookmark_id: i64) -> Result<InsertOutcome, StoreError> {
        let affected = self.conn.execute(
            "INSERT OR IGNORE INTO bookmark_labels (label_id, bookmark_id) VALUES (?1, ?2)",
            params![label_id, bookmark_id],
        )?;
        if affected == 0 {
            return Ok(InsertOutcome::ConflictIgnored);
        }
        Ok(InsertOutcome::Inserted(self.conn.last_insert_rowid()))
    }

    fn detach(&mut self, label_id: i64, bookmark_id: i64) -> Result<bool, StoreError> {
        let affected = self.conn.execute(
            "DELETE FROM bookmark_labels WHERE label_id = ?1 AND bookmark_id = ?2",
            params![label_id, bookmark_id],
        )?;
        Ok(affected > 0)
    }

    /// Label titles of one bookmark, in the order they were attached.
    fn labels_for(&self, bookmark_id: i64) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT l.title FROM bookmark_labels bl
             JOIN labels l ON l.id = bl.label_id
             WHERE bl.bookmark_id = ?1
             ORDER BY bl.rowid ASC",
        )?;
        let titles = stmt
            .query_map(params![bookmark_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(titles)
    }

    /// Refreshes every label's cached `count` from the association table.
    ///
    /// Returns the number of labels whose count changed.
    #[instrument(skip(self), level = "debug")]
    fn recount(&mut self) -> Result<usize, StoreError> {
        let changed = self.conn.execute(
            "UPDATE labels SET \"count\" = (
                 SELECT COUNT(*) FROM bookmark_labels WHERE bookmark_labels.label_id = labels.id
             )
             WHERE \"count\" <> (
                 SELECT COUNT(*) FROM bookmark_labels WHERE bookmark_labels.label_id = labels.id
             )",
            [],
        )?;
        debug!("Recounted labels, {} changed", changed);
        Ok(changed)
    }
}
