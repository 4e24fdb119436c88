//! SQLite database connection management for Marksync.
//!
//! Provides the [`Database`] struct that wraps a `rusqlite::Connection`
//! and automatically runs schema migrations on open.

use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

use super::migrations;
use super::scope::WriteScope;

/// Core database wrapper providing SQLite connection management.
///
/// The `Database` owns a `rusqlite::Connection`. Managers borrow the
/// connection through [`Database::connection`]; nothing reaches it through
/// global state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) a SQLite database at the given file path and runs migrations.
    ///
    /// The WAL journal is enabled so readers are not blocked by a writer.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the connection cannot be established or migrations fail.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        Self::open_with_journal(path, true)
    }

    /// Like [`Database::open`], with the WAL journal optional.
    pub fn open_with_journal<P: AsRef<Path>>(path: P, wal: bool) -> Result<Self, rusqlite::Error> {
        let path = path.as_ref();
        debug!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;
        if wal {
            let mode: String =
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
            debug!("journal_mode = {}", mode);
        }
        let db = Self { conn };
        db.run_migrations()?;
        info!("Database ready at {}", path.display());
        Ok(db)
    }

    /// Opens an in-memory SQLite database and runs migrations.
    ///
    /// Useful for testing, the database is discarded when the `Database` is dropped.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the connection cannot be established or migrations fail.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.run_migrations()?;
        Ok(db)
    }

    /// Runs all schema migrations, creating tables, indexes and triggers if they do not exist.
    fn run_migrations(&self) -> Result<(), rusqlite::Error> {
        migrations::run_all(&self.conn)
    }

    /// Returns a reference to the underlying `rusqlite::Connection`.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Runs `f` inside one write scope and commits if it returns `Ok`.
    ///
    /// Managers called from `f` with the same connection join this scope
    /// through savepoints, so a failure anywhere rolls back everything.
    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<rusqlite::Error>,
    {
        let scope = WriteScope::begin(&self.conn)?;
        let out = f(&self.conn)?;
        scope.commit()?;
        Ok(out)
    }
}
