//! Session Manager for Marksync.
//!
//! Keeps the last snapshot of authentication cookies. A save replaces the
//! whole set in one transaction: readers see either the old set or the new
//! one, never a mix.

use rusqlite::{params, Connection};
use tracing::{debug, instrument, warn};

use crate::database::scope::WriteScope;
use crate::types::cookie::SessionCookie;
use crate::types::errors::SessionError;

/// Trait defining session snapshot operations.
pub trait SessionManagerTrait {
    fn replace_all(&mut self, cookies: &[SessionCookie]) -> Result<(), SessionError>;
    fn restore_all(&self) -> Result<Vec<SessionCookie>, SessionError>;
    fn has_session(&self) -> Result<bool, SessionError>;
    fn clear_all(&mut self) -> Result<usize, SessionError>;
}

/// Session manager backed by a SQLite connection.
pub struct SessionManager<'a> {
    conn: &'a Connection,
}

impl<'a> SessionManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn write_all(&self, cookies: &[SessionCookie]) -> rusqlite::Result<()> {
        self.conn.execute("DELETE FROM session_cookies", [])?;
        let mut stmt = self.conn.prepare(
            "INSERT INTO session_cookies (name, value, domain, path, expires, secure)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for c in cookies {
            stmt.execute(params![c.name, c.value, c.domain, c.path, c.expires, c.secure])?;
        }
        Ok(())
    }
}

impl<'a> SessionManagerTrait for SessionManager<'a> {
    /// Replaces the stored cookie set with `cookies`.
    ///
    /// Two cookies with the same name abort the replace. On any failure the
    /// previously stored set is left exactly as it was.
    #[instrument(skip_all, fields(count = cookies.len()), level = "debug")]
    fn replace_all(&mut self, cookies: &[SessionCookie]) -> Result<(), SessionError> {
        let scope = WriteScope::begin(self.conn).map_err(SessionError::TransactionAborted)?;
        match self.write_all(cookies) {
            Ok(()) => {
                scope.commit().map_err(SessionError::TransactionAborted)?;
                debug!("Saved {} session cookie(s)", cookies.len());
                Ok(())
            }
            Err(e) => {
                if let Err(rb) = scope.rollback() {
                    warn!("Rollback after failed session save also failed: {}", rb);
                }
                Err(SessionError::TransactionAborted(e))
            }
        }
    }

    /// Stored cookies in the order they were saved.
    fn restore_all(&self) -> Result<Vec<SessionCookie>, SessionError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, value, domain, path, expires, secure
             FROM session_cookies ORDER BY rowid ASC",
        )?;
        let cookies = stmt
            .query_map([], |row| {
                Ok(SessionCookie {
                    name: row.get(0)?,
                    value: row.get(1)?,
                    domain: row.get(2)?,
                    path: row.get(3)?,
                    expires: row.get(4)?,
                    secure: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cookies)
    }

    fn has_session(&self) -> Result<bool, SessionError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM session_cookies", [], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Deletes every stored cookie and returns how many there were.
    fn clear_all(&mut self) -> Result<usize, SessionError> {
        let removed = self.conn.execute("DELETE FROM session_cookies", [])?;
        debug!("Cleared {} session cookie(s)", removed);
        Ok(removed)
    }
}
