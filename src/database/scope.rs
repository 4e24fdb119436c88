//! All-or-nothing write boundaries.

use rusqlite::Connection;
use tracing::warn;

const SAVEPOINT: &str = "marksync_write";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Transaction,
    Savepoint,
}

/// Guard around one logical write.
///
/// Opens `BEGIN IMMEDIATE` on a connection in autocommit mode, or a savepoint
/// when the caller already holds a transaction on the same connection. The
/// outer transaction is never committed or closed by a nested scope. Dropping
/// the guard without [`WriteScope::commit`] rolls the scope back.
pub struct WriteScope<'c> {
    conn: &'c Connection,
    mode: Mode,
    done: bool,
}

impl<'c> WriteScope<'c> {
    pub fn begin(conn: &'c Connection) -> rusqlite::Result<Self> {
        let mode = if conn.is_autocommit() {
            conn.execute_batch("BEGIN IMMEDIATE")?;
            Mode::Transaction
        } else {
            conn.execute_batch(&format!("SAVEPOINT {}", SAVEPOINT))?;
            Mode::Savepoint
        };
        Ok(Self {
            conn,
            mode,
            done: false,
        })
    }

    /// True when this scope joined a transaction opened by the caller.
    pub fn is_nested(&self) -> bool {
        self.mode == Mode::Savepoint
    }

    pub fn commit(mut self) -> rusqlite::Result<()> {
        let sql = match self.mode {
            Mode::Transaction => "COMMIT".to_string(),
            Mode::Savepoint => format!("RELEASE {}", SAVEPOINT),
        };
        self.conn.execute_batch(&sql)?;
        self.done = true;
        Ok(())
    }

    pub fn rollback(mut self) -> rusqlite::Result<()> {
        self.done = true;
        self.undo()
    }

    fn undo(&self) -> rusqlite::Result<()> {
        match self.mode {
            Mode::Transaction => self.conn.execute_batch("ROLLBACK"),
            Mode::Savepoint => self.conn.execute_batch(&format!(
                "ROLLBACK TO {sp}; RELEASE {sp}",
                sp = SAVEPOINT
            )),
        }
    }
}

impl Drop for WriteScope<'_> {
    fn drop(&mut self) {
        if !self.done {
            if let Err(e) = self.undo() {
                warn!("Failed to roll back write scope: {}", e);
            }
        }
    }
}
