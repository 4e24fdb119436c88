use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::platform;

/// File name of the database when the settings do not name one.
pub const DEFAULT_DATABASE_FILE: &str = "marksync.db";

/// Store configuration, persisted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreSettings {
    /// Database file; `None` resolves to `<data dir>/marksync.db`.
    pub database_path: Option<String>,
    /// Locale used for store-side defaults such as the untitled bookmark title.
    pub locale: String,
    /// Use the WAL journal for file-backed databases.
    pub wal_journal: bool,
    /// Buffered change notifications per subscriber before the oldest are dropped.
    pub notification_capacity: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database_path: None,
            locale: "en".to_string(),
            wal_journal: true,
            notification_capacity: 64,
        }
    }
}

impl StoreSettings {
    /// Database file to open: `database_path`, or the default file in the
    /// platform data directory.
    pub fn database_file(&self) -> PathBuf {
        match &self.database_path {
            Some(p) => PathBuf::from(p),
            None => platform::get_data_dir().join(DEFAULT_DATABASE_FILE),
        }
    }
}
