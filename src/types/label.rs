use serde::{Deserialize, Serialize};

/// A bookmark label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    pub id: i64,
    pub title: String,
    /// Cached number of bookmarks carrying this label. Advisory only; refreshed
    /// by `LabelManager::recount`.
    pub count: i64,
}
