use serde::{Deserialize, Serialize};

/// What a resolved address refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    /// `bookmarks`
    Collection,
    /// `bookmarks/{id}`
    Item(i64),
    /// `bookmarks/search[?q=...]`
    Search { query: Option<String> },
    /// `bookmarks?label_id={id}`
    FilteredCollection { label_id: i64 },
    /// `labels`
    LabelCollection,
    /// `labels/{id}`
    LabelItem(i64),
    /// `live_folders/bookmarks`, a quick-folder view over all bookmarks.
    QuickFolder,
}

impl ResourceKind {
    /// Short name used in logs and `UnknownResource` errors.
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Collection => "bookmarks",
            ResourceKind::Item(_) => "bookmark",
            ResourceKind::Search { .. } => "bookmarks/search",
            ResourceKind::FilteredCollection { .. } => "bookmarks?label_id",
            ResourceKind::LabelCollection => "labels",
            ResourceKind::LabelItem(_) => "label",
            ResourceKind::QuickFolder => "live_folders/bookmarks",
        }
    }

    /// Content type used for type negotiation.
    pub fn content_type(&self) -> ContentType {
        let (family, cardinality) = match self {
            ResourceKind::Collection
            | ResourceKind::Search { .. }
            | ResourceKind::FilteredCollection { .. }
            | ResourceKind::QuickFolder => (Family::Bookmark, Cardinality::Collection),
            ResourceKind::Item(_) => (Family::Bookmark, Cardinality::Item),
            ResourceKind::LabelCollection => (Family::Label, Cardinality::Collection),
            ResourceKind::LabelItem(_) => (Family::Label, Cardinality::Item),
        };
        ContentType { family, cardinality }
    }
}

/// Resource family an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Family {
    Bookmark,
    Label,
}

/// Whether an address names a set of records or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    Collection,
    Item,
}

/// Type descriptor a generic caller can inspect before querying an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentType {
    pub family: Family,
    pub cardinality: Cardinality,
}

impl ContentType {
    /// MIME-style string, e.g. `vnd.marksync.dir/bookmark`.
    pub fn mime(&self) -> String {
        let card = match self.cardinality {
            Cardinality::Collection => "dir",
            Cardinality::Item => "item",
        };
        let family = match self.family {
            Family::Bookmark => "bookmark",
            Family::Label => "label",
        };
        format!("vnd.marksync.{}/{}", card, family)
    }
}
