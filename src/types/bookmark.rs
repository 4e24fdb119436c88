use serde::{Deserialize, Serialize};
use url::Url;

use super::errors::StoreError;

/// A stored (or about-to-be-updated) bookmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookmark {
    /// Internal row id, `None` until the store assigns one.
    pub id: Option<i64>,
    /// Stable identifier supplied by the remote service.
    pub external_id: String,
    pub title: String,
    pub url: String,
    pub host: String,
    pub description: String,
    /// Epoch milliseconds.
    pub created: i64,
    /// Epoch milliseconds.
    pub modified: i64,
    /// Label titles, persisted through the `bookmark_labels` association.
    pub labels: Vec<String>,
}

/// Payload for a bookmark that has not been stored yet.
///
/// Every optional field has a store-side default; see
/// [`NewBookmark::into_bookmark`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewBookmark {
    pub external_id: String,
    pub url: String,
    pub title: Option<String>,
    pub host: Option<String>,
    pub description: Option<String>,
    pub created: Option<i64>,
    pub modified: Option<i64>,
    pub labels: Vec<String>,
}

impl NewBookmark {
    pub fn new(external_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_timestamps(mut self, created: i64, modified: i64) -> Self {
        self.created = Some(created);
        self.modified = Some(modified);
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Fills in defaults and validates required fields.
    ///
    /// `created` and `modified` each read the clock through `now` separately,
    /// so a payload missing both may end up with slightly different values.
    pub fn into_bookmark(
        self,
        now: impl Fn() -> i64,
        untitled: &str,
    ) -> Result<Bookmark, StoreError> {
        if self.external_id.trim().is_empty() {
            return Err(StoreError::MissingField("external_id"));
        }
        if self.url.trim().is_empty() {
            return Err(StoreError::MissingField("url"));
        }

        let host = match self.host.filter(|h| !h.is_empty()) {
            Some(h) => h,
            None => host_of(&self.url)?,
        };
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| untitled.to_string());
        let created = self.created.unwrap_or_else(&now);
        let modified = self.modified.unwrap_or_else(&now);

        Ok(Bookmark {
            id: None,
            external_id: self.external_id,
            title,
            url: self.url,
            host,
            description: self.description.unwrap_or_default(),
            created,
            modified,
            labels: self.labels,
        })
    }
}

/// Extracts the host component of a bookmark URL.
pub fn host_of(url: &str) -> Result<String, StoreError> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .ok_or_else(|| StoreError::InvalidUrl(url.to_string()))
}

/// Minimal projection returned by identity lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkRef {
    pub id: i64,
    pub external_id: String,
    pub title: String,
}

/// Point-lookup key for [`crate::managers::bookmark_manager::BookmarkManager::find`].
#[derive(Debug, Clone, Copy)]
pub enum Lookup<'a> {
    Url(&'a str),
    ExternalId(&'a str),
}
