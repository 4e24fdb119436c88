//! Address-based front door of the store.
//!
//! [`Provider`] owns the database, the change notifier and the localizer.
//! Every call resolves the address first, plans the statement against the
//! column allow-lists, runs it, and publishes the changed address only after
//! the write has committed.

use std::fs;

use rusqlite::params_from_iter;
use rusqlite::types::Value;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument};

use crate::database::Database;
use crate::managers::{BookmarkManager, BookmarkManagerTrait, LabelManager, LabelManagerTrait, SessionManager};
use crate::services::change_notifier::ChangeNotifier;
use crate::services::localization_engine::LocalizationEngine;
use crate::services::query_planner::{self, WriteOp, WriteTarget};
use crate::services::resource_router;
use crate::types::bookmark::{host_of, NewBookmark};
use crate::types::errors::{ProviderError, StoreError};
use crate::types::outcome::{InsertOutcome, ReconcileOutcome};
use crate::types::query::{Fields, QueryRequest, ResultSet};
use crate::types::resource::{ContentType, ResourceKind};
use crate::types::settings::StoreSettings;

/// The bookmark store, addressed by `content://org.marksync.provider/...`.
pub struct Provider {
    db: Database,
    notifier: ChangeNotifier,
    localizer: LocalizationEngine,
}

impl Provider {
    /// Opens the file-backed store described by `settings`, creating the
    /// database directory if needed.
    pub fn open(settings: &StoreSettings) -> Result<Self, ProviderError> {
        let path = settings.database_file();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let db = Database::open_with_journal(&path, settings.wal_journal)?;
        info!("Opened bookmark store at {}", path.display());
        Self::from_parts(db, settings)
    }

    /// Opens a throwaway in-memory store with default settings.
    pub fn open_in_memory() -> Result<Self, ProviderError> {
        Self::from_parts(Database::open_in_memory()?, &StoreSettings::default())
    }

    fn from_parts(db: Database, settings: &StoreSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            db,
            notifier: ChangeNotifier::new(settings.notification_capacity),
            localizer: LocalizationEngine::for_locale(&settings.locale)?,
        })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Record store for bookmarks, titling untitled entries in the store locale.
    pub fn bookmarks(&self) -> BookmarkManager<'_> {
        BookmarkManager::with_untitled(self.db.connection(), self.localizer.untitled())
    }

    pub fn labels(&self) -> LabelManager<'_> {
        LabelManager::new(self.db.connection())
    }

    pub fn sessions(&self) -> SessionManager<'_> {
        SessionManager::new(self.db.connection())
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Registers an observer of changed addresses.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.notifier.subscribe()
    }

    /// Content type of the resource an address names.
    pub fn get_type(&self, address: &str) -> Result<ContentType, ProviderError> {
        Ok(resource_router::resolve(address)?.content_type())
    }

    /// Reads the rows an address names.
    #[instrument(skip(self, request), level = "debug")]
    pub fn query(&self, address: &str, request: &QueryRequest) -> Result<ResultSet, ProviderError> {
        let kind = resource_router::resolve(address)?;
        let plan = query_planner::plan(&kind, request)?;
        let sql = plan.to_sql();
        debug!(%sql, "Planned {} query", kind.name());

        let width = plan.columns.len();
        let mut stmt = self.db.connection().prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(plan.params.iter()), |row| {
                (0..width)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Vec<Value>>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ResultSet {
            columns: plan.column_names(),
            rows,
        })
    }

    /// Inserts one record into a collection address.
    ///
    /// A duplicate identity yields `ConflictIgnored` and publishes nothing.
    #[instrument(skip(self, fields), level = "debug")]
    pub fn insert(&self, address: &str, fields: &Fields) -> Result<InsertOutcome, ProviderError> {
        let kind = resource_router::resolve(address)?;
        let target = query_planner::plan_write(&kind, WriteOp::Insert)?;
        let map = target.insertable_columns();
        for (name, _) in fields.iter() {
            query_planner::allowed(map, name)?;
        }

        let outcome = match target {
            WriteTarget::Bookmarks(_) => self.bookmarks().insert(Self::new_bookmark(fields))?,
            WriteTarget::Labels(_) => {
                let title = fields.text("title").ok_or(StoreError::MissingField("title"))?;
                self.labels().create(&title)?
            }
        };

        if let InsertOutcome::Inserted(_) = outcome {
            self.notifier.notify(&resource_router::address(&kind));
        }
        Ok(outcome)
    }

    /// Updates the records an address names, optionally narrowed by `filter`.
    ///
    /// Returns the number of rows changed. Rows whose new values would
    /// collide with another row's unique key are skipped; any other constraint
    /// failure aborts the whole update.
    #[instrument(skip(self, fields, params), level = "debug")]
    pub fn update(
        &self,
        address: &str,
        fields: &Fields,
        filter: Option<&str>,
        params: &[Value],
    ) -> Result<usize, ProviderError> {
        let kind = resource_router::resolve(address)?;
        let target = query_planner::plan_write(&kind, WriteOp::Update)?;
        let map = target.writable_columns();
        let mut sets = fields
            .iter()
            .map(|(name, value)| query_planner::allowed(map, name).map(|(_, col)| (col, value.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        let changed = match target {
            WriteTarget::Bookmarks(id) => {
                self.normalize_bookmark_sets(&mut sets, fields)?;
                self.bookmarks().update_where(id, &sets, filter, params)?
            }
            WriteTarget::Labels(id) => self.labels().update_where(id, &sets, filter, params)?,
        };

        if changed > 0 {
            self.publish(&kind);
        }
        Ok(changed)
    }

    /// Deletes the records an address names, optionally narrowed by `filter`.
    #[instrument(skip(self, params), level = "debug")]
    pub fn delete(
        &self,
        address: &str,
        filter: Option<&str>,
        params: &[Value],
    ) -> Result<usize, ProviderError> {
        let kind = resource_router::resolve(address)?;
        let target = query_planner::plan_write(&kind, WriteOp::Delete)?;
        let removed = match target {
            WriteTarget::Bookmarks(id) => self.bookmarks().delete_where(id, filter, params)?,
            WriteTarget::Labels(id) => self.labels().delete_where(id, filter, params)?,
        };
        if removed > 0 {
            self.publish(&kind);
        }
        Ok(removed)
    }

    /// Reconciles a batch of remote bookmarks in one transaction.
    ///
    /// Either every payload is applied or none is. The bookmarks collection is
    /// published once, after commit, if anything changed.
    #[instrument(skip_all, fields(batch = batch.len()), level = "debug")]
    pub fn reconcile_all(&self, batch: Vec<NewBookmark>) -> Result<Vec<ReconcileOutcome>, ProviderError> {
        let untitled = self.localizer.untitled();
        let outcomes = self.db.transaction(|conn| {
            let mut mgr = BookmarkManager::with_untitled(conn, untitled.as_str());
            batch
                .into_iter()
                .map(|b| mgr.reconcile(b))
                .collect::<Result<Vec<_>, StoreError>>()
        })?;

        let changed = outcomes
            .iter()
            .any(|o| !matches!(o, ReconcileOutcome::ConflictIgnored));
        if changed {
            self.notifier.notify(&resource_router::bookmarks_address());
        }
        info!("Reconciled {} bookmark(s)", outcomes.len());
        Ok(outcomes)
    }

    /// Refreshes label counts; publishes the labels collection if any moved.
    pub fn recount_labels(&self) -> Result<usize, ProviderError> {
        let changed = self.labels().recount()?;
        if changed > 0 {
            self.notifier.notify(&resource_router::labels_address());
        }
        Ok(changed)
    }

    fn new_bookmark(fields: &Fields) -> NewBookmark {
        NewBookmark {
            external_id: fields.text("external_id").unwrap_or_default(),
            url: fields.text("url").unwrap_or_default(),
            title: fields.text("title"),
            host: fields.text("host"),
            description: fields.text("description"),
            created: fields.integer("created"),
            modified: fields.integer("modified"),
            labels: Vec::new(),
        }
    }

    /// Keeps the non-empty title, url and derived host invariants for partial
    /// updates. A blank host is re-derived from the url being written; without
    /// one there is nothing to derive it from.
    fn normalize_bookmark_sets(
        &self,
        sets: &mut Vec<(&'static str, Value)>,
        fields: &Fields,
    ) -> Result<(), StoreError> {
        let url = fields.text("url").filter(|u| !u.trim().is_empty());
        for (col, value) in sets.iter_mut() {
            let blank = match value {
                Value::Null => true,
                Value::Text(t) => t.trim().is_empty(),
                _ => false,
            };
            if !blank {
                continue;
            }
            match *col {
                "title" => *value = Value::Text(self.localizer.untitled()),
                "url" => return Err(StoreError::MissingField("url")),
                "host" => match &url {
                    Some(u) => *value = Value::Text(host_of(u)?),
                    None => return Err(StoreError::MissingField("host")),
                },
                _ => {}
            }
        }
        if fields.get("host").is_none() {
            if let Some(u) = &url {
                sets.push(("host", Value::Text(host_of(u)?)));
            }
        }
        Ok(())
    }

    /// Publishes a changed address, and its collection when it names one item.
    fn publish(&self, kind: &ResourceKind) {
        self.notifier.notify(&resource_router::address(kind));
        match kind {
            ResourceKind::Item(_) => self.notifier.notify(&resource_router::bookmarks_address()),
            ResourceKind::LabelItem(_) => self.notifier.notify(&resource_router::labels_address()),
            _ => {}
        }
    }
}
