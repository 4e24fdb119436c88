//! Marksync demo: opens a store, syncs a few bookmarks into it and reads
//! them back through store addresses.
//!
//! Usage: `marksync [settings.json]`. Log verbosity follows `RUST_LOG`.

use std::error::Error;

use marksync::managers::{LabelManagerTrait, SessionManagerTrait};
use marksync::services::resource_router;
use marksync::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use marksync::types::bookmark::NewBookmark;
use marksync::types::cookie::SessionCookie;
use marksync::types::query::{Fields, QueryRequest};
use marksync::Provider;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("marksync=info")),
        )
        .init();

    let mut settings_engine = SettingsEngine::new(std::env::args().nth(1));
    let settings = settings_engine.load()?;
    let provider = Provider::open(&settings)?;
    let mut changes = provider.subscribe();

    let outcomes = provider.reconcile_all(vec![
        NewBookmark::new("remote-1", "https://www.rust-lang.org/")
            .with_title("Rust")
            .with_labels(["lang", "rust"]),
        NewBookmark::new("remote-2", "https://docs.rs/rusqlite")
            .with_title("rusqlite docs")
            .with_labels(["rust", "sqlite"]),
        NewBookmark::new("remote-3", "https://sqlite.org/fts5.html"),
    ])?;
    println!("Reconciled: {:?}", outcomes);

    provider.insert(
        &resource_router::bookmarks_address(),
        &Fields::new()
            .set("external_id", "local-1".to_string())
            .set("url", "https://example.com/".to_string()),
    )?;
    provider.recount_labels()?;

    let all = provider.query(
        &resource_router::bookmarks_address(),
        &QueryRequest::new().project(["id", "title", "host"]),
    )?;
    println!("{}", serde_json::to_string_pretty(&all.to_json())?);

    let hits = provider.query(
        &format!("{}/search?q=rust", resource_router::bookmarks_address()),
        &QueryRequest::new().project(["id", "title"]),
    )?;
    println!("Search 'rust': {} hit(s)", hits.len());

    for label in provider.labels().list()? {
        println!("  {} ({})", label.title, label.count);
    }

    let mut sessions = provider.sessions();
    sessions.replace_all(&[SessionCookie::new("SID", "demo")])?;
    println!("Session cookies stored: {}", sessions.restore_all()?.len());

    while let Ok(address) = changes.try_recv() {
        println!("Changed: {}", address);
    }
    Ok(())
}
