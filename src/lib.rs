//! Marksync: local bookmark store for a bookmark sync client.
//!
//! Bookmarks, labels and session cookies live in one SQLite database and are
//! reached either through the typed managers or through the address-based
//! [`provider::Provider`] (`content://org.marksync.provider/...`).
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod database;
pub mod managers;
pub mod platform;
pub mod provider;
pub mod services;
pub mod types;

pub use provider::Provider;
