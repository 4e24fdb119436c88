// Marksync shared type definitions
// Each submodule defines types used across the store.

pub mod bookmark;
pub mod cookie;
pub mod errors;
pub mod label;
pub mod outcome;
pub mod query;
pub mod resource;
pub mod settings;
