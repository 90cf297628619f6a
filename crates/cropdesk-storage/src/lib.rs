//! Cropdesk Storage Layer
//!
//! SQLite-backed persistence for user-scoped workbench state.
//! Multi-row writes run inside a single transaction so a crash never leaves a
//! half-written recent-file list behind.

mod database;
mod error;
mod migrations;
mod recent;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
