//! Core error types

use std::path::PathBuf;

use cropdesk_documents::SessionId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] cropdesk_storage::StorageError),

    #[error("Recent files error: {0}")]
    Recent(#[from] cropdesk_recent::RecentError),

    #[error("Document error: {0}")]
    Document(#[from] cropdesk_documents::DocumentError),

    #[error("Cannot open {name}: {reason}")]
    FatalLoad { name: String, reason: String },

    #[error("Failed to {operation} {}: {source}", .path.display())]
    FileSystem {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed import of {}: {reason}", .path.display())]
    Conversion { path: PathBuf, reason: String },

    #[error("Script error: {0}")]
    Script(String),

    #[error("No open session with id {0}")]
    SessionNotFound(SessionId),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    pub(crate) fn file_system(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        CoreError::FileSystem {
            operation,
            path: path.into(),
            source,
        }
    }
}
