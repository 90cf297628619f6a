//! Document session error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Document already open: {}", .0.display())]
    DuplicatePath(PathBuf),

    #[error("Tab index {index} out of range (group has {len} tabs)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Failed to save {}: {reason}", .path.display())]
    Save { path: PathBuf, reason: String },
}
