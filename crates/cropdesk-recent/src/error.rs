//! Recent-file error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecentError {
    #[error("Storage error: {0}")]
    Storage(#[from] cropdesk_storage::StorageError),
}
