//! Persistence hooks for the recent-file list

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cropdesk_storage::{Database, StorageError};

use crate::error::RecentError;
use crate::Result;

/// Durable home of the recent-file list.
pub trait MruStore {
    /// Entries as last saved, most recent first
    fn load(&self) -> Result<Vec<PathBuf>>;

    /// Replace the saved list with `entries`
    fn save(&self, entries: &[PathBuf]) -> Result<()>;
}

/// Recent files kept in the user's configuration database.
#[derive(Clone)]
pub struct DatabaseMruStore {
    db: Database,
}

impl DatabaseMruStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

/// Stored form of `path`. The `recent_files` column is TEXT, so a path that
/// is not valid UTF-8 has none.
fn path_to_string(path: &Path) -> Option<String> {
    path.to_str().map(str::to_string)
}

impl MruStore for DatabaseMruStore {
    fn load(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .db
            .load_recent_files()?
            .into_iter()
            .map(PathBuf::from)
            .collect())
    }

    /// Entries that cannot be stored are left out of the saved list; they
    /// stay in the running session's list and the rest is still written.
    fn save(&self, entries: &[PathBuf]) -> Result<()> {
        let paths: Vec<String> = entries
            .iter()
            .filter_map(|p| {
                let stored = path_to_string(p);
                if stored.is_none() {
                    tracing::warn!(path = %p.display(), "Recent file path is not valid UTF-8, not saved");
                }
                stored
            })
            .collect();
        self.db.replace_recent_files(&paths)?;
        Ok(())
    }
}

#[derive(Default)]
struct MemoryState {
    entries: Vec<PathBuf>,
    saves: usize,
    fail_writes: bool,
}

/// Process-local store. Clones share the same list.
#[derive(Clone, Default)]
pub struct MemoryMruStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryMruStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let store = Self::default();
        store.state.lock().entries = entries.into_iter().map(Into::into).collect();
        store
    }

    /// Saved entries
    pub fn entries(&self) -> Vec<PathBuf> {
        self.state.lock().entries.clone()
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.state.lock().saves
    }

    /// Make subsequent saves fail, as a full or read-only disk would
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }
}

impl MruStore for MemoryMruStore {
    fn load(&self) -> Result<Vec<PathBuf>> {
        Ok(self.state.lock().entries.clone())
    }

    fn save(&self, entries: &[PathBuf]) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(RecentError::Storage(StorageError::Io(
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "store is read-only"),
            )));
        }
        state.entries = entries.to_vec();
        state.saves += 1;
        Ok(())
    }
}
