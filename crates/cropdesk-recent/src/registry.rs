//! Most-recently-used file registry

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::store::MruStore;
use crate::Result;

pub const DEFAULT_CAPACITY: usize = 10;

/// Bounded list of recently opened files, most recent first.
///
/// Mutations change the in-memory list first and then write it through to
/// the store. An `Err` from a mutating call means only the write failed; the
/// in-memory change stands and is written again on the next mutation or
/// `flush`.
pub struct MruRegistry {
    capacity: usize,
    entries: VecDeque<PathBuf>,
    store: Box<dyn MruStore>,
}

impl MruRegistry {
    /// Empty registry over `store`. Nothing is loaded.
    pub fn new(capacity: usize, store: Box<dyn MruStore>) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
            store,
        }
    }

    /// Registry holding whatever `store` has saved.
    ///
    /// A store that cannot be read yields an empty registry. Saved duplicates
    /// keep their most recent position and the list is cut to `capacity`.
    pub fn load(capacity: usize, store: Box<dyn MruStore>) -> Self {
        let mut registry = Self::new(capacity, store);

        let saved = match registry.store.load() {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load recent files, starting empty");
                Vec::new()
            }
        };

        for path in saved {
            if registry.entries.len() == registry.capacity {
                break;
            }
            if !registry.entries.contains(&path) {
                registry.entries.push_back(path);
            }
        }

        tracing::debug!(count = registry.entries.len(), "Loaded recent files");

        registry
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|entry| entry == path)
    }

    /// Entries for display, most recent first
    pub fn list(&self) -> Vec<PathBuf> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.entries.iter()
    }

    /// Insert `path` at the front, or move it there if already listed.
    /// The oldest entry is evicted once capacity is exceeded.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        self.entries.retain(|existing| existing != &path);
        self.entries.push_front(path);
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_back() {
                tracing::debug!(path = %evicted.display(), "Evicted oldest recent file");
            }
        }
        self.persist()
    }

    /// Remove `path`. Returns whether it was listed; nothing is written if not.
    pub fn remove(&mut self, path: &Path) -> Result<bool> {
        let before = self.entries.len();
        self.entries.retain(|existing| existing != path);
        if self.entries.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Replace `old` with `new` in place, keeping its recency position.
    ///
    /// An absent `old` is logged and ignored (`Ok(false)`). If `new` was
    /// already listed elsewhere, that other entry is dropped.
    pub fn rename(&mut self, old: &Path, new: impl Into<PathBuf>) -> Result<bool> {
        let new = new.into();
        if old == new.as_path() {
            return Ok(self.contains(old));
        }

        if !self.contains(old) {
            tracing::warn!(
                old = %old.display(),
                new = %new.display(),
                "Rename of a file that is not in the recent list"
            );
            return Ok(false);
        }

        self.entries.retain(|existing| existing != &new);
        if let Some(slot) = self.entries.iter_mut().find(|entry| entry.as_path() == old) {
            *slot = new;
        }
        self.persist()?;
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.persist()
    }

    /// Drop entries whose file no longer exists. Returns how many were dropped.
    pub fn clean(&mut self) -> Result<usize> {
        let before = self.entries.len();
        self.entries.retain(|path| {
            let exists = path.exists();
            if !exists {
                tracing::info!(path = %path.display(), "Dropping missing recent file");
            }
            exists
        });

        let dropped = before - self.entries.len();
        if dropped > 0 {
            self.persist()?;
        }
        Ok(dropped)
    }

    /// Write the current list to the store
    pub fn flush(&self) -> Result<()> {
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let entries: Vec<PathBuf> = self.entries.iter().cloned().collect();
        if let Err(e) = self.store.save(&entries) {
            tracing::error!(error = %e, "Failed to persist recent files");
            return Err(e);
        }
        Ok(())
    }
}

impl std::fmt::Debug for MruRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MruRegistry")
            .field("capacity", &self.capacity)
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}
