//! Workspace groups
//!
//! The workbench has two side-by-side tab groups. Each holds its sessions in
//! tab order; the group itself lives for the whole process.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::DocumentError;
use crate::session::{DocumentSession, SessionId};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupId {
    /// Left-hand tab group, always visible
    Primary,
    /// Right-hand tab group, shown when the window is split
    Secondary,
}

impl GroupId {
    pub const ALL: [GroupId; 2] = [GroupId::Primary, GroupId::Secondary];

    pub fn index(self) -> usize {
        match self {
            GroupId::Primary => 0,
            GroupId::Secondary => 1,
        }
    }

    pub fn other(self) -> GroupId {
        match self {
            GroupId::Primary => GroupId::Secondary,
            GroupId::Secondary => GroupId::Primary,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupId::Primary => "primary",
            GroupId::Secondary => "secondary",
        }
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug)]
pub struct WorkspaceGroup {
    id: GroupId,
    /// Insertion order is tab order
    sessions: Vec<DocumentSession>,
}

impl WorkspaceGroup {
    pub fn new(id: GroupId) -> Self {
        Self {
            id,
            sessions: Vec::new(),
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Find the session backed by `path`
    pub fn find_by_path(&self, path: &Path) -> Option<&DocumentSession> {
        self.sessions
            .iter()
            .find(|session| session.file_path() == Some(path))
    }

    /// Tab index of the session with the given id
    pub fn position_of(&self, id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|session| session.id() == id)
    }

    pub fn get(&self, index: usize) -> Result<&DocumentSession> {
        let len = self.sessions.len();
        self.sessions
            .get(index)
            .ok_or(DocumentError::IndexOutOfRange { index, len })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut DocumentSession> {
        let len = self.sessions.len();
        self.sessions
            .get_mut(index)
            .ok_or(DocumentError::IndexOutOfRange { index, len })
    }

    /// Append a session as the last tab. Returns its index.
    pub fn insert(&mut self, session: DocumentSession) -> Result<usize> {
        if let Some(path) = session.file_path() {
            if self.find_by_path(path).is_some() {
                return Err(DocumentError::DuplicatePath(path.to_path_buf()));
            }
        }

        tracing::debug!(
            group = %self.id,
            session_id = %session.id(),
            label = %session.label(),
            "Added session to group"
        );

        self.sessions.push(session);
        Ok(self.sessions.len() - 1)
    }

    /// Remove the session at `index` and hand it back for finalization
    pub fn remove_at(&mut self, index: usize) -> Result<DocumentSession> {
        let len = self.sessions.len();
        if index >= len {
            return Err(DocumentError::IndexOutOfRange { index, len });
        }

        let session = self.sessions.remove(index);

        tracing::debug!(group = %self.id, session_id = %session.id(), "Removed session from group");

        Ok(session)
    }

    /// Remove every session, in tab order
    pub fn drain(&mut self) -> Vec<DocumentSession> {
        self.sessions.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentSession> {
        self.sessions.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DocumentSession> {
        self.sessions.iter_mut()
    }
}
