//! Document session
//!
//! A session is the workbench's handle on one open document: its identity,
//! the file it came from (if any) and where it is in its lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::codec::{Document, SaveChoice, SavePrompt};
use crate::error::DocumentError;
use crate::state::SessionState;
use crate::Result;

/// Opaque handle, unique per open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub struct DocumentSession {
    id: SessionId,
    /// Tab text
    label: String,
    /// Backing file; `None` for documents opened from memory
    file_path: Option<PathBuf>,
    state: SessionState,
    opened_at: DateTime<Utc>,
    document: Box<dyn Document>,
}

impl DocumentSession {
    /// Session for a document decoded from `path`, labelled with its file name.
    pub fn from_file(path: PathBuf, document: Box<dyn Document>) -> Self {
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::new(label, Some(path), document)
    }

    /// Session for a document that has never been saved.
    pub fn in_memory(label: impl Into<String>, document: Box<dyn Document>) -> Self {
        Self::new(label.into(), None, document)
    }

    fn new(label: String, file_path: Option<PathBuf>, document: Box<dyn Document>) -> Self {
        Self {
            id: SessionId::new(),
            label,
            file_path,
            state: SessionState::Opening,
            opened_at: Utc::now(),
            document,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Current state. Clean/Dirty follow the document's own dirty flag.
    pub fn state(&self) -> SessionState {
        if self.state.is_open() {
            if self.document.is_dirty() {
                SessionState::Dirty
            } else {
                SessionState::Clean
            }
        } else {
            self.state
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.document.is_dirty()
    }

    pub fn document(&self) -> &dyn Document {
        self.document.as_ref()
    }

    pub fn document_mut(&mut self) -> &mut dyn Document {
        self.document.as_mut()
    }

    fn open_state(&self) -> SessionState {
        if self.document.is_dirty() {
            SessionState::Dirty
        } else {
            SessionState::Clean
        }
    }

    /// Attempt to transition to a new state
    fn transition_to(&mut self, new_state: SessionState) -> Result<()> {
        let current = self.state();
        if !current.can_transition_to(new_state) {
            return Err(DocumentError::InvalidTransition {
                from: current.to_string(),
                to: new_state.to_string(),
            });
        }

        tracing::debug!(
            session_id = %self.id,
            from = %current,
            to = %new_state,
            "Session state transition"
        );

        self.state = new_state;
        Ok(())
    }

    /// Decoding finished; the session is now open for editing.
    pub fn mark_open(&mut self) -> Result<()> {
        let target = self.open_state();
        self.transition_to(target)
    }

    /// Enter `Closing` ahead of a save check.
    pub fn begin_close(&mut self) -> Result<()> {
        self.transition_to(SessionState::Closing)
    }

    /// The close was refused; go back to being open.
    pub fn abort_close(&mut self) -> Result<()> {
        let target = self.open_state();
        self.transition_to(target)
    }

    /// Tear the document down. Only valid from `Closing`.
    pub fn detach(&mut self) -> Result<()> {
        self.transition_to(SessionState::Closed)?;
        self.document.detach();

        tracing::info!(session_id = %self.id, label = %self.label, "Detached session");

        Ok(())
    }

    /// Save unsaved edits if the user wants them kept.
    ///
    /// Returns whether the session may be closed. A clean document passes
    /// without asking. A failed save is an error and the session stays open.
    pub fn save_if_changed<P>(&mut self, prompt: &P) -> Result<bool>
    where
        P: SavePrompt + ?Sized,
    {
        if !self.document.is_dirty() {
            return Ok(true);
        }

        match prompt.prompt_save_discard_cancel(&self.label) {
            SaveChoice::Cancel => {
                tracing::debug!(session_id = %self.id, "Close cancelled by user");
                Ok(false)
            }
            SaveChoice::Discard => {
                tracing::info!(session_id = %self.id, label = %self.label, "Discarded unsaved changes");
                Ok(true)
            }
            SaveChoice::Save => {
                let target = match &self.file_path {
                    Some(path) => path.clone(),
                    None => match prompt.ask_save_file_name(Some(Path::new(&self.label))) {
                        Some(path) => path,
                        None => return Ok(false),
                    },
                };

                self.document
                    .save_to(&target)
                    .map_err(|e| DocumentError::Save {
                        path: target.clone(),
                        reason: format!("{:#}", e),
                    })?;

                tracing::info!(session_id = %self.id, path = %target.display(), "Saved document");

                Ok(true)
            }
        }
    }
}

impl fmt::Debug for DocumentSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentSession")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("file_path", &self.file_path)
            .field("state", &self.state())
            .field("opened_at", &self.opened_at)
            .finish_non_exhaustive()
    }
}
