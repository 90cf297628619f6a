//! Collaborator traits for the simulation document format
//!
//! The workbench never looks inside a document. It only needs to decode one,
//! ask whether it has unsaved edits, save it somewhere and tear it down.

use std::fmt;
use std::path::{Path, PathBuf};

/// An open, editable simulation document.
pub trait Document {
    /// True if the document has edits that are not on disk.
    fn is_dirty(&self) -> bool;

    /// Serialize the document to `path`, clearing the dirty flag on success.
    fn save_to(&mut self, path: &Path) -> anyhow::Result<()>;

    /// Release editor resources. Called once, after the close check passed.
    fn detach(&mut self) {}
}

/// A recoverable problem found while decoding. The document is still usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub message: String,
    pub line: Option<usize>,
}

impl ParseDiagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    pub fn at_line(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
        }
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// A decoded document plus any recoverable diagnostics.
pub struct Decoded {
    pub document: Box<dyn Document>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl Decoded {
    pub fn clean(document: Box<dyn Document>) -> Self {
        Self {
            document,
            diagnostics: Vec::new(),
        }
    }
}

impl fmt::Debug for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoded")
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

/// Parser for the simulation document format.
///
/// An `Err` means no usable document could be produced at all.
pub trait DocumentCodec {
    fn decode_from_path(&self, path: &Path) -> anyhow::Result<Decoded>;

    fn decode_from_text(&self, text: &str) -> anyhow::Result<Decoded>;
}

/// Answer to "save changes before closing?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveChoice {
    Save,
    Discard,
    Cancel,
}

/// The user-facing questions a save check may need to ask.
pub trait SavePrompt {
    fn prompt_save_discard_cancel(&self, label: &str) -> SaveChoice;

    /// Ask where to save a document that has no backing file yet.
    fn ask_save_file_name(&self, suggested: Option<&Path>) -> Option<PathBuf>;
}
