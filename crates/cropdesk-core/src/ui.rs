//! Boundary to the GUI shell

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cropdesk_documents::{GroupId, SavePrompt, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Information,
    Warning,
    Error,
}

/// Commands the session manager sends to the GUI shell.
///
/// Calls arrive on the UI thread, one at a time. Implementations must not
/// call back into the `SessionManager` from inside these methods.
pub trait UiHost: SavePrompt {
    /// Append a line to the message panel
    fn show_message(&self, text: &str, level: MessageLevel);

    /// Create a tab for a newly opened session at the end of `group`
    fn add_tab(&self, label: &str, session: SessionId, group: GroupId);

    /// Drop the tab at `index` after its session has been closed
    fn remove_tab(&self, group: GroupId, index: usize);

    /// Bring an already open session's tab to the front
    fn select_tab(&self, session: SessionId, group: GroupId);

    /// Show or hide the wait cursor
    fn set_busy(&self, busy: bool);

    /// Redraw the recent-file lists on both start pages
    fn refresh_recent_files(&self, entries: &[PathBuf]);
}

/// Holds the wait cursor on for as long as it lives.
///
/// Guards nest: only the outermost one toggles the cursor, so an import that
/// opens its converted file shows one busy period, not two.
pub struct BusyGuard {
    ui: Arc<dyn UiHost>,
    depth: Arc<AtomicUsize>,
}

impl BusyGuard {
    pub fn new(ui: Arc<dyn UiHost>, depth: Arc<AtomicUsize>) -> Self {
        if depth.fetch_add(1, Ordering::SeqCst) == 0 {
            ui.set_busy(true);
        }
        Self { ui, depth }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if self.depth.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.ui.set_busy(false);
        }
    }
}
