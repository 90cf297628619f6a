//! Cropdesk Core
//!
//! Session management for the modelling workbench: which documents are open,
//! in which of the two tab groups, what was opened recently, and whether the
//! application may close. The GUI shell implements `UiHost` and forwards its
//! events to `SessionManager`; nothing else touches the groups or the
//! recent-file list.

mod config;
mod error;
mod import;
mod manager;
mod script;
mod ui;

pub use config::Config;
pub use error::CoreError;
pub use import::{converted_path, ImportAdapter};
pub use manager::SessionManager;
pub use script::{Script, ScriptLoader};
pub use ui::{BusyGuard, MessageLevel, UiHost};

// Re-export core components
pub use cropdesk_documents::{
    Decoded, Document, DocumentCodec, DocumentError, DocumentSession, GroupId, ParseDiagnostic,
    SaveChoice, SavePrompt, SessionId, SessionState, WorkspaceGroup,
};
pub use cropdesk_recent::{
    DatabaseMruStore, MemoryMruStore, MruRegistry, MruStore, RecentError, DEFAULT_CAPACITY,
};
pub use cropdesk_storage::{Database, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
