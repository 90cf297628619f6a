//! Cropdesk Document Sessions
//!
//! One `DocumentSession` per open simulation document, held in exactly one of
//! the two `WorkspaceGroup`s. Sessions move through a small state machine:
//!
//! ```text
//! Opening -> Clean <-> Dirty -> Closing -> Closed
//! ```
//!
//! Document parsing, editing and saving belong to external collaborators and
//! are reached through the `Document` and `DocumentCodec` traits.

mod codec;
mod error;
mod group;
mod session;
mod state;

pub use codec::{Decoded, Document, DocumentCodec, ParseDiagnostic, SaveChoice, SavePrompt};
pub use error::DocumentError;
pub use group::{GroupId, WorkspaceGroup};
pub use session::{DocumentSession, SessionId};
pub use state::SessionState;

pub type Result<T> = std::result::Result<T, DocumentError>;
