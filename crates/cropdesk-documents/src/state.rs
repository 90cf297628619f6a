//! Session State Machine
//!
//! ```text
//! Opening
//!   ↓ decoded
//! Clean ⇄ Dirty
//!   ↓ close requested
//! Closing
//!   ↓ save check passed        ↓ save check refused
//! Closed                       Clean / Dirty
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Document is being decoded
    Opening,
    /// Open with no unsaved changes
    Clean,
    /// Open with unsaved changes
    Dirty,
    /// Save check in progress
    Closing,
    /// Detached; the session no longer belongs to a group
    Closed,
}

impl SessionState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        match (self, target) {
            (SessionState::Opening, SessionState::Clean | SessionState::Dirty) => true,
            (SessionState::Clean, SessionState::Dirty) => true,
            (SessionState::Dirty, SessionState::Clean) => true,
            (SessionState::Clean | SessionState::Dirty, SessionState::Closing) => true,
            // A refused save check returns the session to the open phase
            (SessionState::Closing, SessionState::Clean | SessionState::Dirty) => true,
            (SessionState::Closing, SessionState::Closed) => true,
            (a, b) if *a == b => true,
            _ => false,
        }
    }

    /// Returns true while the session is usable for editing
    pub fn is_open(&self) -> bool {
        matches!(self, SessionState::Clean | SessionState::Dirty)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Opening => "opening",
            SessionState::Clean => "clean",
            SessionState::Dirty => "dirty",
            SessionState::Closing => "closing",
            SessionState::Closed => "closed",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SessionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "opening" => Ok(SessionState::Opening),
            "clean" => Ok(SessionState::Clean),
            "dirty" => Ok(SessionState::Dirty),
            "closing" => Ok(SessionState::Closing),
            "closed" => Ok(SessionState::Closed),
            _ => Err(format!("Unknown session state: {}", s)),
        }
    }
}
