//! Cropdesk Recent Files
//!
//! A bounded, duplicate-free list of recently opened documents, most recent
//! first. Every mutation is written through to an `MruStore`; the in-memory
//! list stays authoritative when a write fails.

mod error;
mod registry;
mod store;

pub use error::RecentError;
pub use registry::{MruRegistry, DEFAULT_CAPACITY};
pub use store::{DatabaseMruStore, MemoryMruStore, MruStore};

pub type Result<T> = std::result::Result<T, RecentError>;
