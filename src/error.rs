//! Collaborator error types.
//!
//! The simulation itself never fails: a collision is a state transition, bad
//! input is clamped or ignored. Only the outside world (the page, LocalStorage)
//! can fail, and those failures are scoped to a single frame or a single write.

use std::fmt;

use crate::sim::EntityId;

/// A renderer call could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A required page element is missing (e.g. `#game-area`).
    MissingElement {
        /// Element id or selector that was looked up.
        selector: String,
    },

    /// The renderer was asked about an entity it never created.
    UnknownEntity {
        id: EntityId,
    },

    /// The host platform rejected the operation.
    Platform {
        /// Human-readable description from the platform.
        message: String,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::MissingElement { selector } => {
                write!(f, "page element not found: {selector}")
            }
            RenderError::UnknownEntity { id } => {
                write!(f, "renderer has no entity {}", id.0)
            }
            RenderError::Platform { message } => write!(f, "platform error: {message}"),
        }
    }
}

impl std::error::Error for RenderError {}

/// A storage write failed (quota exceeded, storage disabled, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Storage is not available on this platform or in this context.
    Unavailable,

    /// The backend refused the write.
    WriteFailed {
        key: String,
        message: String,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "storage unavailable"),
            StorageError::WriteFailed { key, message } => {
                write!(f, "failed to write {key}: {message}")
            }
        }
    }
}

impl std::error::Error for StorageError {}
