//! Editor error types.

use thiserror::Error;

use crate::record::{RecordId, TabId};

/// Result type for editor operations.
pub type Result<T> = std::result::Result<T, EditorError>;

/// Editor operation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    /// Tab is not part of the configured tab set
    #[error("Tab '{tab}' not found")]
    UnknownTab { tab: TabId },

    /// Tab exists but its records have not been loaded yet
    #[error("Tab '{tab}' has not been loaded")]
    TabNotLoaded { tab: TabId },

    /// Record id not present in the tab's edit buffer
    #[error("Record {id} not found in tab '{tab}'")]
    RecordNotFound { tab: TabId, id: RecordId },

    /// No id above the tab's highest record id is left to hand out
    #[error("Id space exhausted for tab '{tab}'")]
    IdSpaceExhausted { tab: TabId },

    /// A commit for this tab is still outstanding
    #[error("Commit already in flight for tab '{tab}'")]
    CommitInFlight { tab: TabId },

    /// Commit ticket does not match the tab's outstanding commit
    #[error("Stale commit #{sequence} for tab '{tab}'")]
    StaleCommit { tab: TabId, sequence: u64 },

    /// Initial fetch from the persistence collaborator failed
    #[error("Failed to load records: {source}")]
    LoadFailure {
        #[source]
        source: PersistenceError,
    },

    /// Save through the persistence collaborator failed
    #[error("Failed to save tab '{tab}': {source}")]
    SaveFailure {
        tab: TabId,
        #[source]
        source: PersistenceError,
    },

    /// Invalid editor configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors reported by persistence collaborators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistenceError {
    /// I/O error while reading or writing the backing store
    #[error("I/O error: {0}")]
    Io(String),

    /// Transient I/O error that may succeed on retry
    #[error("Transient I/O error: {0}")]
    TransientIo(String),

    /// Backing storage is full
    #[error("Disk full: {0}")]
    DiskFull(String),

    /// Encoding or decoding of records failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored data failed an integrity check
    #[error("Data corruption detected: {0}")]
    DataCorruption(String),

    /// The store refused the request
    #[error("Request rejected: {0}")]
    Rejected(String),
}
