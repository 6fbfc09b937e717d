//! Single-flight commit of tab edit buffers.

mod coordinator;
mod pending;

pub use coordinator::CommitCoordinator;
pub use pending::PendingCommit;
