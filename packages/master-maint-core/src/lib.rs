//! Core editing engine for tabbed master-data maintenance.
//!
//! Provides per-tab edit buffers over committed snapshots, id allocation
//! for new records, single-flight commit coordination, navigation guarding
//! for unsaved work, and the session controller that ties them together.

pub mod buffer;
pub mod commit;
pub mod config;
pub mod error;
pub mod navigation;
pub mod notify;
pub mod persistence;
pub mod record;
pub mod session;

pub use buffer::{EditBufferStore, IdAllocator, VisibleRecords};
pub use commit::{CommitCoordinator, PendingCommit};
pub use config::{EditorConfig, PromptConfig};
pub use error::{EditorError, PersistenceError, Result};
pub use navigation::{
    ConfirmResponse, Confirmation, NavigationGuard, SwitchAttempt, SwitchOutcome, SwitchState,
};
pub use notify::{Notice, Notifier, TracingNotifier};
pub use persistence::{Persistence, TabRecords};
pub use record::{Gender, Record, RecordField, RecordId, Tab, TabId};
pub use session::TabSessionController;
