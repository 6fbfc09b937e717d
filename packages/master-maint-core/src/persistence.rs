//! Persistence collaborator interface.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::PersistenceError;
use crate::record::{Record, TabId};

/// Records of every tab, as fetched from a store.
pub type TabRecords = HashMap<TabId, Vec<Record>>;

/// Durable store behind the editor.
///
/// The editor depends only on these two operations; transport, encoding,
/// and retry policy belong to the implementation.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Fetches the committed records of every tab the store knows about.
    async fn fetch_all(&self) -> Result<TabRecords, PersistenceError>;

    /// Persists a tab's commit set, replacing what the store held for it.
    ///
    /// Returns the records as persisted, which become the tab's new snapshot.
    async fn save_batch(
        &self,
        tab: &TabId,
        records: Vec<Record>,
    ) -> Result<Vec<Record>, PersistenceError>;
}
