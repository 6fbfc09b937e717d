use std::sync::Arc;

use crate::buffer::EditBufferStore;
use crate::error::{EditorError, PersistenceError, Result};
use crate::persistence::Persistence;
use crate::record::{Record, TabId};

use super::pending::PendingCommit;

/// Drives saving a tab's edit buffer through the persistence collaborator.
///
/// A commit is split into [`begin`](Self::begin), which freezes the commit
/// set and raises the tab's saving flag, and [`finish`](Self::finish), which
/// reconciles the outcome. [`commit`](Self::commit) runs both around the
/// store call. At most one commit per tab is outstanding at a time.
#[derive(Clone)]
pub struct CommitCoordinator {
    persistence: Arc<dyn Persistence>,
}

impl CommitCoordinator {
    pub fn new(persistence: Arc<dyn Persistence>) -> Self {
        Self { persistence }
    }

    /// Returns the persistence collaborator commits are sent to.
    pub fn persistence(&self) -> &Arc<dyn Persistence> {
        &self.persistence
    }

    /// Freezes the tab's commit set and marks the tab as saving.
    ///
    /// Fails with [`EditorError::CommitInFlight`] without side effects if a
    /// commit for the tab is already outstanding.
    pub fn begin(&self, store: &mut EditBufferStore, tab: &TabId) -> Result<PendingCommit> {
        let pending = store.begin_commit(tab)?;
        tracing::info!(
            "Commit #{} for tab '{}': {} records ({} purged)",
            pending.sequence(),
            tab,
            pending.records().len(),
            pending.purged_ids().count()
        );
        Ok(pending)
    }

    /// Resolves an outstanding commit with the store's answer.
    ///
    /// On success the persisted records become the tab's snapshot and the
    /// dirty flag clears unless the tab was edited while the commit was in
    /// flight. On failure the snapshot, edit buffer, and dirty flag are left
    /// exactly as they were; only the saving flag drops.
    ///
    /// # Returns
    /// `Result<Vec<Record>, EditorError>` containing the new snapshot.
    pub fn finish(
        &self,
        store: &mut EditBufferStore,
        pending: PendingCommit,
        outcome: std::result::Result<Vec<Record>, PersistenceError>,
    ) -> Result<Vec<Record>> {
        match outcome {
            Ok(persisted) => store.reconcile(pending, persisted),
            Err(source) => {
                store.abandon_commit(&pending)?;
                tracing::error!(
                    "Commit #{} for tab '{}' failed: {}",
                    pending.sequence(),
                    pending.tab(),
                    source
                );
                Err(EditorError::SaveFailure {
                    tab: pending.tab().clone(),
                    source,
                })
            }
        }
    }

    /// Commits a tab's edit buffer.
    ///
    /// # Arguments
    /// * `store` - Buffer store owning the tab
    /// * `tab` - Tab to commit
    ///
    /// # Returns
    /// `Result<Vec<Record>, EditorError>` containing the new snapshot.
    ///
    /// Not cancel safe: if the future is dropped while the save is awaited,
    /// the tab stays saving until it is reloaded.
    pub async fn commit(&self, store: &mut EditBufferStore, tab: &TabId) -> Result<Vec<Record>> {
        let pending = self.begin(store, tab)?;
        let outcome = self
            .persistence
            .save_batch(tab, pending.records().to_vec())
            .await;
        self.finish(store, pending, outcome)
    }
}

impl std::fmt::Debug for CommitCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitCoordinator").finish_non_exhaustive()
    }
}
