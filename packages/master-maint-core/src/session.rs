//! Session controller owning the active tab selection.

use std::sync::Arc;

use crate::buffer::{EditBufferStore, VisibleRecords};
use crate::commit::{CommitCoordinator, PendingCommit};
use crate::config::EditorConfig;
use crate::error::{EditorError, PersistenceError, Result};
use crate::navigation::{ConfirmResponse, Confirmation, NavigationGuard, SwitchAttempt, SwitchOutcome};
use crate::notify::{Notice, Notifier};
use crate::persistence::{Persistence, TabRecords};
use crate::record::{Record, RecordField, RecordId, Tab, TabId};

/// Composes the buffer store, commit coordinator, and navigation guard
/// around a single active tab.
///
/// This is the only place that knows which tab is active, and the active tab
/// only changes through an approved switch. Every edit is dispatched against
/// the active tab's current buffer.
pub struct TabSessionController {
    config: EditorConfig,
    store: EditBufferStore,
    commits: CommitCoordinator,
    guard: NavigationGuard,
    confirmation: Arc<dyn Confirmation>,
    notifier: Arc<dyn Notifier>,
    active: TabId,
    loading: bool,
}

impl TabSessionController {
    /// Creates a session with no tabs loaded yet.
    ///
    /// # Arguments
    /// * `config` - Tab set, id floor, and prompt
    /// * `persistence` - Store records are fetched from and committed to
    /// * `confirmation` - Dialog asked before leaving unsaved edits
    /// * `notifier` - Sink for user-facing notices
    pub fn new(
        config: EditorConfig,
        persistence: Arc<dyn Persistence>,
        confirmation: Arc<dyn Confirmation>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        config.validate()?;
        let active = config.initial_tab()?.id.clone();
        Ok(Self {
            store: EditBufferStore::from_config(&config),
            commits: CommitCoordinator::new(persistence),
            guard: NavigationGuard::new(config.unsaved_prompt.clone()),
            confirmation,
            notifier,
            active,
            loading: false,
            config,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Tabs in display order.
    pub fn tabs(&self) -> &[Tab] {
        &self.config.tabs
    }

    pub fn active_tab(&self) -> &TabId {
        &self.active
    }

    /// Returns the active tab's definition.
    pub fn active(&self) -> Result<&Tab> {
        self.config.tab(&self.active)
    }

    /// Read-only access to every tab's buffers.
    pub fn store(&self) -> &EditBufferStore {
        &self.store
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Marks the session as loading. Pair with [`finish_load`](Self::finish_load).
    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// Applies the result of a fetch from the persistence collaborator.
    ///
    /// On success every configured tab is loaded (tabs the store does not
    /// know come up empty). On failure the error is logged and surfaced,
    /// loading clears, and the tabs stay unloaded.
    pub fn finish_load(
        &mut self,
        fetched: std::result::Result<TabRecords, PersistenceError>,
    ) -> Result<()> {
        self.loading = false;
        let mut fetched = match fetched {
            Ok(fetched) => fetched,
            Err(source) => {
                let error = EditorError::LoadFailure { source };
                tracing::error!("Load failed: {}", error);
                self.notifier.notify(&Notice::LoadFailed {
                    error: error.clone(),
                });
                return Err(error);
            }
        };

        let tab_ids: Vec<TabId> = self.config.tabs.iter().map(|tab| tab.id.clone()).collect();
        for tab in &tab_ids {
            let records = fetched.remove(tab).unwrap_or_default();
            self.store.load(tab, records)?;
        }
        for unknown in fetched.keys() {
            tracing::warn!("Ignoring records for unconfigured tab '{}'", unknown);
        }
        tracing::info!("Loaded {} tabs", tab_ids.len());
        Ok(())
    }

    /// Fetches every tab's records, replacing any buffered edits.
    pub async fn load_all(&mut self) -> Result<()> {
        self.begin_load();
        let persistence = Arc::clone(self.commits.persistence());
        let fetched = persistence.fetch_all().await;
        self.finish_load(fetched)
    }

    /// Displayable records of the active tab.
    pub fn visible_records(&self) -> Result<VisibleRecords<'_>> {
        self.store.visible_records(&self.active)
    }

    /// Displayable records of any tab.
    pub fn visible_records_for(&self, tab: &TabId) -> Result<VisibleRecords<'_>> {
        self.store.visible_records(tab)
    }

    pub fn is_dirty(&self) -> Result<bool> {
        self.store.is_dirty(&self.active)
    }

    pub fn is_dirty_for(&self, tab: &TabId) -> Result<bool> {
        self.store.is_dirty(tab)
    }

    pub fn is_saving(&self) -> Result<bool> {
        self.store.is_saving(&self.active)
    }

    pub fn is_saving_for(&self, tab: &TabId) -> Result<bool> {
        self.store.is_saving(tab)
    }

    /// Whether a save of the active tab should be offered: it has unsaved
    /// edits and no commit is outstanding.
    pub fn can_save(&self) -> Result<bool> {
        Ok(self.is_dirty()? && !self.is_saving()?)
    }

    /// Replaces a field of a record in the active tab from raw input.
    pub fn mutate(&mut self, id: RecordId, field: RecordField, raw: &str) -> Result<()> {
        self.store.mutate(&self.active, id, field, raw)
    }

    /// Adds a placeholder record to the active tab.
    pub fn add_record(&mut self) -> Result<RecordId> {
        let id = self.store.add_record(&self.active)?;
        self.notifier.notify(&Notice::RecordAdded {
            tab: self.active.clone(),
            id,
        });
        Ok(id)
    }

    /// Soft-deletes a record in the active tab.
    pub fn mark_deleted(&mut self, id: RecordId) -> Result<()> {
        self.store.mark_deleted(&self.active, id)?;
        self.notify_delete(id, true);
        Ok(())
    }

    /// Clears the soft-delete mark on a record in the active tab.
    pub fn restore(&mut self, id: RecordId) -> Result<()> {
        self.store.restore(&self.active, id)?;
        self.notify_delete(id, false);
        Ok(())
    }

    /// Flips the soft-delete mark on a record in the active tab.
    pub fn toggle_deleted(&mut self, id: RecordId) -> Result<bool> {
        let deleted = self.store.toggle_deleted(&self.active, id)?;
        self.notify_delete(id, deleted);
        Ok(deleted)
    }

    fn notify_delete(&self, id: RecordId, deleted: bool) {
        self.notifier.notify(&Notice::DeleteToggled {
            tab: self.active.clone(),
            id,
            deleted,
        });
    }

    /// Issues a commit for a tab, freezing its commit set.
    pub fn begin_commit(&mut self, tab: &TabId) -> Result<PendingCommit> {
        self.commits.begin(&mut self.store, tab)
    }

    /// Resolves a commit issued with [`begin_commit`](Self::begin_commit)
    /// and tells the user how it went.
    pub fn finish_commit(
        &mut self,
        pending: PendingCommit,
        outcome: std::result::Result<Vec<Record>, PersistenceError>,
    ) -> Result<Vec<Record>> {
        let tab = pending.tab().clone();
        match self.commits.finish(&mut self.store, pending, outcome) {
            Ok(snapshot) => {
                let heading = self.config.tab(&tab)?.heading();
                self.notifier.notify(&Notice::Saved { tab, heading });
                Ok(snapshot)
            }
            Err(error) => {
                if matches!(error, EditorError::SaveFailure { .. }) {
                    self.notifier.notify(&Notice::SaveFailed {
                        tab,
                        error: error.clone(),
                    });
                }
                Err(error)
            }
        }
    }

    /// Commits a tab through the persistence collaborator.
    ///
    /// Dropping the returned future before it completes leaves the tab
    /// saving: further commits fail with `CommitInFlight` until the tab is
    /// reloaded. Use [`TabSessionController::begin_commit`] and
    /// [`TabSessionController::finish_commit`] to drive a save that may be
    /// cancelled.
    pub async fn commit_tab(&mut self, tab: &TabId) -> Result<Vec<Record>> {
        let pending = self.begin_commit(tab)?;
        let persistence = Arc::clone(self.commits.persistence());
        let outcome = persistence
            .save_batch(tab, pending.records().to_vec())
            .await;
        self.finish_commit(pending, outcome)
    }

    /// Commits the active tab.
    pub async fn commit(&mut self) -> Result<Vec<Record>> {
        let tab = self.active.clone();
        self.commit_tab(&tab).await
    }

    /// Starts switching the active tab to `to`.
    pub fn begin_switch(&self, to: &TabId) -> Result<SwitchAttempt> {
        self.guard.begin(&self.store, &self.active, to)
    }

    /// Settles a switch attempt and applies it.
    ///
    /// `response` is only consulted for pending attempts. An attempt whose
    /// origin is no longer the active tab is aborted. An attempt that began
    /// on a clean tab is treated as pending if the tab was edited since.
    pub fn resolve_switch(
        &mut self,
        attempt: SwitchAttempt,
        response: ConfirmResponse,
    ) -> SwitchOutcome {
        if attempt.from() != &self.active {
            tracing::warn!(
                "Discarding switch from '{}', active tab is now '{}'",
                attempt.from(),
                self.active
            );
            return SwitchOutcome::Aborted;
        }

        let edited_since = attempt.outcome() == Some(SwitchOutcome::Switched)
            && attempt.from() != attempt.to()
            && self.store.is_dirty(attempt.from()).unwrap_or(false);
        let attempt = if edited_since {
            tracing::debug!(
                "Tab '{}' was edited after the switch began, using the answer",
                attempt.from()
            );
            attempt.reopen()
        } else {
            attempt
        };

        let to = attempt.to().clone();
        let outcome = attempt.resolve(response);
        self.apply_switch(to, outcome);
        outcome
    }

    /// Switches the active tab, asking for confirmation if it has unsaved
    /// edits. The left tab's buffer is kept as is.
    pub async fn request_switch(&mut self, to: &TabId) -> Result<SwitchOutcome> {
        let outcome = self
            .guard
            .request_switch(&self.store, &self.active, to, self.confirmation.as_ref())
            .await?;
        self.apply_switch(to.clone(), outcome);
        Ok(outcome)
    }

    fn apply_switch(&mut self, to: TabId, outcome: SwitchOutcome) {
        match outcome {
            SwitchOutcome::Switched => {
                if to != self.active {
                    tracing::info!("Active tab '{}' -> '{}'", self.active, to);
                }
                self.active = to;
            }
            SwitchOutcome::Aborted => {
                tracing::info!("Stayed on tab '{}', switch to '{}' cancelled", self.active, to);
            }
        }
    }
}

impl std::fmt::Debug for TabSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabSessionController")
            .field("active", &self.active)
            .field("loading", &self.loading)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
