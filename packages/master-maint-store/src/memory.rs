//! In-process record store.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use master_maint_core::{Persistence, PersistenceError, Record, TabId, TabRecords};

use crate::seed::mock_dataset;

/// Record store held entirely in memory.
///
/// Fetches and saves can be slowed down to mimic a remote backend, and
/// failures can be queued up front.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    /// Committed records per tab
    tabs: Mutex<TabRecords>,
    /// Delay applied to every fetch
    load_latency: Duration,
    /// Delay applied to every save
    save_latency: Duration,
    /// Error returned by the next fetch
    fetch_failure: Mutex<Option<PersistenceError>>,
    /// Errors returned by the next saves, in order
    save_failures: Mutex<VecDeque<PersistenceError>>,
    /// Number of successful saves
    save_count: AtomicUsize,
}

impl MemoryPersistence {
    /// Creates a store holding the given records.
    pub fn new(tabs: TabRecords) -> Self {
        Self {
            tabs: Mutex::new(tabs),
            ..Default::default()
        }
    }

    /// Creates a store holding the demo dataset.
    pub fn seeded() -> Self {
        Self::new(mock_dataset())
    }

    /// Sets the artificial delays for fetch and save.
    pub fn with_latency(mut self, load: Duration, save: Duration) -> Self {
        self.load_latency = load;
        self.save_latency = save;
        self
    }

    /// Makes the next fetch fail with `error`.
    pub fn fail_next_fetch(&self, error: PersistenceError) {
        *self.fetch_failure.lock() = Some(error);
    }

    /// Queues `error` for an upcoming save.
    pub fn fail_next_save(&self, error: PersistenceError) {
        self.save_failures.lock().push_back(error);
    }

    /// Number of saves that have succeeded.
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    /// Committed records of a tab.
    pub fn records(&self, tab: &TabId) -> Vec<Record> {
        self.tabs.lock().get(tab).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl Persistence for MemoryPersistence {
    async fn fetch_all(&self) -> Result<TabRecords, PersistenceError> {
        if !self.load_latency.is_zero() {
            tokio::time::sleep(self.load_latency).await;
        }
        if let Some(error) = self.fetch_failure.lock().take() {
            tracing::warn!("Injected fetch failure: {}", error);
            return Err(error);
        }
        Ok(self.tabs.lock().clone())
    }

    async fn save_batch(
        &self,
        tab: &TabId,
        records: Vec<Record>,
    ) -> Result<Vec<Record>, PersistenceError> {
        if !self.save_latency.is_zero() {
            tokio::time::sleep(self.save_latency).await;
        }
        if let Some(error) = self.save_failures.lock().pop_front() {
            tracing::warn!("Injected save failure for tab '{}': {}", tab, error);
            return Err(error);
        }

        let persisted: Vec<Record> = records
            .into_iter()
            .map(|mut record| {
                record.is_new = false;
                record
            })
            .collect();
        self.tabs.lock().insert(tab.clone(), persisted.clone());
        self.save_count.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("Stored {} records for tab '{}'", persisted.len(), tab);
        Ok(persisted)
    }
}
