//! Single-file JSON record store.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use master_maint_core::{Persistence, PersistenceError, Record, TabId, TabRecords};

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// On-disk envelope. The checksum covers the serialized `tabs` payload.
#[derive(Debug, Serialize, Deserialize)]
struct DataFile {
    version: u32,
    checksum: u32,
    tabs: BTreeMap<TabId, Vec<Record>>,
}

/// Blocking file access, cloned into `spawn_blocking` tasks.
#[derive(Debug, Clone)]
struct FileStore {
    path: PathBuf,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl FileStore {
    /// Runs `attempt` again while it fails with a transient error, up to
    /// `max_retries` extra times. Sleeps between attempts; blocking threads only.
    fn retrying<T>(
        &self,
        action: &str,
        attempt: impl Fn() -> Result<T, PersistenceError>,
    ) -> Result<T, PersistenceError> {
        let mut retries = 0;
        loop {
            match attempt() {
                Err(PersistenceError::TransientIo(msg)) if retries < self.max_retries => {
                    retries += 1;
                    tracing::warn!(
                        "Retrying {} of '{}' ({}/{}): {}",
                        action,
                        self.path.display(),
                        retries,
                        self.max_retries,
                        msg
                    );
                    std::thread::sleep(std::time::Duration::from_millis(self.retry_delay_ms));
                }
                result => return result,
            }
        }
    }

    fn read(&self) -> Result<Option<TabRecords>, PersistenceError> {
        self.retrying("read", || self.read_internal())
    }

    fn read_internal(&self) -> Result<Option<TabRecords>, PersistenceError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .map_err(file_error("Failed to read data file"))?;
        let file: DataFile = serde_json::from_str(&contents).map_err(|e| {
            PersistenceError::Serialization(format!("Failed to parse data file: {}", e))
        })?;

        if file.version != FORMAT_VERSION {
            return Err(PersistenceError::Serialization(format!(
                "Unsupported data file version: {}",
                file.version
            )));
        }

        let actual = payload_checksum(&file.tabs)?;
        if actual != file.checksum {
            return Err(PersistenceError::DataCorruption(format!(
                "Checksum mismatch for '{}': expected {:08x}, got {:08x}",
                self.path.display(),
                file.checksum,
                actual
            )));
        }

        Ok(Some(file.tabs.into_iter().collect()))
    }

    fn write(&self, tabs: &TabRecords) -> Result<(), PersistenceError> {
        self.retrying("write", || self.write_internal(tabs))
    }

    fn write_internal(&self, tabs: &TabRecords) -> Result<(), PersistenceError> {
        let tabs: BTreeMap<TabId, Vec<Record>> = tabs
            .iter()
            .map(|(tab, records)| (tab.clone(), records.clone()))
            .collect();
        let file = DataFile {
            version: FORMAT_VERSION,
            checksum: payload_checksum(&tabs)?,
            tabs,
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(file_error("Failed to create data directory"))?;
        }

        // Write to temporary file first
        let temp_path = self.temp_path();
        let mut temp = File::create(&temp_path)
            .map_err(file_error("Failed to create temp file"))?;
        temp.write_all(json.as_bytes())
            .map_err(file_error("Failed to write data file"))?;
        temp.sync_all()
            .map_err(file_error("Failed to sync data file"))?;

        // Atomic rename
        fs::rename(&temp_path, &self.path)
            .map_err(file_error("Failed to rename data file"))?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Maps a filesystem error to a persistence error; full disks and
/// interrupted calls get their own variants so callers can tell them apart.
fn file_error(context: &'static str) -> impl Fn(io::Error) -> PersistenceError {
    move |e| {
        let msg = format!("{}: {}", context, e);
        match e.kind() {
            ErrorKind::StorageFull => PersistenceError::DiskFull(msg),
            ErrorKind::Interrupted | ErrorKind::TimedOut | ErrorKind::WouldBlock => {
                PersistenceError::TransientIo(msg)
            }
            _ => PersistenceError::Io(msg),
        }
    }
}

fn payload_checksum(tabs: &BTreeMap<TabId, Vec<Record>>) -> Result<u32, PersistenceError> {
    let bytes =
        serde_json::to_vec(tabs).map_err(|e| PersistenceError::Serialization(e.to_string()))?;
    let mut hasher = Hasher::new();
    hasher.update(&bytes);
    Ok(hasher.finalize())
}

/// Record store keeping every tab in one JSON file.
///
/// Writes go to a temporary file that is synced and then renamed over the
/// data file, so a crash never leaves a half-written file behind. Saves are
/// serialized so concurrent commits of different tabs cannot lose each
/// other's rows.
#[derive(Debug)]
pub struct JsonFilePersistence {
    store: FileStore,
    /// Records written when the data file does not exist yet
    seed: Option<TabRecords>,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFilePersistence {
    /// Creates a store backed by the file at `path`.
    ///
    /// The file is not touched until the first fetch or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: FileStore {
                path: path.into(),
                max_retries: 3,
                retry_delay_ms: 100,
            },
            seed: None,
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Writes `seed` on first fetch if the data file is missing.
    pub fn with_seed(mut self, seed: TabRecords) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets how often transient I/O errors are retried, and the pause
    /// between attempts.
    pub fn with_retry(mut self, max_retries: u32, retry_delay_ms: u64) -> Self {
        self.store.max_retries = max_retries;
        self.store.retry_delay_ms = retry_delay_ms;
        self
    }

    pub fn path(&self) -> &Path {
        &self.store.path
    }

    async fn read(&self) -> Result<Option<TabRecords>, PersistenceError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.read())
            .await
            .map_err(|e| PersistenceError::Io(format!("Read task failed: {}", e)))?
    }

    async fn write(&self, tabs: TabRecords) -> Result<(), PersistenceError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.write(&tabs))
            .await
            .map_err(|e| PersistenceError::Io(format!("Write task failed: {}", e)))?
    }
}

#[async_trait]
impl Persistence for JsonFilePersistence {
    async fn fetch_all(&self) -> Result<TabRecords, PersistenceError> {
        if let Some(tabs) = self.read().await? {
            tracing::debug!("Read {} tabs from {}", tabs.len(), self.path().display());
            return Ok(tabs);
        }

        let _guard = self.write_lock.lock().await;
        // Another fetch may have seeded the file meanwhile
        if let Some(tabs) = self.read().await? {
            return Ok(tabs);
        }
        match &self.seed {
            Some(seed) => {
                self.write(seed.clone()).await?;
                tracing::info!("Seeded {} with {} tabs", self.path().display(), seed.len());
                Ok(seed.clone())
            }
            None => Ok(TabRecords::new()),
        }
    }

    async fn save_batch(
        &self,
        tab: &TabId,
        records: Vec<Record>,
    ) -> Result<Vec<Record>, PersistenceError> {
        let _guard = self.write_lock.lock().await;
        let mut tabs = match self.read().await? {
            Some(tabs) => tabs,
            None => self.seed.clone().unwrap_or_default(),
        };

        let persisted: Vec<Record> = records
            .into_iter()
            .map(|mut record| {
                record.is_new = false;
                record
            })
            .collect();
        tabs.insert(tab.clone(), persisted.clone());
        self.write(tabs).await?;
        tracing::info!(
            "Wrote {} records for tab '{}' to {}",
            persisted.len(),
            tab,
            self.path().display()
        );
        Ok(persisted)
    }
}
