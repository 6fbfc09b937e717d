//! Collaborator doubles shared by the integration suites.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use master_maint_core::{
    ConfirmResponse, Confirmation, EditorConfig, Gender, Notice, Notifier, Persistence,
    PersistenceError, Record, TabId, TabRecords, TabSessionController,
};

/// Persistence double holding tab records in memory.
#[derive(Default)]
pub struct ScriptedPersistence {
    pub tabs: Mutex<TabRecords>,
    pub fetch_failure: Mutex<Option<PersistenceError>>,
    pub save_failures: Mutex<VecDeque<PersistenceError>>,
    pub saves: Mutex<Vec<(TabId, Vec<Record>)>>,
    /// Saves never complete while set
    pub stall_saves: Mutex<bool>,
}

impl ScriptedPersistence {
    pub fn with_tabs(tabs: TabRecords) -> Self {
        Self {
            tabs: Mutex::new(tabs),
            ..Default::default()
        }
    }

    pub fn saves(&self) -> Vec<(TabId, Vec<Record>)> {
        self.saves.lock().clone()
    }
}

#[async_trait]
impl Persistence for ScriptedPersistence {
    async fn fetch_all(&self) -> Result<TabRecords, PersistenceError> {
        if let Some(error) = self.fetch_failure.lock().take() {
            return Err(error);
        }
        Ok(self.tabs.lock().clone())
    }

    async fn save_batch(
        &self,
        tab: &TabId,
        records: Vec<Record>,
    ) -> Result<Vec<Record>, PersistenceError> {
        let stalled = *self.stall_saves.lock();
        if stalled {
            std::future::pending::<()>().await;
        }
        if let Some(error) = self.save_failures.lock().pop_front() {
            return Err(error);
        }
        self.saves.lock().push((tab.clone(), records.clone()));
        self.tabs.lock().insert(tab.clone(), records.clone());
        Ok(records)
    }
}

/// Confirmation double answering from a queue and counting calls.
#[derive(Default)]
pub struct ScriptedConfirmation {
    answers: Mutex<VecDeque<ConfirmResponse>>,
    pub asked: Mutex<Vec<(String, String)>>,
}

impl ScriptedConfirmation {
    pub fn answer(&self, response: ConfirmResponse) {
        self.answers.lock().push_back(response);
    }

    pub fn calls(&self) -> usize {
        self.asked.lock().len()
    }
}

#[async_trait]
impl Confirmation for ScriptedConfirmation {
    async fn ask(&self, title: &str, message: &str) -> ConfirmResponse {
        self.asked
            .lock()
            .push((title.to_string(), message.to_string()));
        // An unscripted dialog behaves like a dismissed one
        self.answers
            .lock()
            .pop_front()
            .unwrap_or(ConfirmResponse::Cancelled)
    }
}

/// Notifier double collecting every notice.
#[derive(Default)]
pub struct CollectingNotifier {
    pub notices: Mutex<Vec<Notice>>,
}

impl CollectingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().push(notice.clone());
    }
}

pub fn tab(id: &str) -> TabId {
    TabId::from(id)
}

/// The four-tab dataset the editor ships with.
pub fn seed_tabs() -> TabRecords {
    let mut tabs = TabRecords::new();
    tabs.insert(
        tab("tabA"),
        vec![
            Record::new(1, "山田太郎", 30, Gender::Male, "東京都新宿区"),
            Record::new(2, "佐藤花子", 25, Gender::Female, "東京都渋谷区"),
        ],
    );
    tabs.insert(
        tab("tabB"),
        vec![
            Record::new(3, "鈴木一郎", 42, Gender::Male, "大阪府大阪市"),
            Record::new(4, "田中美咲", 35, Gender::Female, "京都府京都市"),
        ],
    );
    tabs.insert(
        tab("tabC"),
        vec![
            Record::new(5, "高橋健太", 28, Gender::Male, "神奈川県横浜市"),
            Record::new(6, "伊藤由美", 33, Gender::Female, "埼玉県さいたま市"),
        ],
    );
    tabs.insert(
        tab("tabD"),
        vec![
            Record::new(7, "渡辺隆", 45, Gender::Male, "北海道札幌市"),
            Record::new(8, "小林直子", 27, Gender::Female, "福岡県福岡市"),
        ],
    );
    tabs
}

pub struct Harness {
    pub session: TabSessionController,
    pub persistence: Arc<ScriptedPersistence>,
    pub confirmation: Arc<ScriptedConfirmation>,
    pub notifier: Arc<CollectingNotifier>,
}

/// Builds a session over the seed dataset without loading it.
pub fn harness_with(config: EditorConfig, tabs: TabRecords) -> Harness {
    let persistence = Arc::new(ScriptedPersistence::with_tabs(tabs));
    let confirmation = Arc::new(ScriptedConfirmation::default());
    let notifier = Arc::new(CollectingNotifier::default());
    let session = TabSessionController::new(
        config,
        persistence.clone(),
        confirmation.clone(),
        notifier.clone(),
    )
    .unwrap();
    Harness {
        session,
        persistence,
        confirmation,
        notifier,
    }
}

/// Builds and loads a session over the seed dataset with default config.
pub async fn loaded_harness() -> Harness {
    let mut harness = harness_with(EditorConfig::default(), seed_tabs());
    harness.session.load_all().await.unwrap();
    harness
}

pub fn visible_ids(session: &TabSessionController) -> Vec<u64> {
    session.visible_records().unwrap().map(|r| r.id).collect()
}
