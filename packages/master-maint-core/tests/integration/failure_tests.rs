use std::time::Duration;

use master_maint_core::{EditorConfig, EditorError, Notice, PersistenceError, RecordField};

use super::helpers::{harness_with, loaded_harness, seed_tabs, tab, visible_ids};

#[tokio::test]
async fn test_load_failure_leaves_tabs_unloaded() {
    let mut h = harness_with(EditorConfig::default(), seed_tabs());
    *h.persistence.fetch_failure.lock() = Some(PersistenceError::Io("offline".to_string()));

    let result = h.session.load_all().await;
    assert!(matches!(result, Err(EditorError::LoadFailure { .. })));
    assert!(!h.session.is_loading());
    assert_eq!(visible_ids(&h.session), Vec::<u64>::new());
    assert!(!h.session.store().is_loaded(&tab("tabA")).unwrap());
    assert!(matches!(
        h.session.add_record(),
        Err(EditorError::TabNotLoaded { .. })
    ));

    let notices = h.notifier.notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].is_error());
    assert!(matches!(notices[0], Notice::LoadFailed { .. }));

    // Retrying after the store recovers
    h.session.load_all().await.unwrap();
    assert_eq!(visible_ids(&h.session), vec![1, 2]);
}

#[tokio::test]
async fn test_missing_tab_loads_empty() {
    let mut tabs = seed_tabs();
    tabs.remove(&tab("tabD"));
    let mut h = harness_with(EditorConfig::default(), tabs);
    h.session.load_all().await.unwrap();

    assert!(h.session.store().is_loaded(&tab("tabD")).unwrap());
    assert_eq!(
        h.session.visible_records_for(&tab("tabD")).unwrap().count(),
        0
    );
}

#[tokio::test]
async fn test_save_failure_keeps_edits_and_allows_retry() {
    let mut h = loaded_harness().await;
    let id = h.session.add_record().unwrap();
    h.persistence
        .save_failures
        .lock()
        .push_back(PersistenceError::Rejected("busy".to_string()));

    let result = h.session.commit().await;
    assert!(matches!(result, Err(EditorError::SaveFailure { .. })));
    assert!(h.session.is_dirty().unwrap());
    assert!(!h.session.is_saving().unwrap());
    assert_eq!(visible_ids(&h.session), vec![1, 2, id]);
    assert!(h.persistence.saves().is_empty());
    assert_eq!(
        h.notifier.notices().last().map(|n| n.to_string()),
        Some("データの保存に失敗しました".to_string())
    );

    h.session.commit().await.unwrap();
    assert!(!h.session.is_dirty().unwrap());
    assert_eq!(h.persistence.saves().len(), 1);
}

#[tokio::test]
async fn test_second_commit_rejected_while_in_flight() {
    let mut h = loaded_harness().await;
    h.session.add_record().unwrap();

    let pending = h.session.begin_commit(&tab("tabA")).unwrap();
    assert!(matches!(
        h.session.begin_commit(&tab("tabA")),
        Err(EditorError::CommitInFlight { .. })
    ));
    // Other tabs commit independently
    let other = h.session.begin_commit(&tab("tabB")).unwrap();

    let records = pending.records().to_vec();
    h.session.finish_commit(pending, Ok(records)).unwrap();
    let records = other.records().to_vec();
    h.session.finish_commit(other, Ok(records)).unwrap();
    assert!(!h.session.is_saving_for(&tab("tabB")).unwrap());
}

#[tokio::test]
async fn test_edits_during_commit_stay_dirty() {
    let mut h = loaded_harness().await;
    h.session.mutate(1, RecordField::Age, "31").unwrap();

    let pending = h.session.begin_commit(&tab("tabA")).unwrap();
    h.session.mutate(2, RecordField::Name, "佐藤桜").unwrap();
    let late = h.session.add_record().unwrap();

    let records = pending.records().to_vec();
    let snapshot = h.session.finish_commit(pending, Ok(records)).unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[1].name, "佐藤花子");

    assert!(h.session.is_dirty().unwrap());
    assert_eq!(h.session.store().record(&tab("tabA"), 2).unwrap().name, "佐藤桜");
    assert_eq!(visible_ids(&h.session), vec![1, 2, late]);
}

#[tokio::test]
async fn test_reload_supersedes_commit_in_flight() {
    let mut h = loaded_harness().await;
    h.session.mutate(1, RecordField::Name, "x").unwrap();
    let pending = h.session.begin_commit(&tab("tabA")).unwrap();

    h.session.load_all().await.unwrap();
    assert!(!h.session.is_saving().unwrap());
    assert!(!h.session.is_dirty().unwrap());

    let records = pending.records().to_vec();
    let result = h.session.finish_commit(pending, Ok(records));
    assert!(matches!(result, Err(EditorError::StaleCommit { .. })));
    assert_eq!(
        h.session.store().record(&tab("tabA"), 1).unwrap().name,
        "山田太郎"
    );
    // No save notice for a stale ticket
    assert!(h.notifier.notices().iter().all(|n| !n.is_error()));
}

#[tokio::test]
async fn test_abandoned_commit_blocks_until_reload() {
    let mut h = loaded_harness().await;
    *h.persistence.stall_saves.lock() = true;
    h.session.mutate(1, RecordField::Name, "x").unwrap();

    let timed_out = tokio::time::timeout(Duration::from_millis(20), h.session.commit()).await;
    assert!(timed_out.is_err());
    assert!(h.session.is_saving().unwrap());
    assert!(!h.session.can_save().unwrap());

    *h.persistence.stall_saves.lock() = false;
    assert!(matches!(
        h.session.commit().await,
        Err(EditorError::CommitInFlight { .. })
    ));

    h.session.load_all().await.unwrap();
    assert!(!h.session.is_saving().unwrap());
    h.session.mutate(1, RecordField::Name, "y").unwrap();
    h.session.commit().await.unwrap();
    assert_eq!(h.persistence.saves().len(), 1);
    assert_eq!(
        h.session.store().record(&tab("tabA"), 1).unwrap().name,
        "y"
    );
}
