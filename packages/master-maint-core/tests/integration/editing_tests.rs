use master_maint_core::{EditorConfig, Gender, Notice, RecordField};

use super::helpers::{harness_with, loaded_harness, seed_tabs, tab, visible_ids};

#[tokio::test]
async fn test_add_then_delete_never_reaches_persistence() {
    let mut h = loaded_harness().await;

    let id = h.session.add_record().unwrap();
    assert_eq!(id, 3);
    assert_eq!(visible_ids(&h.session), vec![1, 2, 3]);
    assert!(h.session.is_dirty().unwrap());

    h.session.mark_deleted(id).unwrap();
    assert_eq!(visible_ids(&h.session), vec![1, 2]);
    assert!(h.session.is_dirty().unwrap());

    let snapshot = h.session.commit().await.unwrap();
    let ids: Vec<u64> = snapshot.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(!h.session.is_dirty().unwrap());

    let saves = h.persistence.saves();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].0, tab("tabA"));
    assert!(saves[0].1.iter().all(|r| r.id != 3));
}

#[tokio::test]
async fn test_non_numeric_age_becomes_zero() {
    let mut h = loaded_harness().await;
    h.session.request_switch(&tab("tabB")).await.unwrap();

    h.session.mutate(3, RecordField::Age, "abc").unwrap();
    let record = h.session.store().record(&tab("tabB"), 3).unwrap();
    assert_eq!(record.age, 0);
    assert!(h.session.is_dirty().unwrap());

    h.session.mutate(4, RecordField::Age, "41歳").unwrap();
    assert_eq!(h.session.store().record(&tab("tabB"), 4).unwrap().age, 41);
}

#[tokio::test]
async fn test_soft_deleted_record_is_committed_and_stays_visible() {
    let mut h = loaded_harness().await;

    h.session.mark_deleted(1).unwrap();
    assert_eq!(visible_ids(&h.session), vec![1, 2]);

    h.session.commit().await.unwrap();
    let saved = &h.persistence.saves()[0].1;
    let record = saved.iter().find(|r| r.id == 1).unwrap();
    assert!(record.is_deleted);

    // Still listed after the commit, and can be brought back
    assert_eq!(visible_ids(&h.session), vec![1, 2]);
    assert!(!h.session.toggle_deleted(1).unwrap());
    assert!(h.session.is_dirty().unwrap());
}

#[tokio::test]
async fn test_new_record_is_promoted_on_commit() {
    let mut h = loaded_harness().await;

    let id = h.session.add_record().unwrap();
    h.session.mutate(id, RecordField::Name, "木村").unwrap();
    h.session.mutate(id, RecordField::Gender, "女性").unwrap();
    assert!(h.session.store().record(&tab("tabA"), id).unwrap().is_new);

    h.session.commit().await.unwrap();
    let record = h.session.store().record(&tab("tabA"), id).unwrap();
    assert!(!record.is_new);
    assert_eq!(record.name, "木村");
    assert_eq!(record.gender, Gender::Female);

    // A committed record is soft-deleted rather than dropped
    h.session.mark_deleted(id).unwrap();
    assert!(visible_ids(&h.session).contains(&id));
}

#[tokio::test]
async fn test_placeholder_defaults() {
    let mut h = loaded_harness().await;
    let id = h.session.add_record().unwrap();
    let record = h.session.store().record(&tab("tabA"), id).unwrap();
    assert_eq!(record.name, format!("新規ユーザー_{}", id));
    assert_eq!(record.age, 20);
    assert_eq!(record.gender, Gender::Unset);
    assert_eq!(record.address, "");
    assert!(record.is_new);
    assert!(!record.is_deleted);
}

#[tokio::test]
async fn test_configured_id_floor() {
    let config = EditorConfig {
        min_bootstrap_id: 100,
        ..Default::default()
    };
    let mut h = harness_with(config, seed_tabs());
    h.session.load_all().await.unwrap();

    assert_eq!(h.session.add_record().unwrap(), 100);
    assert_eq!(h.session.add_record().unwrap(), 101);
    assert_eq!(visible_ids(&h.session), vec![1, 2, 100, 101]);
}

#[tokio::test]
async fn test_ids_never_reused_after_purge() {
    let mut h = loaded_harness().await;
    let first = h.session.add_record().unwrap();
    h.session.mark_deleted(first).unwrap();
    h.session.commit().await.unwrap();

    let second = h.session.add_record().unwrap();
    assert!(second > first);
}

#[tokio::test]
async fn test_edit_notices() {
    let mut h = loaded_harness().await;
    let id = h.session.add_record().unwrap();
    h.session.toggle_deleted(id).unwrap();
    h.session.toggle_deleted(id).unwrap();
    h.session.commit().await.unwrap();

    let messages: Vec<String> = h.notifier.notices().iter().map(|n| n.to_string()).collect();
    assert_eq!(
        messages,
        vec![
            "新しいレコードを追加しました（保存するまで反映されません）".to_string(),
            format!("ID: {} を削除しました（保存するまで反映されません）", id),
            format!("ID: {} の削除を解除しました（保存するまで反映されません）", id),
            "タブ A のデータを保存しました".to_string(),
        ]
    );
    assert!(matches!(
        h.notifier.notices()[0],
        Notice::RecordAdded { ref tab, .. } if tab.as_str() == "tabA"
    ));
}

#[tokio::test]
async fn test_can_save_tracks_dirty_flag() {
    let mut h = loaded_harness().await;
    assert!(!h.session.can_save().unwrap());

    h.session.mutate(2, RecordField::Address, "東京都港区").unwrap();
    assert!(h.session.can_save().unwrap());

    h.session.commit().await.unwrap();
    assert!(!h.session.can_save().unwrap());
    assert_eq!(
        h.session.store().record(&tab("tabA"), 2).unwrap().address,
        "東京都港区"
    );
}
