use master_maint_core::{ConfirmResponse, EditorError, PromptConfig, RecordField, SwitchOutcome};

use super::helpers::{loaded_harness, tab, visible_ids};

#[tokio::test]
async fn test_cancelled_switch_keeps_tab_and_buffer() {
    let mut h = loaded_harness().await;
    h.session.mutate(1, RecordField::Name, "山田次郎").unwrap();
    h.confirmation.answer(ConfirmResponse::Cancelled);

    let outcome = h.session.request_switch(&tab("tabB")).await.unwrap();
    assert_eq!(outcome, SwitchOutcome::Aborted);
    assert_eq!(h.session.active_tab(), &tab("tabA"));
    assert!(h.session.is_dirty().unwrap());
    assert_eq!(
        h.session.store().record(&tab("tabA"), 1).unwrap().name,
        "山田次郎"
    );

    let asked = h.confirmation.asked.lock().clone();
    let prompt = PromptConfig::default();
    assert_eq!(asked, vec![(prompt.title, prompt.message)]);
}

#[tokio::test]
async fn test_confirmed_switch_preserves_edits_for_return() {
    let mut h = loaded_harness().await;
    let id = h.session.add_record().unwrap();
    h.confirmation.answer(ConfirmResponse::Confirmed);

    let outcome = h.session.request_switch(&tab("tabB")).await.unwrap();
    assert_eq!(outcome, SwitchOutcome::Switched);
    assert_eq!(h.session.active_tab(), &tab("tabB"));
    assert_eq!(visible_ids(&h.session), vec![3, 4]);
    assert!(!h.session.is_dirty().unwrap());

    // tabB is clean, so going back needs no dialog
    let outcome = h.session.request_switch(&tab("tabA")).await.unwrap();
    assert_eq!(outcome, SwitchOutcome::Switched);
    assert_eq!(h.confirmation.calls(), 1);
    assert_eq!(visible_ids(&h.session), vec![1, 2, id]);
    assert!(h.session.is_dirty().unwrap());
}

#[tokio::test]
async fn test_clean_switch_never_asks() {
    let mut h = loaded_harness().await;
    for target in ["tabB", "tabC", "tabD", "tabA"] {
        let outcome = h.session.request_switch(&tab(target)).await.unwrap();
        assert_eq!(outcome, SwitchOutcome::Switched);
        assert_eq!(h.session.active_tab(), &tab(target));
    }
    assert_eq!(h.confirmation.calls(), 0);
}

#[tokio::test]
async fn test_switch_to_unknown_tab_fails() {
    let mut h = loaded_harness().await;
    let result = h.session.request_switch(&tab("tabZ")).await;
    assert!(matches!(result, Err(EditorError::UnknownTab { .. })));
    assert_eq!(h.session.active_tab(), &tab("tabA"));
}

#[tokio::test]
async fn test_two_phase_switch() {
    let mut h = loaded_harness().await;
    h.session.mark_deleted(2).unwrap();

    let attempt = h.session.begin_switch(&tab("tabC")).unwrap();
    assert!(attempt.is_pending());
    // Edits keep flowing to the active tab while the dialog is open
    h.session.mutate(1, RecordField::Age, "31").unwrap();

    let outcome = h.session.resolve_switch(attempt, ConfirmResponse::Confirmed);
    assert_eq!(outcome, SwitchOutcome::Switched);
    assert_eq!(h.session.active_tab(), &tab("tabC"));
    assert_eq!(h.session.store().record(&tab("tabA"), 1).unwrap().age, 31);
}

#[tokio::test]
async fn test_switch_begun_clean_then_edited_uses_answer() {
    let mut h = loaded_harness().await;
    let attempt = h.session.begin_switch(&tab("tabB")).unwrap();
    assert!(!attempt.is_pending());

    h.session.mutate(1, RecordField::Name, "x").unwrap();
    let outcome = h.session.resolve_switch(attempt, ConfirmResponse::Cancelled);
    assert_eq!(outcome, SwitchOutcome::Aborted);
    assert_eq!(h.session.active_tab(), &tab("tabA"));
    assert!(h.session.is_dirty().unwrap());

    let attempt = h.session.begin_switch(&tab("tabB")).unwrap();
    h.session.restore(1).unwrap();
    let outcome = h.session.resolve_switch(attempt, ConfirmResponse::Confirmed);
    assert_eq!(outcome, SwitchOutcome::Switched);
    assert_eq!(h.session.active_tab(), &tab("tabB"));
}

#[tokio::test]
async fn test_outdated_switch_attempt_is_discarded() {
    let mut h = loaded_harness().await;
    h.session.add_record().unwrap();

    let stale = h.session.begin_switch(&tab("tabB")).unwrap();
    let fresh = h.session.begin_switch(&tab("tabC")).unwrap();
    assert_eq!(
        h.session.resolve_switch(fresh, ConfirmResponse::Confirmed),
        SwitchOutcome::Switched
    );

    assert_eq!(
        h.session.resolve_switch(stale, ConfirmResponse::Confirmed),
        SwitchOutcome::Aborted
    );
    assert_eq!(h.session.active_tab(), &tab("tabC"));
}

#[tokio::test]
async fn test_switch_while_commit_in_flight() {
    let mut h = loaded_harness().await;
    h.session.mutate(1, RecordField::Name, "山田花子").unwrap();

    let pending = h.session.begin_commit(&tab("tabA")).unwrap();
    assert!(h.session.is_saving().unwrap());
    assert!(!h.session.can_save().unwrap());

    // Still dirty until the commit resolves
    h.confirmation.answer(ConfirmResponse::Confirmed);
    let outcome = h.session.request_switch(&tab("tabB")).await.unwrap();
    assert_eq!(outcome, SwitchOutcome::Switched);

    let records = pending.records().to_vec();
    h.session.finish_commit(pending, Ok(records)).unwrap();
    assert!(!h.session.is_dirty_for(&tab("tabA")).unwrap());
    assert!(!h.session.is_saving_for(&tab("tabA")).unwrap());
    assert_eq!(h.session.active_tab(), &tab("tabB"));
}
