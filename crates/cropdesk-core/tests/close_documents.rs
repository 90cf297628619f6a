mod common;

use common::{Harness, UiEvent};
use cropdesk_core::{CoreError, DocumentError, GroupId, MessageLevel, SaveChoice, SessionState};

#[test]
fn test_close_clean_session_without_asking() {
    let mut h = Harness::new();
    let wheat = h.write("wheat.sim", "sow wheat");
    h.manager.open_file(&wheat, GroupId::Primary).unwrap();

    assert!(h.manager.close_session(GroupId::Primary, 0).unwrap());

    assert!(h.manager.group(GroupId::Primary).is_empty());
    assert!(h.codec.doc(0).is_detached());
    assert!(h.ui.prompts().is_empty());
    // Closing never touches the recent list
    assert_eq!(h.manager.recent_files(), vec![wheat]);
}

#[test]
fn test_cancel_keeps_dirty_session_open() {
    let mut h = Harness::new();
    let wheat = h.write("wheat.sim", "sow wheat");
    let id = h.manager.open_file(&wheat, GroupId::Primary).unwrap();
    h.codec.doc(0).edit();
    h.ui.answer(&[SaveChoice::Cancel]);

    assert!(!h.manager.close_session(GroupId::Primary, 0).unwrap());

    assert_eq!(h.ui.prompts(), vec!["wheat.sim".to_string()]);
    assert_eq!(h.manager.session(id).unwrap().state(), SessionState::Dirty);
    assert!(!h.codec.doc(0).is_detached());
}

#[test]
fn test_save_then_close() {
    let mut h = Harness::new();
    let wheat = h.write("wheat.sim", "sow wheat");
    h.manager.open_file(&wheat, GroupId::Primary).unwrap();
    let doc = h.codec.doc(0);
    doc.edit();
    h.ui.answer(&[SaveChoice::Save]);

    assert!(h.manager.close_session(GroupId::Primary, 0).unwrap());

    assert_eq!(*doc.saved_to.lock(), vec![wheat]);
    assert!(doc.is_detached());
}

#[test]
fn test_discard_then_close() {
    let mut h = Harness::new();
    let wheat = h.write("wheat.sim", "sow wheat");
    h.manager.open_file(&wheat, GroupId::Primary).unwrap();
    let doc = h.codec.doc(0);
    doc.edit();
    h.ui.answer(&[SaveChoice::Discard]);

    assert!(h.manager.close_session(GroupId::Primary, 0).unwrap());

    assert!(doc.saved_to.lock().is_empty());
    assert!(doc.is_detached());
}

#[test]
fn test_failed_save_keeps_session_open() {
    let mut h = Harness::new();
    let wheat = h.write("wheat.sim", "sow wheat");
    let id = h.manager.open_file(&wheat, GroupId::Primary).unwrap();
    let doc = h.codec.doc(0);
    doc.edit();
    doc.fail_save.store(true, std::sync::atomic::Ordering::SeqCst);
    h.ui.answer(&[SaveChoice::Save]);

    assert!(!h.manager.close_session(GroupId::Primary, 0).unwrap());

    assert_eq!(h.ui.messages(MessageLevel::Error).len(), 1);
    assert_eq!(h.manager.session(id).unwrap().state(), SessionState::Dirty);
}

#[test]
fn test_memory_document_asks_for_file_name() {
    let mut h = Harness::new();
    h.manager
        .open_from_memory("Untitled", "sow oats", GroupId::Primary)
        .unwrap();
    let doc = h.codec.doc(0);
    doc.edit();
    let target = h.root.join("oats.sim");
    *h.ui.save_name.lock() = Some(target.clone());
    h.ui.answer(&[SaveChoice::Save]);

    assert!(h.manager.close_session(GroupId::Primary, 0).unwrap());

    assert!(h.ui.events().contains(&UiEvent::AskSaveName));
    assert_eq!(*doc.saved_to.lock(), vec![target]);
}

#[test]
fn test_memory_document_save_dialog_cancelled() {
    let mut h = Harness::new();
    h.manager
        .open_from_memory("Untitled", "sow oats", GroupId::Primary)
        .unwrap();
    h.codec.doc(0).edit();
    h.ui.answer(&[SaveChoice::Save]);

    assert!(!h.manager.close_session(GroupId::Primary, 0).unwrap());
    assert_eq!(h.manager.group(GroupId::Primary).len(), 1);
}

#[test]
fn test_close_index_out_of_range() {
    let mut h = Harness::new();

    let err = h.manager.close_session(GroupId::Secondary, 3).unwrap_err();

    assert!(matches!(
        err,
        CoreError::Document(DocumentError::IndexOutOfRange { index: 3, len: 0 })
    ));
    assert!(h.ui.messages(MessageLevel::Error).is_empty());
}

#[test]
fn test_request_close_removes_tab() {
    let mut h = Harness::new();
    let wheat = h.write("wheat.sim", "sow wheat");
    let barley = h.write("barley.sim", "sow barley");
    h.manager.open_file(&wheat, GroupId::Secondary).unwrap();
    let id = h.manager.open_file(&barley, GroupId::Secondary).unwrap();

    assert!(h.manager.request_close(id).unwrap());

    assert!(h
        .ui
        .events()
        .contains(&UiEvent::RemoveTab(GroupId::Secondary, 1)));
    assert!(h.manager.session(id).is_none());
    assert!(matches!(
        h.manager.request_close(id),
        Err(CoreError::SessionNotFound(_))
    ));
}

#[test]
fn test_close_all_asks_every_session_once() {
    let mut h = Harness::new();
    let wheat = h.write("wheat.sim", "sow wheat");
    let barley = h.write("barley.sim", "sow barley");
    let maize = h.write("maize.sim", "sow maize");
    h.manager.open_file(&wheat, GroupId::Primary).unwrap();
    h.manager.open_file(&barley, GroupId::Primary).unwrap();
    h.manager.open_file(&maize, GroupId::Secondary).unwrap();
    for n in 0..3 {
        h.codec.doc(n).edit();
    }
    h.ui
        .answer(&[SaveChoice::Cancel, SaveChoice::Discard, SaveChoice::Discard]);

    assert!(!h.manager.close_all());

    assert_eq!(
        h.ui.prompts(),
        vec![
            "wheat.sim".to_string(),
            "barley.sim".to_string(),
            "maize.sim".to_string()
        ]
    );
    assert_eq!(h.manager.session_count(), 3);
    for n in 0..3 {
        assert!(!h.codec.doc(n).is_detached());
    }
    for group in GroupId::ALL {
        for session in h.manager.group(group).iter() {
            assert!(session.state().is_open());
        }
    }
}

#[test]
fn test_close_all_detaches_everything_when_allowed() {
    let mut h = Harness::new();
    let wheat = h.write("wheat.sim", "sow wheat");
    h.manager.open_file(&wheat, GroupId::Primary).unwrap();
    h.manager
        .open_from_memory("Untitled", "sow oats", GroupId::Secondary)
        .unwrap();
    h.codec.doc(1).edit();
    h.ui.answer(&[SaveChoice::Discard]);

    assert!(h.manager.close_all());

    assert_eq!(h.manager.session_count(), 0);
    assert!(h.codec.doc(0).is_detached());
    assert!(h.codec.doc(1).is_detached());
    assert_eq!(h.ui.prompts(), vec!["Untitled".to_string()]);
}

#[test]
fn test_app_close_cancelled_keeps_documents() {
    let mut h = Harness::new();
    let wheat = h.write("wheat.sim", "sow wheat");
    let id = h.manager.open_file(&wheat, GroupId::Primary).unwrap();
    h.codec.doc(0).edit();
    let saves = h.store.save_count();

    assert!(!h.manager.app_close_requested());

    assert_eq!(h.manager.session(id).unwrap().state(), SessionState::Dirty);
    assert_eq!(h.store.save_count(), saves);
}

#[test]
fn test_app_close_flushes_recent_list() {
    let mut h = Harness::new();
    let wheat = h.write("wheat.sim", "sow wheat");
    h.manager.open_file(&wheat, GroupId::Primary).unwrap();
    let saves = h.store.save_count();

    assert!(h.manager.app_close_requested());

    assert_eq!(h.store.save_count(), saves + 1);
    assert_eq!(h.store.entries(), vec![wheat]);
    assert_eq!(h.manager.session_count(), 0);
}

#[test]
fn test_app_close_with_nothing_open() {
    let mut h = Harness::new();
    assert!(h.manager.app_close_requested());
    assert!(h.ui.prompts().is_empty());
}
