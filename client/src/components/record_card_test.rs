use super::*;
use crate::components::change_action_modal::confirm_change_action;
use crate::components::execute_action_modal::confirm_execute;
use crate::state::modal::ModalState;

fn record() -> Record {
    Record { id: "1".to_owned(), num: Some(42), action: "Increment".to_owned(), storer: "Alice".to_owned() }
}

#[test]
fn owner_sees_badge_and_change_control() {
    let card = CardModel::new(&record(), Some("Alice"));
    assert!(card.mine);
    assert_eq!(card.number, "Number: 42");
    assert_eq!(card.action, "Action: Increment");
    assert_eq!(card.storer, "Storer: Alice");
    assert_eq!(card.control, CardControl::ChangeAction);
    assert_eq!(card.control.label(), "Change Action");
}

#[test]
fn other_account_sees_execute_control_without_badge() {
    let card = CardModel::new(&record(), Some("Bob"));
    assert!(!card.mine);
    assert_eq!(card.control, CardControl::ExecuteAction);
    assert_eq!(card.control.label(), "Execute Action");
}

#[test]
fn no_account_is_never_owner() {
    let card = CardModel::new(&record(), None);
    assert!(!card.mine);
    assert_eq!(card.control, CardControl::ExecuteAction);
}

#[test]
fn missing_number_renders_blank() {
    let mut r = record();
    r.num = None;
    assert_eq!(CardModel::new(&r, None).number, "Number: ");
}

#[test]
fn execute_confirm_submits_id_and_current_action() {
    let r = record();
    let mut modal = ModalState::default();
    modal.open();
    let tx = confirm_execute(&r, &mut modal).expect("confirmed");

    assert_eq!(tx.callable, "execute");
    assert_eq!(tx.params, vec![serde_json::json!("1"), serde_json::json!("Increment")]);
    assert!(!modal.is_open());
}

#[test]
fn change_action_confirm_submits_entered_target() {
    let r = record();
    let mut modal = ModalState::default();
    modal.open();
    modal.edit("Decrement");
    let tx = confirm_change_action(&r.id, &mut modal).expect("confirmed");

    assert_eq!(tx.callable, "changeAction");
    assert_eq!(tx.params, vec![serde_json::json!("1"), serde_json::json!("Decrement")]);
    assert_eq!(tx.param_fields, vec![true, true]);
    assert!(!modal.is_open());
}

#[test]
fn cancelled_modal_submits_nothing() {
    let mut modal = ModalState::default();
    modal.open();
    modal.edit("Idle");
    modal.cancel();
    assert!(confirm_change_action("1", &mut modal).is_none());
}

#[test]
fn confirm_without_open_submits_nothing() {
    let mut modal = ModalState::default();
    assert!(confirm_execute(&record(), &mut modal).is_none());
}

#[test]
fn change_action_passes_arbitrary_text_through() {
    let mut modal = ModalState::default();
    modal.open();
    modal.edit("explode");
    let tx = confirm_change_action("1", &mut modal).expect("confirmed");
    assert_eq!(tx.params[1], serde_json::json!("explode"));
}
