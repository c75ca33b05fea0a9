use super::*;

const ALICE: &str = SUDO_ACCOUNT;
const BOB: &str = "5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty";

fn store(runtime: &mut Runtime, who: &str, num: u32, action: Option<Action>) -> RecordId {
    let events = runtime
        .dispatch(who, Call::Store { val_to_add: num, action })
        .expect("store should succeed");
    match events.as_slice() {
        [Event::Stored { id, .. }] => *id,
        other => panic!("unexpected events: {other:?}"),
    }
}

#[test]
fn store_inserts_record_and_bumps_count() {
    let mut rt = Runtime::seeded(0, 1);
    let id = store(&mut rt, ALICE, 42, Some(Action::Increment));

    assert_eq!(rt.counts_of_storage(), 1);
    let item = rt.storage(&id).expect("stored");
    assert_eq!(item.num, 42);
    assert_eq!(item.action, Action::Increment);
    assert_eq!(item.storer, ALICE);
    assert_eq!(rt.revision(), 1);
}

#[test]
fn identical_stores_get_distinct_ids() {
    let mut rt = Runtime::seeded(0, 1);
    let a = store(&mut rt, ALICE, 5, Some(Action::Idle));
    let b = store(&mut rt, ALICE, 5, Some(Action::Idle));

    assert_ne!(a, b);
    assert_eq!(rt.counts_of_storage(), 2);
    assert_eq!(rt.entries().count(), 2);
}

#[test]
fn store_without_action_picks_one() {
    let mut rt = Runtime::seeded(0, 7);
    let id = store(&mut rt, BOB, 3, None);
    let item = rt.storage(&id).expect("stored");
    assert!(Action::ALL.contains(&item.action));
}

#[test]
fn store_below_minimum_is_rejected_without_side_effects() {
    let mut rt = Runtime::seeded(10, 1);
    let err = rt
        .dispatch(ALICE, Call::Store { val_to_add: 9, action: None })
        .expect_err("below minimum");
    assert_eq!(err, RuntimeError::NegativeNumber);
    assert_eq!(rt.counts_of_storage(), 0);
    assert_eq!(rt.revision(), 0);
}

#[test]
fn change_action_requires_owner() {
    let mut rt = Runtime::seeded(0, 1);
    let id = store(&mut rt, ALICE, 1, Some(Action::Idle));

    let err = rt
        .dispatch(BOB, Call::ChangeAction { storage_id: id, new_action: Some(Action::Increment) })
        .expect_err("bob is not the storer");
    assert_eq!(err, RuntimeError::NotStorageOwner);

    let events = rt
        .dispatch(ALICE, Call::ChangeAction { storage_id: id, new_action: Some(Action::Decrement) })
        .expect("owner may change");
    assert_eq!(
        events,
        vec![Event::ActionChanged { storer: ALICE.to_owned(), id, action: Some(Action::Decrement) }]
    );
    assert_eq!(rt.storage(&id).map(|i| i.action), Some(Action::Decrement));
}

#[test]
fn change_action_without_target_is_invalid() {
    let mut rt = Runtime::seeded(0, 1);
    let id = store(&mut rt, ALICE, 1, Some(Action::Idle));
    let err = rt
        .dispatch(ALICE, Call::ChangeAction { storage_id: id, new_action: None })
        .expect_err("none");
    assert_eq!(err, RuntimeError::InvalidActionType);
    assert_eq!(rt.storage(&id).map(|i| i.action), Some(Action::Idle));
}

#[test]
fn unknown_ids_do_not_exist() {
    let mut rt = Runtime::seeded(0, 1);
    let missing = H256([9; 32]);
    for call in [
        Call::ChangeAction { storage_id: missing, new_action: Some(Action::Idle) },
        Call::Execute { storage_id: missing, action: Some(Action::Idle) },
    ] {
        assert_eq!(rt.dispatch(ALICE, call), Err(RuntimeError::ItemNotExist(missing)));
    }
}

#[test]
fn execute_applies_increment_and_decrement() {
    let mut rt = Runtime::seeded(0, 1);
    let id = store(&mut rt, ALICE, 10, Some(Action::Increment));

    let events = rt
        .dispatch(BOB, Call::Execute { storage_id: id, action: Some(Action::Increment) })
        .expect("increment");
    assert_eq!(events, vec![Event::Incremented { sender: BOB.to_owned(), id, action: Action::Increment }]);
    assert_eq!(rt.storage(&id).map(|i| i.num), Some(11));

    rt.dispatch(BOB, Call::Execute { storage_id: id, action: Some(Action::Decrement) })
        .expect("decrement");
    assert_eq!(rt.storage(&id).map(|i| i.num), Some(10));
}

#[test]
fn execute_idle_is_a_no_op() {
    let mut rt = Runtime::seeded(0, 1);
    let id = store(&mut rt, ALICE, 10, Some(Action::Idle));
    let before = rt.revision();

    let events = rt
        .dispatch(BOB, Call::Execute { storage_id: id, action: Some(Action::Idle) })
        .expect("idle");
    assert!(events.is_empty());
    assert_eq!(rt.revision(), before);
    assert_eq!(rt.storage(&id).map(|i| i.num), Some(10));
}

#[test]
fn storer_cannot_execute_own_record() {
    let mut rt = Runtime::seeded(0, 1);
    let id = store(&mut rt, ALICE, 10, Some(Action::Increment));
    let err = rt
        .dispatch(ALICE, Call::Execute { storage_id: id, action: Some(Action::Increment) })
        .expect_err("own record");
    assert_eq!(err, RuntimeError::OwnerCannotExecute);
}

#[test]
fn execute_uses_checked_arithmetic() {
    let mut rt = Runtime::seeded(0, 1);
    let zero = store(&mut rt, ALICE, 0, Some(Action::Decrement));
    let max = store(&mut rt, ALICE, u32::MAX, Some(Action::Increment));

    assert_eq!(
        rt.dispatch(BOB, Call::Execute { storage_id: zero, action: Some(Action::Decrement) }),
        Err(RuntimeError::Underflow)
    );
    assert_eq!(
        rt.dispatch(BOB, Call::Execute { storage_id: max, action: Some(Action::Increment) }),
        Err(RuntimeError::Overflow)
    );
    assert_eq!(rt.storage(&zero).map(|i| i.num), Some(0));
    assert_eq!(rt.storage(&max).map(|i| i.num), Some(u32::MAX));
}

#[test]
fn clear_is_sudo_only() {
    let mut rt = Runtime::seeded(0, 1);
    store(&mut rt, BOB, 1, None);
    store(&mut rt, BOB, 2, None);

    assert_eq!(rt.dispatch(BOB, Call::Clear), Err(RuntimeError::BadOrigin));
    assert_eq!(rt.dispatch(ALICE, Call::Clear), Ok(vec![Event::Cleared { removed: 2 }]));
    assert_eq!(rt.counts_of_storage(), 0);
    assert_eq!(rt.entries().count(), 0);
}

#[test]
fn multi_preserves_request_order_and_marks_missing() {
    let mut rt = Runtime::seeded(0, 1);
    let a = store(&mut rt, ALICE, 1, Some(Action::Idle));
    let b = store(&mut rt, BOB, 2, Some(Action::Increment));
    let missing = H256([3; 32]);

    let records = rt.multi(&[b, missing, a]);
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].as_ref().map(|r| r.num), Some(Some(2)));
    assert!(records[1].is_none());
    assert_eq!(records[2].as_ref().map(|r| r.storer.as_str()), Some(ALICE));
    assert_eq!(records[2].as_ref().map(|r| r.id.clone()), Some(a.to_string()));
}

#[test]
fn seal_block_chains_hashes() {
    let mut rt = Runtime::seeded(0, 1);
    let first = rt.seal_block(&[]);
    let second = rt.seal_block(&[H256([1; 32])]);

    assert_eq!(first.number, 1);
    assert_eq!(second.number, 2);
    assert_eq!(second.parent_hash, first.hash);
    assert_ne!(second.hash, first.hash);
    assert_eq!(rt.head(), &second);
}

#[test]
fn hash_display_and_parse_are_inverse() {
    let id = H256([0xab; 32]);
    let text = id.to_string();
    assert!(text.starts_with("0xabab"));
    assert_eq!(text.len(), 66);
    assert_eq!(text.parse::<H256>(), Ok(id));
    assert_eq!(text.trim_start_matches("0x").parse::<H256>(), Ok(id));
    assert!("0x1234".parse::<H256>().is_err());
}

#[test]
fn events_serialize_with_event_tag() {
    let event = Event::Cleared { removed: 3 };
    assert_eq!(
        serde_json::to_value(&event).expect("serialize"),
        serde_json::json!({"event": "Cleared", "removed": 3})
    );
}
