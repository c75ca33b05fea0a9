use super::*;
use crate::runtime::{Call, Event, H256};
use frames::{Action, Record};
use serde_json::json;

const ALICE: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

fn runtime_with(nums: &[u32]) -> (Runtime, Vec<RecordId>) {
    let mut rt = Runtime::seeded(0, 3);
    let ids = nums
        .iter()
        .map(|n| {
            let events = rt
                .dispatch(ALICE, Call::Store { val_to_add: *n, action: Some(Action::Idle) })
                .expect("store");
            match events.as_slice() {
                [Event::Stored { id, .. }] => *id,
                other => panic!("unexpected events {other:?}"),
            }
        })
        .collect();
    (rt, ids)
}

#[test]
fn count_reports_counts_of_storage() {
    let (rt, _) = runtime_with(&[1, 2, 3]);
    assert_eq!(count(&rt).get("count"), Some(&json!(3)));
}

#[test]
fn entries_lists_every_record_with_its_key() {
    let (rt, ids) = runtime_with(&[7, 8]);
    let data = entries(&rt);
    let parsed: Vec<frames::StorageEntry> =
        serde_json::from_value(data.get("entries").cloned().expect("entries")).expect("decode");

    assert_eq!(parsed.len(), 2);
    for entry in &parsed {
        assert_eq!(entry.key, entry.value.id);
        assert!(ids.iter().any(|id| id.to_string() == entry.key));
    }
}

#[test]
fn multi_keeps_order_and_nulls() {
    let (rt, ids) = runtime_with(&[10, 20]);
    let missing = H256([0xee; 32]);
    let data = multi(&rt, &[ids[1], missing, ids[0]]);
    let records: Vec<Option<Record>> =
        serde_json::from_value(data.get("records").cloned().expect("records")).expect("decode");

    assert_eq!(records[0].as_ref().and_then(|r| r.num), Some(20));
    assert!(records[1].is_none());
    assert_eq!(records[2].as_ref().and_then(|r| r.num), Some(10));
}

#[test]
fn snapshot_dispatches_on_query() {
    let (rt, ids) = runtime_with(&[5]);
    assert_eq!(StorageQuery::Count.snapshot(&rt), count(&rt));
    assert_eq!(StorageQuery::Multi(ids.clone()).snapshot(&rt), multi(&rt, &ids));
}

#[test]
fn accounts_lists_dev_keyring() {
    let data = accounts();
    let list = data.get("accounts").and_then(Value::as_array).expect("accounts");
    assert_eq!(list.len(), frames::chain::DEV_ACCOUNTS.len());
    assert_eq!(list[0], json!({"name": "alice", "address": ALICE}));
}

#[test]
fn parse_keys_accepts_hex_ids() {
    let mut data = Data::new();
    data.insert("keys".into(), json!([H256([1; 32]).to_string(), H256([2; 32]).to_string()]));
    assert_eq!(parse_keys(&data).expect("parse"), vec![H256([1; 32]), H256([2; 32])]);

    data.insert("keys".into(), json!([]));
    assert!(parse_keys(&data).expect("parse").is_empty());
}

#[test]
fn parse_keys_rejects_bad_input() {
    assert!(matches!(parse_keys(&Data::new()), Err(StorageError::MissingKeys)));

    let mut data = Data::new();
    data.insert("keys".into(), json!(["0x01"]));
    assert!(matches!(parse_keys(&data), Err(StorageError::InvalidKey(k)) if k == "0x01"));

    data.insert("keys".into(), json!([5]));
    assert!(matches!(parse_keys(&data), Err(StorageError::InvalidKey(_))));
}

#[test]
fn only_count_watches_the_key_set() {
    let (rt, ids) = runtime_with(&[1, 2]);
    let mut watched = StorageQuery::Count.watched_keys(&rt);
    watched.sort();
    let mut expected = ids.clone();
    expected.sort();
    assert_eq!(watched, expected);
    assert!(StorageQuery::Multi(ids).watched_keys(&rt).is_empty());
}
