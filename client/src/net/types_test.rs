use super::*;
use serde_json::json;

fn item(syscall: &str, data: Value) -> Frame {
    let mut frame = Frame::request("f-1", syscall, data);
    frame.parent_id = Some("req-1".to_owned());
    frame.status = FrameStatus::Item;
    frame
}

#[test]
fn parse_count_accepts_float_and_integer() {
    assert_eq!(parse_count(&item("storage:count", json!({"count": 3.0}))), Some(3));
    assert_eq!(parse_count(&item("storage:count", json!({"count": 4}))), Some(4));
}

#[test]
fn parse_count_rejects_fractional_and_negative() {
    assert_eq!(parse_count(&item("storage:count", json!({"count": 1.5}))), None);
    assert_eq!(parse_count(&item("storage:count", json!({"count": -1.0}))), None);
    assert_eq!(parse_count(&item("storage:count", json!({}))), None);
}

#[test]
fn parse_entries_reads_keys_and_records() {
    let frame = item(
        "storage:entries",
        json!({"entries": [
            {"key": "0xaa", "value": {"id": "0xaa", "num": 42.0, "action": "Increment", "storer": "A"}}
        ]}),
    );
    let entries = parse_entries(&frame).expect("entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key, "0xaa");
    assert_eq!(entries[0].value.num, Some(42));
}

#[test]
fn parse_records_keeps_null_slots() {
    let frame = item(
        "storage:multi",
        json!({"records": [
            null,
            {"id": "0xbb", "num": 7.0, "action": "Idle", "storer": "B"}
        ]}),
    );
    let records = parse_records(&frame).expect("records");
    assert_eq!(records.len(), 2);
    assert!(records[0].is_none());
    assert_eq!(records[1].as_ref().map(|r| r.action.as_str()), Some("Idle"));
}

#[test]
fn parse_records_rejects_wrong_shape() {
    assert!(parse_records(&item("storage:multi", json!({"records": "nope"}))).is_none());
}

#[test]
fn parse_accounts_and_client_id() {
    let frame = item(
        "keyring:accounts",
        json!({"accounts": [{"name": "alice", "address": "A"}], "client_id": "c-9"}),
    );
    assert_eq!(parse_accounts(&frame).map(|a| a.len()), Some(1));
    assert_eq!(parse_client_id(&frame).as_deref(), Some("c-9"));
}
