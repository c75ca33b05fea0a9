use super::*;

fn record(id: &str, num: u32) -> Record {
    Record { id: id.to_owned(), num: Some(num), action: "Increment".to_owned(), storer: "A".to_owned() }
}

fn entry(id: &str, num: u32) -> StorageEntry {
    StorageEntry { key: id.to_owned(), value: record(id, num) }
}

#[test]
fn default_state_is_empty() {
    let state = ChainState::default();
    assert!(state.count.is_none());
    assert!(state.ids.is_empty());
    assert!(state.records.is_empty());
    assert_eq!(state.generation, 0);
    assert!(!state.is_current());
}

#[test]
fn apply_count_reports_change() {
    let mut state = ChainState::default();
    assert!(state.apply_count(0));
    assert!(!state.apply_count(0));
    assert!(state.apply_count(1));
    assert_eq!(state.count, Some(1));
}

#[test]
fn apply_entries_replaces_ids_and_bumps_generation() {
    let mut state = ChainState::default();
    assert!(state.apply_entries(vec![entry("0x01", 1), entry("0x02", 2)]));
    assert_eq!(state.ids, vec!["0x01", "0x02"]);
    assert_eq!(state.generation, 1);

    assert!(state.apply_entries(vec![entry("0x02", 2)]));
    assert_eq!(state.ids, vec!["0x02"]);
    assert_eq!(state.generation, 2);
}

#[test]
fn apply_entries_with_same_ids_keeps_generation() {
    let mut state = ChainState::default();
    state.apply_entries(vec![entry("0x01", 1)]);
    assert!(!state.apply_entries(vec![entry("0x01", 99)]));
    assert_eq!(state.generation, 1);
}

#[test]
fn apply_records_for_current_generation_replaces_list() {
    let mut state = ChainState::default();
    state.apply_entries(vec![entry("0x01", 1), entry("0x02", 2)]);

    assert!(state.apply_records(1, vec![Some(record("0x01", 1)), Some(record("0x02", 2))]));
    assert_eq!(state.records.len(), 2);
    assert!(state.is_current());

    assert!(state.apply_records(1, vec![Some(record("0x01", 5))]));
    assert_eq!(state.records, vec![record("0x01", 5)]);
}

#[test]
fn apply_records_from_stale_generation_is_dropped() {
    let mut state = ChainState::default();
    state.apply_entries(vec![entry("0x01", 1)]);
    state.apply_records(1, vec![Some(record("0x01", 1))]);
    state.apply_entries(vec![entry("0x01", 1), entry("0x02", 2)]);

    assert!(!state.apply_records(1, vec![Some(record("0x01", 7))]));
    assert_eq!(state.records, vec![record("0x01", 1)]);
    assert!(!state.is_current());
}

#[test]
fn apply_records_skips_missing_values() {
    let mut state = ChainState::default();
    state.apply_entries(vec![entry("0x01", 1), entry("0x02", 2)]);
    assert!(state.apply_records(1, vec![None, Some(record("0x02", 2))]));
    assert_eq!(state.records, vec![record("0x02", 2)]);
}
