use super::*;

#[test]
fn action_parses_exact_variant_names() {
    assert_eq!("Increment".parse::<Action>(), Ok(Action::Increment));
    assert_eq!("Decrement".parse::<Action>(), Ok(Action::Decrement));
    assert_eq!("Idle".parse::<Action>(), Ok(Action::Idle));
}

#[test]
fn action_rejects_other_spellings() {
    let err = "increment".parse::<Action>().expect_err("lowercase should fail");
    assert_eq!(err, ParseActionError("increment".to_owned()));
    assert!("".parse::<Action>().is_err());
    assert!("Jump".parse::<Action>().is_err());
}

#[test]
fn action_display_matches_wire_name() {
    for action in Action::ALL {
        assert_eq!(action.to_string(), action.as_str());
        assert_eq!(
            serde_json::to_value(action).expect("serialize"),
            serde_json::json!(action.as_str())
        );
    }
}

#[test]
fn record_num_accepts_float_numbers_from_protobuf() {
    let record: Record = serde_json::from_value(serde_json::json!({
        "id": "0x01",
        "num": 42.0,
        "action": "Increment",
        "storer": "alice"
    }))
    .expect("record");
    assert_eq!(record.num, Some(42));
}

#[test]
fn record_num_missing_or_null_is_absent() {
    let record: Record = serde_json::from_value(serde_json::json!({
        "id": "0x01",
        "num": null,
        "action": "Idle",
        "storer": "bob"
    }))
    .expect("record");
    assert_eq!(record.num, None);

    let record: Record = serde_json::from_value(serde_json::json!({
        "id": "0x01",
        "action": "Idle",
        "storer": "bob"
    }))
    .expect("record");
    assert_eq!(record.num, None);
}

#[test]
fn record_num_rejects_fractional_and_negative_values() {
    for bad in [serde_json::json!(1.5), serde_json::json!(-3), serde_json::json!("7")] {
        let result = serde_json::from_value::<Record>(serde_json::json!({
            "id": "0x01",
            "num": bad,
            "action": "Idle",
            "storer": "bob"
        }));
        assert!(result.is_err(), "expected {bad} to be rejected");
    }
}

#[test]
fn dev_address_is_case_insensitive() {
    assert_eq!(dev_address("Alice"), Some("5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"));
    assert_eq!(dev_address("BOB"), Some("5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty"));
    assert_eq!(dev_address("mallory"), None);
}

#[test]
fn dev_accounts_follow_keyring_order() {
    let accounts = AccountInfo::dev_accounts();
    assert_eq!(accounts.len(), DEV_ACCOUNTS.len());
    assert_eq!(accounts[0].name, "alice");
    assert_eq!(accounts[1].name, "bob");
}

#[test]
fn tx_stage_uses_snake_case_on_the_wire() {
    assert_eq!(serde_json::to_value(TxStage::InBlock).expect("stage"), serde_json::json!("in_block"));
    assert_eq!(
        serde_json::from_value::<TxStage>(serde_json::json!("finalized")).expect("stage"),
        TxStage::Finalized
    );
}
