use super::*;

fn reply(status: Status, data: Value) -> Frame {
    let mut frame = Frame::request("r-1", syscall::TX_SUBMIT, data);
    frame.parent_id = Some("req-1".to_owned());
    frame.status = status;
    frame
}

#[test]
fn ws_url_maps_http_schemes() {
    assert_eq!(ws_url("http://127.0.0.1:3000").unwrap(), "ws://127.0.0.1:3000/api/ws");
    assert_eq!(ws_url("https://chain.example/").unwrap(), "wss://chain.example/api/ws");
    assert!(matches!(ws_url("ftp://x"), Err(CliError::InvalidBaseUrl(_))));
}

#[test]
fn resolve_signer_maps_dev_names() {
    assert_eq!(resolve_signer("alice"), "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY");
    assert_eq!(resolve_signer("Bob"), "5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty");
    assert_eq!(resolve_signer("5Custom"), "5Custom");
}

#[test]
fn parse_action_is_exact() {
    assert_eq!(parse_action("Idle"), Ok(Action::Idle));
    assert!(parse_action("idle").is_err());
}

#[test]
fn cli_parses_store_without_action() {
    let cli = Cli::try_parse_from(["storagechain-cli", "store", "42"]).unwrap();
    assert_eq!(cli.account, "alice");
    assert!(matches!(cli.command, Command::Store { num: 42, action: None }));
}

#[test]
fn cli_parses_execute_with_signer() {
    let cli = Cli::try_parse_from(["storagechain-cli", "--as", "bob", "execute", "0xab", "Decrement"]).unwrap();
    assert_eq!(cli.account, "bob");
    assert!(matches!(cli.command, Command::Execute { action: Some(Action::Decrement), .. }));
}

#[test]
fn cli_rejects_negative_number() {
    assert!(Cli::try_parse_from(["storagechain-cli", "store", "-1"]).is_err());
}

#[test]
fn tx_updates_render_each_stage() {
    let ready = reply(Status::Item, json!({"status": "ready", "tx_hash": "0x01"}));
    assert_eq!(format_tx_update(&ready).as_deref(), Some("ready tx_hash=0x01"));

    let in_block = reply(Status::Item, json!({"status": "in_block", "block_hash": "0xbb", "events": []}));
    assert_eq!(format_tx_update(&in_block).as_deref(), Some("in_block block_hash=0xbb events=[]"));

    let done = reply(Status::Done, json!({"status": "finalized", "block_hash": "0xbb"}));
    assert_eq!(format_tx_update(&done).as_deref(), Some("finalized block_hash=0xbb"));

    assert!(format_tx_update(&reply(Status::Item, json!({}))).is_none());
}

#[test]
fn server_error_combines_code_and_message() {
    let frame = reply(Status::Error, json!({"code": "storagechain.NotStorageOwner", "message": "not the storer"}));
    let CliError::ServerError { syscall, message } = server_error(&frame) else {
        panic!("expected server error");
    };
    assert_eq!(syscall, "tx:submit");
    assert_eq!(message, "storagechain.NotStorageOwner: not the storer");
}

#[test]
fn parse_count_reads_float_counts() {
    let mut frame = reply(Status::Item, json!({"count": 3.0}));
    assert_eq!(parse_count(&frame).unwrap(), 3);
    frame.data = json!({"count": -2.0});
    assert!(parse_count(&frame).is_err());
}

#[test]
fn format_record_marks_missing_number() {
    let record = Record { id: "0x01".to_owned(), num: None, action: "Idle".to_owned(), storer: "A".to_owned() };
    assert_eq!(format_record(&record), "0x01  num=-  action=Idle  storer=A");
}

#[test]
fn request_frame_is_stamped_and_signed() {
    let frame = request_frame(syscall::TX_SUBMIT, json!({}), Some("A".to_owned()));
    assert_eq!(frame.status, Status::Request);
    assert_eq!(frame.from.as_deref(), Some("A"));
    assert!(frame.ts > 0);
}
