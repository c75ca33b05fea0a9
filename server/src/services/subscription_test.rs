use super::*;
use crate::runtime::H256;
use crate::state::test_helpers::{self, ALICE, BOB};
use frames::{Action, Record};
use serde_json::{Value, json};
use tokio::time::{Duration, timeout};

async fn recv(rx: &mut mpsc::Receiver<Frame>) -> Frame {
    timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("subscription item timed out")
        .expect("subscription channel closed unexpectedly")
}

async fn assert_quiet(rx: &mut mpsc::Receiver<Frame>) {
    assert!(
        timeout(Duration::from_millis(80), rx.recv()).await.is_err(),
        "expected no subscription item"
    );
}

fn records(frame: &Frame) -> Vec<Option<Record>> {
    serde_json::from_value(frame.data.get("records").cloned().unwrap_or(Value::Null)).expect("records")
}

#[tokio::test]
async fn count_subscription_emits_now_and_on_change() {
    let state = test_helpers::test_app_state();
    let (tx, mut rx) = mpsc::channel(8);
    let req = Frame::request(frames::syscall::STORAGE_COUNT, Data::new());
    let sub = spawn(&state, req.clone(), StorageQuery::Count, tx);

    let first = recv(&mut rx).await;
    assert_eq!(first.parent_id, Some(req.id));
    assert_eq!(first.data.get("count"), Some(&json!(0)));

    test_helpers::seed_record(&state, ALICE, 1, Action::Idle).await;
    let second = recv(&mut rx).await;
    assert_eq!(second.data.get("count"), Some(&json!(1)));

    sub.cancel().await;
}

#[tokio::test]
async fn unchanged_value_is_not_resent() {
    let state = test_helpers::test_app_state();
    let keep = test_helpers::seed_record(&state, ALICE, 1, Action::Idle).await;
    let (tx, mut rx) = mpsc::channel(8);
    let req = Frame::request(frames::syscall::STORAGE_MULTI, Data::new());
    let sub = spawn(&state, req, StorageQuery::Multi(vec![keep]), tx);

    recv(&mut rx).await;
    // A write to a different key bumps the revision but not this view.
    test_helpers::seed_record(&state, BOB, 2, Action::Idle).await;
    assert_quiet(&mut rx).await;

    sub.cancel().await;
}

#[tokio::test]
async fn multi_subscription_tracks_record_changes() {
    let state = test_helpers::test_app_state();
    let id = test_helpers::seed_record(&state, ALICE, 5, Action::Increment).await;
    let missing = H256([7; 32]);
    let (tx, mut rx) = mpsc::channel(8);
    let req = Frame::request(frames::syscall::STORAGE_MULTI, Data::new());
    let sub = spawn(&state, req, StorageQuery::Multi(vec![id, missing]), tx);

    let first = records(&recv(&mut rx).await);
    assert_eq!(first[0].as_ref().and_then(|r| r.num), Some(5));
    assert!(first[1].is_none());

    {
        let mut runtime = state.runtime.write().await;
        runtime
            .dispatch(BOB, crate::runtime::Call::Execute { storage_id: id, action: Some(Action::Increment) })
            .expect("execute");
        state.revision.send_replace(runtime.revision());
    }
    let second = records(&recv(&mut rx).await);
    assert_eq!(second[0].as_ref().and_then(|r| r.num), Some(6));

    sub.cancel().await;
}

#[tokio::test]
async fn cancelled_subscription_sends_nothing_more() {
    let state = test_helpers::test_app_state();
    let (tx, mut rx) = mpsc::channel(8);
    let req = Frame::request(frames::syscall::STORAGE_COUNT, Data::new());
    let sub = spawn(&state, req, StorageQuery::Count, tx);
    recv(&mut rx).await;

    sub.cancel().await;
    test_helpers::seed_record(&state, ALICE, 1, Action::Idle).await;

    assert!(
        timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("channel should close once the task exits")
            .is_none()
    );
}

#[tokio::test]
async fn closed_receiver_stops_task() {
    let state = test_helpers::test_app_state();
    let (tx, rx) = mpsc::channel(8);
    drop(rx);
    let req = Frame::request(frames::syscall::STORAGE_COUNT, Data::new());
    let sub = spawn(&state, req, StorageQuery::Count, tx);

    timeout(Duration::from_millis(500), async {
        while !sub.is_finished() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("task should exit when the client is gone");
}

#[tokio::test]
async fn count_subscription_reports_key_turnover_at_same_count() {
    let state = test_helpers::test_app_state();
    let old = test_helpers::seed_record(&state, BOB, 3, Action::Idle).await;
    let (tx, mut rx) = mpsc::channel(8);
    let req = Frame::request(frames::syscall::STORAGE_COUNT, Data::new());
    let sub = spawn(&state, req, StorageQuery::Count, tx);
    assert_eq!(recv(&mut rx).await.data.get("count"), Some(&json!(1)));

    let (reply_tx, _reply_rx) = mpsc::channel(8);
    for (from, callable, params) in [(ALICE, "clear", json!([])), (BOB, "store", json!(["4", "Idle"]))] {
        let mut submit = Frame::request(frames::syscall::TX_SUBMIT, Data::new())
            .with_data("pallet", "storagechain")
            .with_data("callable", callable)
            .with_data("params", params);
        submit.from = Some(from.to_owned());
        crate::services::pool::submit(&state.pool, &submit, reply_tx.clone())
            .await
            .expect("submit");
    }
    crate::services::author::author_block(&state).await.expect("block");

    {
        let runtime = state.runtime.read().await;
        assert!(runtime.storage(&old).is_none());
        assert_eq!(runtime.counts_of_storage(), 1);
    }
    assert_eq!(recv(&mut rx).await.data.get("count"), Some(&json!(1)));

    sub.cancel().await;
}
