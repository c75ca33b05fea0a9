//! Block author — seals the transaction pool into blocks on a fixed tick.
//!
//! DESIGN
//! ======
//! One background task owns block production. Each tick drains the pool,
//! applies the extrinsics in submission order under a single runtime write
//! lock, seals the block, then publishes the new revision so subscriptions
//! re-read storage. Lifecycle frames go to each submitter afterwards:
//! `in_block` then `finalized` on success, a structured error otherwise.
//! Empty ticks produce no block.
//!
//! Delivery to submitters is best-effort: a closed or full connection
//! channel drops the update, never the block.

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::frame::{Data, Frame};
use crate::runtime::{BlockHeader, Event, H256, RuntimeError};
use crate::services::pool::PendingTx;
use crate::state::AppState;

/// Spawn the background block author. Returns a handle for shutdown.
pub fn spawn_block_author(state: AppState) -> JoinHandle<()> {
    let block_time = state.config.block_time;
    info!(block_time_ms = u64::try_from(block_time.as_millis()).unwrap_or(u64::MAX), "block author configured");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + block_time, block_time);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            author_block(&state).await;
        }
    })
}

/// Author one block from the current pool. Returns `None` when the pool
/// was empty.
pub async fn author_block(state: &AppState) -> Option<BlockHeader> {
    let pending = state.pool.drain().await;
    if pending.is_empty() {
        return None;
    }

    let mut runtime = state.runtime.write().await;
    let outcomes: Vec<Result<Vec<Event>, RuntimeError>> = pending
        .iter()
        .map(|tx| runtime.dispatch(&tx.signer, tx.call.clone()))
        .collect();
    let hashes: Vec<H256> = pending.iter().map(|tx| tx.hash).collect();
    let header = runtime.seal_block(&hashes);
    let revision = runtime.revision();
    drop(runtime);

    state.revision.send_if_modified(|current| {
        let changed = *current != revision;
        *current = revision;
        changed
    });

    let failed = outcomes.iter().filter(|o| o.is_err()).count();
    info!(
        block = header.number,
        hash = %header.hash,
        extrinsics = pending.len(),
        failed,
        "author: block sealed"
    );

    for (tx, outcome) in pending.into_iter().zip(outcomes) {
        report(tx, &header, outcome);
    }
    Some(header)
}

fn report(tx: PendingTx, header: &BlockHeader, outcome: Result<Vec<Event>, RuntimeError>) {
    let updates = match outcome {
        Ok(events) => {
            info!(tx_hash = %tx.hash, call = tx.call.label(), block = header.number, "author: extrinsic applied");
            lifecycle_frames(&tx.request, header, &events)
        }
        Err(e) => {
            warn!(tx_hash = %tx.hash, call = tx.call.label(), error = %e, "author: extrinsic failed");
            vec![
                tx.request
                    .error_from(&e)
                    .with_data("block_hash", header.hash.to_string())
                    .with_data("block_number", header.number),
            ]
        }
    };

    for frame in updates {
        if tx.reply.try_send(frame).is_err() {
            warn!(tx_hash = %tx.hash, "author: submitter gone, dropping status update");
            break;
        }
    }
}

/// `in_block` item followed by the `finalized` done frame.
fn lifecycle_frames(request: &Frame, header: &BlockHeader, events: &[Event]) -> Vec<Frame> {
    let mut in_block = Data::new();
    in_block.insert("status".into(), serde_json::json!(frames::TxStage::InBlock));
    in_block.insert("block_hash".into(), serde_json::json!(header.hash.to_string()));
    in_block.insert("block_number".into(), serde_json::json!(header.number));
    in_block.insert("events".into(), serde_json::to_value(events).unwrap_or_default());

    let mut finalized = Data::new();
    finalized.insert("status".into(), serde_json::json!(frames::TxStage::Finalized));
    finalized.insert("block_hash".into(), serde_json::json!(header.hash.to_string()));

    vec![request.item(in_block), request.done_with(finalized)]
}

#[cfg(test)]
#[path = "author_test.rs"]
mod tests;
