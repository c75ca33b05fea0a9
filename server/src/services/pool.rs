//! Transaction pool — validated extrinsics waiting for the next block.
//!
//! DESIGN
//! ======
//! `tx:submit` decodes the call synchronously so shape errors are reported
//! before anything is queued. Accepted extrinsics keep the originating
//! request frame and the connection's outbound sender, which the block
//! author uses to stream `in_block` and `finalized` back to the submitter.
//! If the connection is gone by then the updates are dropped; the
//! extrinsic is still applied.

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, mpsc};

use crate::frame::{Data, ErrorCode, Frame};
use crate::runtime::{Call, CallError, H256};

/// An accepted extrinsic.
#[derive(Debug)]
pub struct PendingTx {
    pub hash: H256,
    pub signer: String,
    pub call: Call,
    /// The `tx:submit` request; lifecycle frames reply to it.
    pub request: Frame,
    pub reply: mpsc::Sender<Frame>,
}

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("transaction has no signer")]
    MissingSigner,
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("param_fields has {got} entries for {expected} params")]
    ParamFieldsMismatch { expected: usize, got: usize },
    #[error(transparent)]
    Call(#[from] CallError),
}

impl ErrorCode for PoolError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingSigner => "E_MISSING_SIGNER",
            Self::MissingField(_) | Self::ParamFieldsMismatch { .. } => "E_INVALID_PARAMS",
            Self::Call(e) => e.error_code(),
        }
    }
}

/// FIFO queue shared between websocket sessions and the block author.
#[derive(Clone, Default)]
pub struct TxPool {
    queue: Arc<Mutex<VecDeque<PendingTx>>>,
}

impl TxPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, tx: PendingTx) {
        self.queue.lock().await.push_back(tx);
    }

    /// Take every pending extrinsic in submission order.
    pub async fn drain(&self) -> Vec<PendingTx> {
        self.queue.lock().await.drain(..).collect()
    }

    pub async fn len(&self) -> usize {
        self.queue.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.queue.lock().await.is_empty()
    }
}

/// Decode a `tx:submit` request into its signer and call.
///
/// # Errors
///
/// Returns a [`PoolError`] when the signer is missing or the call does not
/// decode.
pub fn decode_submission(req: &Frame) -> Result<(String, Call), PoolError> {
    let signer = req
        .from
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(PoolError::MissingSigner)?;

    let pallet = req
        .data
        .get("pallet")
        .and_then(Value::as_str)
        .ok_or(PoolError::MissingField("pallet"))?;
    let callable = req
        .data
        .get("callable")
        .and_then(Value::as_str)
        .ok_or(PoolError::MissingField("callable"))?;
    let params = match req.data.get("params") {
        Some(Value::Array(items)) => items.as_slice(),
        None | Some(Value::Null) => &[],
        Some(_) => return Err(PoolError::MissingField("params")),
    };
    if let Some(Value::Array(fields)) = req.data.get("param_fields") {
        if fields.len() != params.len() {
            return Err(PoolError::ParamFieldsMismatch { expected: params.len(), got: fields.len() });
        }
    }

    let call = Call::decode(pallet, callable, params)?;
    Ok((signer.to_owned(), call))
}

/// Validate and queue a submission. Returns the `ready` item for the sender.
///
/// # Errors
///
/// See [`decode_submission`].
pub async fn submit(pool: &TxPool, req: &Frame, reply: mpsc::Sender<Frame>) -> Result<Frame, PoolError> {
    let (signer, call) = decode_submission(req)?;
    let hash = H256::hash_of(&[req.id.as_bytes(), signer.as_bytes(), &req.ts.to_le_bytes()]);

    tracing::info!(tx_hash = %hash, call = call.label(), %signer, "pool: extrinsic ready");

    let mut data = Data::new();
    data.insert("status".into(), serde_json::json!(frames::TxStage::Ready));
    data.insert("tx_hash".into(), Value::String(hash.to_string()));
    let ready = req.item(data);

    pool.push(PendingTx { hash, signer, call, request: req.clone(), reply }).await;
    Ok(ready)
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod tests;
