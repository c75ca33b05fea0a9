//! Signed extrinsic requests and their lifecycle messages.
//!
//! `TxRequest` is the generic submitter input: pallet, callable, ordered
//! params and a parallel `param_fields` list flagging user-entered params.
//! `status_message` turns `tx:submit` replies into the text shown in the
//! page's shared status line.

#[cfg(test)]
#[path = "tx_test.rs"]
mod tx_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use frames::chain::{PALLET, callable};
use serde_json::Value;

use crate::net::router;
use crate::net::types::{Frame, FrameStatus, TxStage};

/// Status shown as soon as a submission leaves the page.
pub const SENDING: &str = "Sending...";
/// Status shown when no signing account is available.
pub const NO_ACCOUNT: &str = "No account selected";

#[derive(Clone, Debug, PartialEq)]
pub struct TxRequest {
    pub pallet: String,
    pub callable: String,
    pub params: Vec<Value>,
    pub param_fields: Vec<bool>,
}

impl TxRequest {
    /// A `storagechain` call whose params are all user inputs.
    #[must_use]
    pub fn storagechain(callable: &str, params: Vec<Value>) -> Self {
        let param_fields = vec![true; params.len()];
        Self { pallet: PALLET.to_owned(), callable: callable.to_owned(), params, param_fields }
    }

    /// `store(num, action)` from the creation form, passed through as typed.
    #[must_use]
    pub fn store(num: &str, action: &str) -> Self {
        Self::storagechain(callable::STORE, vec![Value::from(num), Value::from(action)])
    }

    /// `changeAction(id, target)`.
    #[must_use]
    pub fn change_action(record_id: &str, target: &str) -> Self {
        Self::storagechain(callable::CHANGE_ACTION, vec![Value::from(record_id), Value::from(target)])
    }

    /// `execute(id, action)`.
    #[must_use]
    pub fn execute(record_id: &str, action: &str) -> Self {
        Self::storagechain(callable::EXECUTE, vec![Value::from(record_id), Value::from(action)])
    }

    /// `tx:submit` request payload.
    #[must_use]
    pub fn to_data(&self) -> Value {
        serde_json::json!({
            "pallet": self.pallet,
            "callable": self.callable,
            "params": self.params,
            "param_fields": self.param_fields,
        })
    }
}

/// Status line text for one `tx:submit` reply, or `None` for frames that
/// carry no lifecycle stage.
#[must_use]
pub fn status_message(frame: &Frame) -> Option<String> {
    if frame.status == FrameStatus::Error {
        let reason = frame
            .data_str("code")
            .or_else(|| frame.error_message())
            .unwrap_or("unknown error");
        return Some(format!("😞 Transaction Failed: {reason}"));
    }

    let stage: TxStage = serde_json::from_value(frame.data.get("status")?.clone()).ok()?;
    let block_hash = frame.data_str("block_hash").unwrap_or_default();
    Some(match stage {
        TxStage::Ready => "Current transaction status: Ready".to_owned(),
        TxStage::InBlock => format!("Current transaction status: InBlock. Block hash: {block_hash}"),
        TxStage::Finalized => format!("😉 Finalized. Block hash: {block_hash}"),
    })
}

/// Handle to a submitted extrinsic.
///
/// Releasing detaches the submitter from the extrinsic's status stream.
/// The extrinsic itself is already queued on the node and still lands.
#[derive(Clone, Debug)]
pub struct TxHandle {
    request_id: String,
    released: Arc<AtomicBool>,
}

impl TxHandle {
    pub(crate) fn new(request_id: String, released: Arc<AtomicBool>) -> Self {
        Self { request_id, released }
    }

    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Relaxed)
    }

    /// Returns `true` the first time.
    pub fn release(&self) -> bool {
        if self.released.swap(true, Ordering::Relaxed) {
            return false;
        }
        router::remove(&self.request_id);
        true
    }
}
