//! Shared wire-protocol DTOs and payload parsing for the client/node boundary.
//!
//! DESIGN
//! ======
//! Frames cross the wire as protobuf `Value`s, so numbers arrive as floats.
//! The parsers here accept both representations and return `None` on any
//! shape mismatch; callers log and move on.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use frames::Status as FrameStatus;
pub use frames::{AccountInfo, Action, Frame, Record, StorageEntry, TxStage};

/// `{count}` from a `storage:count` item.
#[must_use]
pub fn parse_count(frame: &Frame) -> Option<u32> {
    as_u32(frame.data.get("count")?)
}

/// `{entries}` from a `storage:entries` reply.
#[must_use]
pub fn parse_entries(frame: &Frame) -> Option<Vec<StorageEntry>> {
    parse_field(frame, "entries")
}

/// `{records}` from a `storage:multi` item, aligned with the requested keys.
#[must_use]
pub fn parse_records(frame: &Frame) -> Option<Vec<Option<Record>>> {
    parse_field(frame, "records")
}

/// `{accounts}` from a `keyring:accounts` reply.
#[must_use]
pub fn parse_accounts(frame: &Frame) -> Option<Vec<AccountInfo>> {
    parse_field(frame, "accounts")
}

/// `{client_id}` from the `session:connected` push.
#[must_use]
pub fn parse_client_id(frame: &Frame) -> Option<String> {
    frame.data_str("client_id").map(str::to_owned)
}

fn parse_field<T: DeserializeOwned>(frame: &Frame, key: &str) -> Option<T> {
    serde_json::from_value(frame.data.get(key)?.clone()).ok()
}

fn as_u32(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    let f = value.as_f64()?;
    if f.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&f) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(f as u32)
}
