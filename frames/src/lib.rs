//! Shared frame model and protobuf codec for the storagechain websocket API.
//!
//! This crate owns the wire representation used by `server`, `client` and
//! `cli`. Payloads stay flexible (`serde_json::Value`) while the transport is
//! protobuf binary. Typed chain payloads (`Record`, `Action`, transaction
//! progress) live in [`chain`].

pub mod chain;

use prost::Message;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use chain::{AccountInfo, Action, ParseActionError, Record, StorageEntry, TxStage};

/// Namespaced operation names understood by the node.
pub mod syscall {
    /// Pushed by the node right after the websocket upgrade.
    pub const SESSION_CONNECTED: &str = "session:connected";
    /// Development keyring listing.
    pub const KEYRING_ACCOUNTS: &str = "keyring:accounts";
    /// Subscription to the `CountsOfStorage` value.
    pub const STORAGE_COUNT: &str = "storage:count";
    /// One-shot scan over every `Storages` entry.
    pub const STORAGE_ENTRIES: &str = "storage:entries";
    /// Subscription to a batch of `Storages` keys.
    pub const STORAGE_MULTI: &str = "storage:multi";
    /// Signed extrinsic submission with lifecycle updates.
    pub const TX_SUBMIT: &str = "tx:submit";
    /// Transport-level failure not tied to a request.
    pub const GATEWAY_ERROR: &str = "gateway:error";
}

/// Error returned by [`decode_frame`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The raw bytes could not be decoded as a protobuf `WireFrame`.
    #[error("failed to decode protobuf frame: {0}")]
    Decode(#[from] prost::DecodeError),
    /// The `status` integer on the wire does not map to a known [`Status`] variant.
    #[error("invalid frame status: {0}")]
    InvalidStatus(i32),
}

/// Lifecycle status of a frame in a request/response exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Initial request frame sent by the client.
    Request,
    /// Intermediate streaming item (non-terminal). Subscriptions only ever
    /// emit items until cancelled.
    Item,
    /// Intermediate streaming batch (non-terminal).
    Bulk,
    /// Successful terminal response.
    Done,
    /// Error terminal response.
    Error,
    /// Cancellation frame; `parent_id` names the request being cancelled.
    Cancel,
}

impl Status {
    /// Terminal statuses end a response stream.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error | Self::Cancel)
    }

    /// Convert status into wire enum integer value.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Request => WireFrameStatus::Request as i32,
            Self::Item => WireFrameStatus::Item as i32,
            Self::Bulk => WireFrameStatus::Bulk as i32,
            Self::Done => WireFrameStatus::Done as i32,
            Self::Error => WireFrameStatus::Error as i32,
            Self::Cancel => WireFrameStatus::Cancel as i32,
        }
    }

    fn from_i32(value: i32) -> Result<Self, CodecError> {
        match WireFrameStatus::try_from(value) {
            Ok(WireFrameStatus::Request) => Ok(Self::Request),
            Ok(WireFrameStatus::Item) => Ok(Self::Item),
            Ok(WireFrameStatus::Bulk) => Ok(Self::Bulk),
            Ok(WireFrameStatus::Done) => Ok(Self::Done),
            Ok(WireFrameStatus::Error) => Ok(Self::Error),
            Ok(WireFrameStatus::Cancel) => Ok(Self::Cancel),
            Err(_) => Err(CodecError::InvalidStatus(value)),
        }
    }
}

/// A single message on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Unique identifier for this frame (UUID string).
    pub id: String,
    /// ID of the request frame this is responding to (or cancelling).
    pub parent_id: Option<String>,
    /// Milliseconds since the Unix epoch when the frame was created.
    pub ts: i64,
    /// Signing account address on requests; unset on node replies.
    pub from: Option<String>,
    /// Namespaced operation name, e.g. `"storage:multi"`.
    pub syscall: String,
    /// Lifecycle position of the frame.
    pub status: Status,
    /// Arbitrary JSON payload.
    pub data: Value,
}

impl Frame {
    /// Build a request envelope. Timestamps are stamped by the node.
    #[must_use]
    pub fn request(id: impl Into<String>, syscall: &str, data: Value) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            ts: 0,
            from: None,
            syscall: syscall.to_owned(),
            status: Status::Request,
            data,
        }
    }

    /// Build a cancel frame for a previously issued request.
    #[must_use]
    pub fn cancel(id: impl Into<String>, target: &Frame) -> Self {
        Self {
            id: id.into(),
            parent_id: Some(target.id.clone()),
            ts: 0,
            from: None,
            syscall: target.syscall.clone(),
            status: Status::Cancel,
            data: Value::Object(Map::new()),
        }
    }

    /// Look up a string field in the payload.
    #[must_use]
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Error message carried by an error frame, preferring `message` over `error`.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.data_str("message").or_else(|| self.data_str("error"))
    }
}

/// Encode a frame into protobuf bytes.
#[must_use]
pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    let wire = WireFrame {
        id: frame.id.clone(),
        parent_id: frame.parent_id.clone(),
        ts: frame.ts,
        from: frame.from.clone(),
        syscall: frame.syscall.clone(),
        status: frame.status.as_i32(),
        data: Some(json_to_proto_value(&frame.data)),
    };

    let mut out = Vec::with_capacity(wire.encoded_len());
    // Writing into a growable Vec cannot hit `BufferTooSmall`.
    wire.encode(&mut out).unwrap_or_default();
    out
}

/// Decode protobuf bytes into a frame.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed bytes and
/// [`CodecError::InvalidStatus`] for out-of-range status values.
pub fn decode_frame(bytes: &[u8]) -> Result<Frame, CodecError> {
    let wire = WireFrame::decode(bytes)?;
    Ok(Frame {
        status: Status::from_i32(wire.status)?,
        id: wire.id,
        parent_id: wire.parent_id,
        ts: wire.ts,
        from: wire.from,
        syscall: wire.syscall,
        data: wire
            .data
            .map_or_else(|| Value::Object(Map::new()), |v| proto_to_json_value(&v)),
    })
}

fn json_to_proto_value(value: &Value) -> prost_types::Value {
    use prost_types::value::Kind;

    let kind = match value {
        Value::Null => Kind::NullValue(prost_types::NullValue::NullValue as i32),
        Value::Bool(v) => Kind::BoolValue(*v),
        Value::Number(v) => Kind::NumberValue(v.as_f64().unwrap_or(0.0)),
        Value::String(v) => Kind::StringValue(v.clone()),
        Value::Array(items) => Kind::ListValue(prost_types::ListValue {
            values: items.iter().map(json_to_proto_value).collect(),
        }),
        Value::Object(fields) => Kind::StructValue(prost_types::Struct {
            fields: fields
                .iter()
                .map(|(k, v)| (k.clone(), json_to_proto_value(v)))
                .collect(),
        }),
    };

    prost_types::Value { kind: Some(kind) }
}

fn proto_to_json_value(value: &prost_types::Value) -> Value {
    use prost_types::value::Kind;

    match &value.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::NumberValue(v)) => serde_json::Number::from_f64(*v).map_or(Value::Null, Value::Number),
        Some(Kind::StringValue(v)) => Value::String(v.clone()),
        Some(Kind::BoolValue(v)) => Value::Bool(*v),
        Some(Kind::StructValue(s)) => Value::Object(
            s.fields
                .iter()
                .map(|(k, v)| (k.clone(), proto_to_json_value(v)))
                .collect(),
        ),
        Some(Kind::ListValue(list)) => Value::Array(list.values.iter().map(proto_to_json_value).collect()),
    }
}

#[derive(Clone, PartialEq, Message)]
struct WireFrame {
    #[prost(string, tag = "1")]
    id: String,
    #[prost(string, optional, tag = "2")]
    parent_id: Option<String>,
    #[prost(int64, tag = "3")]
    ts: i64,
    #[prost(string, optional, tag = "4")]
    from: Option<String>,
    #[prost(string, tag = "5")]
    syscall: String,
    #[prost(enumeration = "WireFrameStatus", tag = "6")]
    status: i32,
    #[prost(message, optional, tag = "7")]
    data: Option<prost_types::Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
enum WireFrameStatus {
    Request = 0,
    Done = 1,
    Error = 2,
    Cancel = 3,
    Item = 4,
    Bulk = 5,
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
