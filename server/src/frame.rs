//! Frame — the node-side view of the wire message.
//!
//! ARCHITECTURE
//! ============
//! Clients send request frames over websocket, the node dispatches by
//! syscall prefix, and responses flow back as item/done/error frames.
//! Subscriptions keep emitting items until the client sends a cancel frame
//! whose `parent_id` names the subscription request.
//!
//! DESIGN
//! ======
//! - Flat data: payload is always `Map<String, Value>`.
//! - Responses correlate to requests via `parent_id`.
//! - Ids are parsed into `Uuid` at the edge; the shared `frames` crate keeps
//!   them as strings for the browser and CLI.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

pub use frames::Status;

// =============================================================================
// FIELD CONSTANTS
// =============================================================================

/// Frame data key for error messages.
pub const FRAME_MESSAGE: &str = "message";

/// Frame data key for grepable error codes.
pub const FRAME_CODE: &str = "code";

/// Frame data key for the retryable flag on error frames.
pub const FRAME_RETRYABLE: &str = "retryable";

// =============================================================================
// TYPES
// =============================================================================

/// Flat key-value payload. Alias to reduce noise in signatures.
pub type Data = HashMap<String, serde_json::Value>;

/// The node's message type.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    /// Milliseconds since Unix epoch. Set automatically at construction.
    pub ts: i64,
    /// Signer address as claimed by the client.
    pub from: Option<String>,
    pub syscall: String,
    pub status: Status,
    pub data: Data,
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid frame id `{0}`")]
    InvalidId(String),
    #[error("invalid parent id `{0}`")]
    InvalidParentId(String),
    #[error("frame data must be an object")]
    DataNotObject,
}

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code and retryable flag for structured error frames.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

/// Current time as milliseconds since Unix epoch.
fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

impl Frame {
    /// Create a request frame. Used for node pushes such as `session:connected`.
    pub fn request(syscall: impl Into<String>, data: Data) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent_id: None,
            ts: now_ms(),
            from: None,
            syscall: syscall.into(),
            status: Status::Request,
            data,
        }
    }

    /// Create an item response carrying one result.
    #[must_use]
    pub fn item(&self, data: Data) -> Self {
        self.reply(Status::Item, data)
    }

    /// Create a done response with no payload.
    #[must_use]
    pub fn done(&self) -> Self {
        self.reply(Status::Done, Data::new())
    }

    /// Create a done response carrying a payload.
    #[must_use]
    pub fn done_with(&self, data: Data) -> Self {
        self.reply(Status::Done, data)
    }

    /// Create an error response from a plain string. Terminal.
    #[must_use]
    pub fn error(&self, message: impl Into<String>) -> Self {
        let mut data = Data::new();
        data.insert(FRAME_MESSAGE.into(), serde_json::Value::String(message.into()));
        self.reply(Status::Error, data)
    }

    /// Create a structured error response from a typed error. Terminal.
    #[must_use]
    pub fn error_from(&self, err: &(impl ErrorCode + ?Sized)) -> Self {
        let mut data = Data::new();
        data.insert(FRAME_CODE.into(), serde_json::Value::String(err.error_code().to_string()));
        data.insert(FRAME_MESSAGE.into(), serde_json::Value::String(err.to_string()));
        data.insert(FRAME_RETRYABLE.into(), serde_json::Value::Bool(err.retryable()));
        self.reply(Status::Error, data)
    }

    /// Build a reply frame. Inherits `syscall`; `parent_id` points at `self`.
    fn reply(&self, status: Status, data: Data) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent_id: Some(self.id),
            ts: now_ms(),
            from: None,
            syscall: self.syscall.clone(),
            status,
            data,
        }
    }

    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Extract the syscall prefix (everything before the first ':').
    #[must_use]
    pub fn prefix(&self) -> &str {
        let Some((prefix, _)) = self.syscall.split_once(':') else {
            return &self.syscall;
        };
        prefix
    }

    /// Extract the operation (everything after the first ':').
    #[must_use]
    pub fn op(&self) -> &str {
        self.syscall.split_once(':').map_or("", |(_, op)| op)
    }
}

// =============================================================================
// WIRE CONVERSION
// =============================================================================

impl From<&Frame> for frames::Frame {
    fn from(frame: &Frame) -> Self {
        Self {
            id: frame.id.to_string(),
            parent_id: frame.parent_id.map(|id| id.to_string()),
            ts: frame.ts,
            from: frame.from.clone(),
            syscall: frame.syscall.clone(),
            status: frame.status,
            data: serde_json::Value::Object(frame.data.clone().into_iter().collect()),
        }
    }
}

impl TryFrom<frames::Frame> for Frame {
    type Error = FrameError;

    fn try_from(wire: frames::Frame) -> Result<Self, Self::Error> {
        let id = wire
            .id
            .parse()
            .map_err(|_| FrameError::InvalidId(wire.id.clone()))?;
        let parent_id = match wire.parent_id {
            Some(raw) => Some(raw.parse().map_err(|_| FrameError::InvalidParentId(raw.clone()))?),
            None => None,
        };
        let data = match wire.data {
            serde_json::Value::Object(map) => map.into_iter().collect(),
            serde_json::Value::Null => Data::new(),
            _ => return Err(FrameError::DataNotObject),
        };

        Ok(Self { id, parent_id, ts: wire.ts, from: wire.from, syscall: wire.syscall, status: wire.status, data })
    }
}

#[cfg(test)]
#[path = "frame_test.rs"]
mod tests;
