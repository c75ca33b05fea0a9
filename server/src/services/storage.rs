//! Storage queries — read-only views over the runtime.
//!
//! These back both the one-shot syscalls (`storage:entries`,
//! `keyring:accounts`) and each tick of the storage subscriptions.

use frames::{AccountInfo, StorageEntry};
use serde_json::Value;

use crate::frame::{Data, ErrorCode};
use crate::runtime::{RecordId, Runtime};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("`keys` must be an array of record ids")]
    MissingKeys,
    #[error("invalid record id `{0}`")]
    InvalidKey(String),
}

impl ErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        "E_INVALID_PARAMS"
    }
}

/// What a storage subscription watches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageQuery {
    /// `CountsOfStorage`.
    Count,
    /// `Storages` values for these keys, in this order.
    Multi(Vec<RecordId>),
}

impl StorageQuery {
    /// Current value as a frame payload.
    #[must_use]
    pub fn snapshot(&self, runtime: &Runtime) -> Data {
        match self {
            Self::Count => count(runtime),
            Self::Multi(keys) => multi(runtime, keys),
        }
    }

    /// Keys whose turnover must reach the subscriber even when the snapshot
    /// is unchanged. A `clear` and a `store` in one block keep the count but
    /// replace the key set.
    #[must_use]
    pub fn watched_keys(&self, runtime: &Runtime) -> Vec<RecordId> {
        match self {
            Self::Count => runtime.entries().map(|(id, _)| id).collect(),
            Self::Multi(_) => Vec::new(),
        }
    }
}

/// `{count}`
#[must_use]
pub fn count(runtime: &Runtime) -> Data {
    let mut data = Data::new();
    data.insert("count".into(), serde_json::json!(runtime.counts_of_storage()));
    data
}

/// Every `Storages` entry in key order.
#[must_use]
pub fn entry_list(runtime: &Runtime) -> Vec<StorageEntry> {
    runtime
        .entries()
        .map(|(id, item)| StorageEntry { key: id.to_string(), value: item.to_record(id) })
        .collect()
}

/// `{entries: [{key, value}]}`
#[must_use]
pub fn entries(runtime: &Runtime) -> Data {
    let mut data = Data::new();
    data.insert("entries".into(), serde_json::to_value(entry_list(runtime)).unwrap_or_default());
    data
}

/// `{records: [Record | null]}` aligned with `keys`.
#[must_use]
pub fn multi(runtime: &Runtime, keys: &[RecordId]) -> Data {
    let mut data = Data::new();
    data.insert("records".into(), serde_json::to_value(runtime.multi(keys)).unwrap_or_default());
    data
}

/// `{accounts: [{name, address}]}`
#[must_use]
pub fn accounts() -> Data {
    let mut data = Data::new();
    data.insert("accounts".into(), serde_json::to_value(AccountInfo::dev_accounts()).unwrap_or_default());
    data
}

/// Parse the `keys` array of a `storage:multi` request.
///
/// # Errors
///
/// Returns [`StorageError`] when `keys` is missing or holds a malformed id.
pub fn parse_keys(data: &Data) -> Result<Vec<RecordId>, StorageError> {
    let Some(Value::Array(raw)) = data.get("keys") else {
        return Err(StorageError::MissingKeys);
    };
    raw.iter()
        .map(|v| {
            let text = v.as_str().ok_or_else(|| StorageError::InvalidKey(v.to_string()))?;
            text.parse().map_err(|_| StorageError::InvalidKey(text.to_owned()))
        })
        .collect()
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
