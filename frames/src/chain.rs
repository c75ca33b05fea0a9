//! Typed storagechain payloads carried inside frame `data`.
//!
//! Frames travel as protobuf `Value`s, so every JSON number arrives as a
//! float. Numeric fields here deserialize from either representation.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Pallet name the node dispatches extrinsics to.
pub const PALLET: &str = "storagechain";

/// Callable names accepted by [`PALLET`].
pub mod callable {
    pub const STORE: &str = "store";
    pub const CHANGE_ACTION: &str = "changeAction";
    pub const EXECUTE: &str = "execute";
    pub const CLEAR: &str = "clear";
}

/// Well-known development accounts (name, SS58 address).
pub const DEV_ACCOUNTS: &[(&str, &str)] = &[
    ("alice", "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"),
    ("bob", "5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty"),
    ("charlie", "5FLSigC9HGRKVhB9FiEo4Y3koPsNmBmLJbpXg2mp1hXcS59Y"),
    ("dave", "5DAAnrj7VHTznn2AWBemMuyBwZWs6FNFjdyVXUeYum3PTXFy"),
    ("eve", "5HGjWAeFDfFCWPsjFQdVV2Msvz2XtMktvgocEZcCj68kUMaw"),
    ("ferdie", "5CiPPseXPECbkjWCa6MnjNokrgYjMqmKndv2rSnekmSK2DjL"),
];

/// Resolve a dev account name (case-insensitive) to its address.
#[must_use]
pub fn dev_address(name: &str) -> Option<&'static str> {
    DEV_ACCOUNTS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, address)| *address)
}

/// What a record does when executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Increment,
    Decrement,
    Idle,
}

impl Action {
    pub const ALL: [Self; 3] = [Self::Increment, Self::Decrement, Self::Idle];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Increment => "Increment",
            Self::Decrement => "Decrement",
            Self::Idle => "Idle",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action `{0}`; expected Increment, Decrement or Idle")]
pub struct ParseActionError(pub String);

impl FromStr for Action {
    type Err = ParseActionError;

    /// Variant names are matched exactly, the way the chain's enum decoder does.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ParseActionError(s.to_owned()))
    }
}

/// One stored record as the UI sees it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque chain key (`0x`-prefixed hex hash).
    pub id: String,
    /// Stored number; absent when the chain value could not be decoded.
    #[serde(default, deserialize_with = "deserialize_opt_u32")]
    pub num: Option<u32>,
    /// String-encoded [`Action`].
    pub action: String,
    /// Account address of the storer.
    pub storer: String,
}

/// Key/value pair returned by an entries scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEntry {
    pub key: String,
    pub value: Record,
}

/// A keyring account offered to the UI account selector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub name: String,
    pub address: String,
}

impl AccountInfo {
    /// Every dev account in keyring order.
    #[must_use]
    pub fn dev_accounts() -> Vec<Self> {
        DEV_ACCOUNTS
            .iter()
            .map(|(name, address)| Self { name: (*name).to_owned(), address: (*address).to_owned() })
            .collect()
    }
}

/// Lifecycle stage reported in `tx:submit` item/done frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStage {
    Ready,
    InBlock,
    Finalized,
}

fn deserialize_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(value) = value else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).map(Some).map_err(D::Error::custom);
    }
    match value.as_f64() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(f) if f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&f) => Ok(Some(f as u32)),
        _ => Err(D::Error::custom(format!("expected u32, got {value}"))),
    }
}

#[cfg(test)]
#[path = "chain_test.rs"]
mod tests;
