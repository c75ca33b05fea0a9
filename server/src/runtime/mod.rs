//! Storagechain runtime — the pallet logic the dev node executes.
//!
//! DESIGN
//! ======
//! The runtime is plain synchronous state behind the node's `RwLock`. Each
//! call validates everything before touching storage, so a failed dispatch
//! leaves state untouched (the same guarantee a transactional extrinsic
//! gives). Storage writes bump `revision`; the block author publishes the
//! revision so subscriptions know when to re-read.
//!
//! Record ids hash the encoded record together with a monotonically
//! increasing nonce, so two identical `store` calls never collide.

pub mod call;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use frames::{Action, Record};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use sha2::{Digest, Sha256};

pub use call::{Call, CallError};

/// Account allowed to dispatch root-only calls (`clear`).
pub const SUDO_ACCOUNT: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

// =============================================================================
// RECORD ID
// =============================================================================

/// 32-byte hash, rendered as `0x`-prefixed lowercase hex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct H256(pub [u8; 32]);

/// Storage key of a record.
pub type RecordId = H256;

impl H256 {
    /// SHA-256 over the concatenation of `parts`.
    #[must_use]
    pub fn hash_of(parts: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        digest_id(hasher)
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hash `{0}`")]
pub struct ParseHashError(pub String);

impl FromStr for H256 {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseHashError(s.to_owned());
        let hex = s.strip_prefix("0x").unwrap_or(s);
        if hex.len() != 64 || !hex.is_ascii() {
            return Err(err());
        }
        let mut out = [0u8; 32];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| err())?;
        }
        Ok(Self(out))
    }
}

impl Serialize for H256 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// =============================================================================
// STORAGE ITEM
// =============================================================================

/// Value stored under each [`RecordId`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageItem {
    pub num: u32,
    pub action: Action,
    pub storer: String,
}

impl StorageItem {
    /// Wire form of this item under `id`.
    #[must_use]
    pub fn to_record(&self, id: RecordId) -> Record {
        Record {
            id: id.to_string(),
            num: Some(self.num),
            action: self.action.as_str().to_owned(),
            storer: self.storer.clone(),
        }
    }

    fn hash_with_nonce(&self, nonce: u64) -> RecordId {
        let mut hasher = Sha256::new();
        hasher.update(self.num.to_le_bytes());
        hasher.update([action_index(self.action)]);
        hasher.update(self.storer.as_bytes());
        hasher.update(nonce.to_le_bytes());
        digest_id(hasher)
    }
}

fn digest_id(hasher: Sha256) -> H256 {
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    H256(out)
}

fn action_index(action: Action) -> u8 {
    match action {
        Action::Increment => 0,
        Action::Decrement => 1,
        Action::Idle => 2,
    }
}

// =============================================================================
// EVENTS + ERRORS
// =============================================================================

/// Events deposited by successful dispatches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum Event {
    Stored { action: Option<Action>, id: RecordId, storer: String },
    Cleared { removed: u32 },
    ActionChanged { storer: String, id: RecordId, action: Option<Action> },
    Incremented { sender: String, id: RecordId, action: Action },
    Decremented { sender: String, id: RecordId, action: Action },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("value is below the storage minimum")]
    NegativeNumber,
    #[error("action must be Increment, Decrement or Idle")]
    InvalidActionType,
    #[error("an operation would lead to an overflow")]
    Overflow,
    #[error("an operation would lead to an underflow")]
    Underflow,
    #[error("only the storer may change this item")]
    NotStorageOwner,
    #[error("the storer cannot execute their own item")]
    OwnerCannotExecute,
    #[error("storage item {0} does not exist")]
    ItemNotExist(RecordId),
    #[error("origin is not allowed to dispatch this call")]
    BadOrigin,
}

impl crate::frame::ErrorCode for RuntimeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NegativeNumber => "storagechain.NegativeNumber",
            Self::InvalidActionType => "storagechain.InvalidActionType",
            Self::Overflow => "storagechain.Overflow",
            Self::Underflow => "storagechain.Underflow",
            Self::NotStorageOwner => "storagechain.NotStorageOwner",
            Self::OwnerCannotExecute => "storagechain.OwnerCannotExecute",
            Self::ItemNotExist(_) => "storagechain.ItemNotExist",
            Self::BadOrigin => "system.BadOrigin",
        }
    }
}

// =============================================================================
// BLOCKS
// =============================================================================

/// Header of a sealed block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    pub number: u32,
    pub hash: H256,
    pub parent_hash: H256,
}

// =============================================================================
// RUNTIME
// =============================================================================

pub struct Runtime {
    counts_of_storage: u32,
    storages: BTreeMap<RecordId, StorageItem>,
    storage_minimum: u32,
    nonce: u64,
    revision: u64,
    head: BlockHeader,
    rng: StdRng,
}

impl Runtime {
    #[must_use]
    pub fn new(storage_minimum: u32) -> Self {
        Self::with_rng(storage_minimum, StdRng::from_os_rng())
    }

    /// Deterministic runtime for tests and replays.
    #[must_use]
    pub fn seeded(storage_minimum: u32, seed: u64) -> Self {
        Self::with_rng(storage_minimum, StdRng::seed_from_u64(seed))
    }

    fn with_rng(storage_minimum: u32, rng: StdRng) -> Self {
        let genesis = H256([0; 32]);
        Self {
            counts_of_storage: 0,
            storages: BTreeMap::new(),
            storage_minimum,
            nonce: 0,
            revision: 0,
            head: BlockHeader { number: 0, hash: genesis, parent_hash: genesis },
            rng,
        }
    }

    #[must_use]
    pub fn counts_of_storage(&self) -> u32 {
        self.counts_of_storage
    }

    #[must_use]
    pub fn storage(&self, id: &RecordId) -> Option<&StorageItem> {
        self.storages.get(id)
    }

    /// Every entry in key order.
    pub fn entries(&self) -> impl Iterator<Item = (RecordId, &StorageItem)> {
        self.storages.iter().map(|(id, item)| (*id, item))
    }

    /// Look up a batch of keys, preserving request order.
    #[must_use]
    pub fn multi(&self, ids: &[RecordId]) -> Vec<Option<Record>> {
        ids.iter()
            .map(|id| self.storages.get(id).map(|item| item.to_record(*id)))
            .collect()
    }

    /// Counter bumped by every storage write.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn head(&self) -> &BlockHeader {
        &self.head
    }

    /// Apply one signed call. State is untouched when an error is returned.
    ///
    /// # Errors
    ///
    /// Returns the pallet error describing why the call was rejected.
    pub fn dispatch(&mut self, signer: &str, call: Call) -> Result<Vec<Event>, RuntimeError> {
        match call {
            Call::Store { val_to_add, action } => self.store(signer, val_to_add, action),
            Call::ChangeAction { storage_id, new_action } => self.change_action(signer, storage_id, new_action),
            Call::Execute { storage_id, action } => self.execute(signer, storage_id, action),
            Call::Clear => self.clear(signer),
        }
    }

    /// Seal the current block over the given extrinsic hashes.
    pub fn seal_block(&mut self, extrinsics: &[H256]) -> BlockHeader {
        let number = self.head.number + 1;
        let mut hasher = Sha256::new();
        hasher.update(self.head.hash.0);
        hasher.update(number.to_le_bytes());
        for ext in extrinsics {
            hasher.update(ext.0);
        }
        let header = BlockHeader { number, hash: digest_id(hasher), parent_hash: self.head.hash };
        self.head = header.clone();
        header
    }

    fn store(&mut self, storer: &str, val_to_add: u32, action: Option<Action>) -> Result<Vec<Event>, RuntimeError> {
        if val_to_add < self.storage_minimum {
            return Err(RuntimeError::NegativeNumber);
        }
        let new_count = self
            .counts_of_storage
            .checked_add(1)
            .ok_or(RuntimeError::Overflow)?;

        let item = StorageItem {
            num: val_to_add,
            action: action.unwrap_or_else(|| self.random_action()),
            storer: storer.to_owned(),
        };
        let id = item.hash_with_nonce(self.nonce);
        self.nonce += 1;

        self.storages.insert(id, item);
        self.counts_of_storage = new_count;
        self.revision += 1;

        tracing::info!(record_id = %id, "runtime: storage item added");
        Ok(vec![Event::Stored { action, id, storer: storer.to_owned() }])
    }

    fn change_action(
        &mut self,
        sender: &str,
        storage_id: RecordId,
        new_action: Option<Action>,
    ) -> Result<Vec<Event>, RuntimeError> {
        let item = self
            .storages
            .get_mut(&storage_id)
            .ok_or(RuntimeError::ItemNotExist(storage_id))?;
        if item.storer != sender {
            return Err(RuntimeError::NotStorageOwner);
        }
        let action = new_action.ok_or(RuntimeError::InvalidActionType)?;

        item.action = action;
        self.revision += 1;

        tracing::info!(record_id = %storage_id, %action, "runtime: storage item updated");
        Ok(vec![Event::ActionChanged { storer: sender.to_owned(), id: storage_id, action: new_action }])
    }

    fn execute(
        &mut self,
        sender: &str,
        storage_id: RecordId,
        action: Option<Action>,
    ) -> Result<Vec<Event>, RuntimeError> {
        let item = self
            .storages
            .get_mut(&storage_id)
            .ok_or(RuntimeError::ItemNotExist(storage_id))?;
        if item.storer == sender {
            return Err(RuntimeError::OwnerCannotExecute);
        }

        let event = match action {
            Some(action @ Action::Increment) => {
                item.num = item.num.checked_add(1).ok_or(RuntimeError::Overflow)?;
                Event::Incremented { sender: sender.to_owned(), id: storage_id, action }
            }
            Some(action @ Action::Decrement) => {
                item.num = item.num.checked_sub(1).ok_or(RuntimeError::Underflow)?;
                Event::Decremented { sender: sender.to_owned(), id: storage_id, action }
            }
            Some(Action::Idle) | None => return Ok(Vec::new()),
        };
        self.revision += 1;

        Ok(vec![event])
    }

    fn clear(&mut self, sender: &str) -> Result<Vec<Event>, RuntimeError> {
        if sender != SUDO_ACCOUNT {
            return Err(RuntimeError::BadOrigin);
        }
        let removed = self.counts_of_storage;
        self.storages.clear();
        self.counts_of_storage = 0;
        self.revision += 1;
        Ok(vec![Event::Cleared { removed }])
    }

    fn random_action(&mut self) -> Action {
        match self.rng.random::<u8>() % 3 {
            0 => Action::Increment,
            1 => Action::Decrement,
            _ => Action::Idle,
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
