//! Local mirror of storagechain storage.
//!
//! Both lists are replaced wholesale on every update. The identifier list
//! carries a generation number; a `storage:multi` subscription is tagged
//! with the generation it was opened for, and its records are only applied
//! while that generation is still current.

#[cfg(test)]
#[path = "chain_test.rs"]
mod chain_test;

use crate::net::types::{Record, StorageEntry};

#[derive(Clone, Debug, Default)]
pub struct ChainState {
    /// Last `CountsOfStorage` value seen.
    pub count: Option<u32>,
    /// Known record identifiers, in entries-scan order.
    pub ids: Vec<String>,
    /// Bumped whenever `ids` changes.
    pub generation: u64,
    /// Records fetched for `ids`.
    pub records: Vec<Record>,
    /// Generation `records` was fetched for.
    pub records_generation: Option<u64>,
}

impl ChainState {
    pub fn apply_count(&mut self, count: u32) -> bool {
        let changed = self.count != Some(count);
        self.count = Some(count);
        changed
    }

    /// Replace the identifier list from an entries scan. Returns `true`
    /// when the list changed and a new generation started.
    pub fn apply_entries(&mut self, entries: Vec<StorageEntry>) -> bool {
        let ids: Vec<String> = entries.into_iter().map(|entry| entry.key).collect();
        if ids == self.ids {
            return false;
        }
        self.ids = ids;
        self.generation += 1;
        true
    }

    /// Replace the record list with a `storage:multi` notification tagged
    /// `generation`. Stale notifications are dropped and return `false`.
    /// Keys with no value (removed between scan and fetch) are skipped.
    pub fn apply_records(&mut self, generation: u64, records: Vec<Option<Record>>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.records = records.into_iter().flatten().collect();
        self.records_generation = Some(generation);
        true
    }

    /// Whether the displayed records belong to the current identifier list.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.records_generation == Some(self.generation)
    }
}
