//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the storagechain runtime, the pending transaction pool, and a
//! watch channel carrying the runtime revision as of the last sealed block.
//! Subscriptions wake on that channel and re-read the runtime; they never
//! see writes from a block that has not been sealed yet.

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::config::NodeConfig;
use crate::runtime::Runtime;
use crate::services::pool::TxPool;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<NodeConfig>,
    pub runtime: Arc<RwLock<Runtime>>,
    pub pool: TxPool,
    /// Runtime revision published after each block.
    pub revision: Arc<watch::Sender<u64>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: NodeConfig) -> Self {
        let runtime = Runtime::new(config.storage_minimum);
        Self::with_runtime(config, runtime)
    }

    #[must_use]
    pub fn with_runtime(config: NodeConfig, runtime: Runtime) -> Self {
        let (revision, _) = watch::channel(runtime.revision());
        Self {
            config: Arc::new(config),
            runtime: Arc::new(RwLock::new(runtime)),
            pool: TxPool::new(),
            revision: Arc::new(revision),
        }
    }

    /// Receiver that wakes whenever a block changes storage.
    #[must_use]
    pub fn subscribe_revision(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::runtime::{Call, RecordId};
    use frames::Action;

    pub const ALICE: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
    pub const BOB: &str = "5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty";

    /// Test state with a seeded runtime and default config.
    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::with_runtime(NodeConfig::default(), Runtime::seeded(0, 42))
    }

    /// Store a record directly in the runtime, bypassing the pool, and
    /// publish the new revision. Returns the record id.
    pub async fn seed_record(state: &AppState, storer: &str, num: u32, action: Action) -> RecordId {
        let mut runtime = state.runtime.write().await;
        let events = runtime
            .dispatch(storer, Call::Store { val_to_add: num, action: Some(action) })
            .expect("seed store should succeed");
        state.revision.send_replace(runtime.revision());
        match events.first() {
            Some(crate::runtime::Event::Stored { id, .. }) => *id,
            other => panic!("unexpected seed events: {other:?}"),
        }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
