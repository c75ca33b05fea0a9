//! REST snapshots for tooling that does not speak the frame protocol.

use axum::Json;
use axum::extract::State;
use frames::{AccountInfo, StorageEntry};

use crate::services;
use crate::state::AppState;

/// `GET /api/accounts`
pub async fn accounts() -> Json<Vec<AccountInfo>> {
    Json(AccountInfo::dev_accounts())
}

/// `GET /api/storages`: every entry as of the last write.
pub async fn storages(State(state): State<AppState>) -> Json<Vec<StorageEntry>> {
    let runtime = state.runtime.read().await;
    Json(services::storage::entry_list(&runtime))
}

#[cfg(test)]
#[path = "rest_test.rs"]
mod tests;
