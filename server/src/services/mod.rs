//! Domain services used by websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own chain logic (pool, block authoring, storage reads,
//! subscriptions) so route handlers can stay focused on protocol
//! translation.

pub mod author;
pub mod pool;
pub mod storage;
pub mod subscription;
