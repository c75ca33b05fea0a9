//! Networking modules for the websocket frame protocol.
//!
//! SYSTEM CONTEXT
//! ==============
//! `frame_client` owns the websocket lifecycle, `router` hands reply frames
//! to whoever issued the request, `chain_api` builds storage queries and
//! extrinsics on top of both, and `types` defines payload parsing.

pub mod chain_api;
pub mod frame_client;
pub mod router;
pub mod subscription;
pub mod tx;
pub mod types;
