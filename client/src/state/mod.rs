//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! State is split by concern so components depend on small models:
//! `session` tracks the connection and keyring, `chain` mirrors storage,
//! `modal` drives the per-card dialogs.

pub mod chain;
pub mod modal;
pub mod session;
