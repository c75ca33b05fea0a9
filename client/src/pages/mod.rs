//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration (subscriptions, forms) and
//! delegates rendering details to `components`.

pub mod chain_panel;
