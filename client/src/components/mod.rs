//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render storage records and the dialogs that act on them.
//! Shared state arrives through an explicit `AppContext` prop; each
//! component keeps only its own transient form state.

pub mod account_selector;
pub mod change_action_modal;
pub mod execute_action_modal;
pub mod record_card;
pub mod record_list;
pub mod tx_button;

/// Placeholder for free-text action inputs.
pub const ACTION_PLACEHOLDER: &str = "Choose either of Increment, Decrement, or Idle";
