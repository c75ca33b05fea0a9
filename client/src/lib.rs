//! # client
//!
//! Leptos + WASM front end for the storagechain dev node.
//!
//! The page mirrors on-chain storage through websocket subscriptions and
//! submits signed extrinsics. `state` holds the reactive models, `net` the
//! frame transport and chain API, `components` and `pages` the views.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;

/// WASM entry point: hydrate the server-rendered shell.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::hydrate_body(app::App);
}
