//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds HTTP + websocket endpoints and stitches API routes with
//! Leptos SSR rendering under a single Axum router. When no Leptos
//! configuration is available the node serves the API alone.

pub mod rest;
pub mod ws;

use std::path::PathBuf;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use leptos::prelude::*;
use leptos_axum::{LeptosRoutes, generate_route_list};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// API routes shared by the SSR app, the CLI and websocket clients.
pub fn api_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/ws", get(ws::handle_ws))
        .route("/api/accounts", get(rest::accounts))
        .route("/api/storages", get(rest::storages))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API routes + Leptos SSR app + static `/pkg` assets.
///
/// # Errors
///
/// Returns an error if the Leptos configuration cannot be loaded (missing or
/// malformed `Cargo.toml` `[package.metadata.leptos]` section).
pub fn leptos_app(state: AppState) -> Result<Router, String> {
    let conf = get_configuration(None).map_err(|e| format!("leptos configuration: {e}"))?;
    let leptos_options = conf.leptos_options;
    let routes = generate_route_list(client::app::App);

    let leptos_router = Router::new()
        .leptos_routes(&leptos_options, routes, {
            let opts = leptos_options.clone();
            move || client::app::shell(opts.clone())
        })
        .with_state(leptos_options.clone());

    let site_root_path = PathBuf::from(leptos_options.site_root.as_ref());

    Ok(api_routes(state)
        .merge(leptos_router)
        .nest_service("/pkg", ServeDir::new(site_root_path.join("pkg"))))
}

/// Full router: the Leptos app when configured, otherwise the API alone.
pub fn app(state: AppState) -> Router {
    match leptos_app(state.clone()) {
        Ok(router) => router,
        Err(e) => {
            tracing::warn!(error = %e, "leptos app unavailable; serving API routes only");
            api_routes(state)
        }
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
