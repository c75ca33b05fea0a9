mod config;
mod frame;
mod routes;
mod runtime;
mod services;
mod state;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::NodeConfig::from_env();
    let port = config.port;
    tracing::info!(
        port,
        block_time_ms = u64::try_from(config.block_time.as_millis()).unwrap_or(u64::MAX),
        storage_minimum = config.storage_minimum,
        "node configured"
    );

    let state = state::AppState::new(config);

    // Spawn background block author.
    let _author = services::author::spawn_block_author(state.clone());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "storagechain node listening");
    axum::serve(listener, app).await.expect("server failed");
}
