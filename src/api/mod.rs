pub mod error;
pub mod handlers;
pub mod state;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(|| async { "ok" }))
        // ENS
        .route("/api/ens/claim", post(handlers::ens::claim))
        // Schema
        .route("/api/schema", get(handlers::schema::get_schema))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(host: &str, port: u16, ens_base_domain: &str) -> Result<()> {
    let app = router(AppState::new(ens_base_domain));

    let addr = format!("{host}:{port}");
    println!("liqu-flow API server listening on {addr}");
    println!("  Health:   GET  http://{addr}/health");
    println!("  ENS:      POST http://{addr}/api/ens/claim  (under {ens_base_domain})");
    println!("  Schema:   GET  http://{addr}/api/schema");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    axum::serve(listener, app).await.context("running server")?;

    Ok(())
}
