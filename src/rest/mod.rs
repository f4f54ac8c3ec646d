//! REST API for helpdesk tickets.
//!
//! Exposes the state workflow (catalogue and dry-run validation) and the
//! ticket lifecycle over HTTP. Every state change goes through the same
//! validator as the CLI.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post, put},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod dto;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::ApiState;

/// Build the API router with all routes
pub fn build_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health endpoints
        .route("/api/v1/health", get(routes::health::health))
        .route("/api/v1/openapi.json", get(openapi_json))
        // Workflow endpoints
        .route("/api/v1/states", get(routes::states::list))
        .route(
            "/api/v1/states/:state/allowed",
            get(routes::states::allowed),
        )
        .route(
            "/api/v1/transitions/validate",
            post(routes::states::validate),
        )
        // Ticket endpoints
        .route(
            "/api/v1/tickets",
            get(routes::tickets::list).post(routes::tickets::create),
        )
        .route("/api/v1/tickets/:id", get(routes::tickets::get_one))
        .route(
            "/api/v1/tickets/:id/technician",
            put(routes::tickets::assign),
        )
        .route(
            "/api/v1/tickets/:id/transitions",
            post(routes::tickets::transition),
        )
        .route("/api/v1/tickets/:id/rating", post(routes::tickets::rate))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi;
    Json(ApiDoc::openapi())
}

/// Start the REST API server; returns after Ctrl-C
pub async fn serve(state: ApiState, host: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;

    tracing::info!("REST API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("REST API server stopping");
        })
        .await?;

    Ok(())
}
