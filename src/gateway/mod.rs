//! HTTP gateway
//!
//! JSON transport over [`crate::rpc::BankService`]: every RPC is
//! `POST /v1/<method>`, `GET /health` pings the store, Swagger UI lives
//! at `/docs`.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod openapi;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::{Next, from_fn},
    response::Response,
    routing::{get, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use error::{ApiError, ErrorBody};
pub use state::AppState;

/// One log line per request, level by status class
async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;
    if response.status().is_server_error() {
        tracing::error!(%method, %path, status, latency_ms, "request failed");
    } else if response.status().is_client_error() {
        tracing::warn!(%method, %path, status, latency_ms, "request rejected");
    } else {
        tracing::info!(%method, %path, status, latency_ms, "request served");
    }
    response
}

/// All routes, without a listener
pub fn build_router(state: Arc<AppState>) -> Router {
    let rpc = Router::new()
        .route("/create_user", post(handlers::create_user))
        .route("/login_user", post(handlers::login_user))
        .route("/renew_access", post(handlers::renew_access))
        .route("/create_account", post(handlers::create_account))
        .route("/get_account", post(handlers::get_account))
        .route("/list_accounts", post(handlers::list_accounts))
        .route("/update_account", post(handlers::update_account))
        .route("/delete_account", post(handlers::delete_account))
        .route("/create_transfer", post(handlers::create_transfer))
        .route("/get_transfer", post(handlers::get_transfer));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", rpc)
        .layer(from_fn(log_requests))
        .with_state(state)
        // Stateless, merged after with_state
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Serve until Ctrl-C
pub async fn run_server(addr: SocketAddr, state: Arc<AppState>) -> std::io::Result<()> {
    let app = build_router(state);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Gateway listening");
    tracing::info!("API docs: http://{}/docs", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
