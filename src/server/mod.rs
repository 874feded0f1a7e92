//! Backend-for-frontend server: the auth gate plus the thin routes that
//! sit between the browser app and the processing backend.

use anyhow::Result;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::ProcessingStatus;

pub mod auth;
pub mod handlers;

pub use auth::{
    AuthedUser, Claims, InMemoryUserDirectory, Rejection, StaticTokenVerifier, TokenVerifier,
    UserDirectory, VerifyError,
};

/// Shared application state. The verifier and directory are trait objects
/// so deployments can plug in their identity provider and persistence.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn TokenVerifier>,
    pub users: Arc<dyn UserDirectory>,
    pub jobs: Arc<RwLock<HashMap<String, ProcessingStatus>>>,
}

impl AppState {
    pub fn new(verifier: Arc<dyn TokenVerifier>, users: Arc<dyn UserDirectory>) -> Self {
        Self {
            verifier,
            users,
            jobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

/// Build the BFF router with CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/auth/register", post(handlers::register))
        .route(
            "/api/v1/youtube/process/:video_id",
            post(handlers::process_video),
        )
        .route(
            "/api/v1/youtube/status/:job_id",
            get(handlers::job_status),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Bind and serve the BFF.
pub async fn start_http_server(state: AppState, port: u16) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("🌐 BFF server listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await?;
    Ok(())
}
