//! Server-side auth gate.
//!
//! Per-request state machine: read the bearer header, verify the token
//! against the identity provider, then look up (or lazily create) the
//! local user record keyed by the provider's subject identifier. Every
//! request is verified independently; there is no session cache.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::models::User;

use super::AppState;

/// Claims extracted from a verified identity token.
#[derive(Debug, Clone)]
pub struct Claims {
    /// Provider subject identifier
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid or expired token")]
    Invalid,
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Verifies bearer tokens against the identity provider.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Claims, VerifyError>;
}

/// Persists local user records keyed by provider subject.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_or_create(&self, claims: &Claims) -> anyhow::Result<User>;
}

/// Error response emitted by the gate and the handlers, always as
/// `{"detail": message}`.
#[derive(Debug)]
pub struct Rejection {
    pub status: StatusCode,
    pub message: String,
}

impl Rejection {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "detail": self.message })),
        )
            .into_response()
    }
}

/// Run the gate for one request. Terminal failures: missing or malformed
/// header → 401; failed verification → 401; directory failure → 500.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, Rejection> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Rejection::unauthorized("Missing Authorization header"))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| Rejection::unauthorized("Malformed Authorization header"))?;

    let claims = state.verifier.verify(token).await.map_err(|e| {
        warn!("Token verification failed: {}", e);
        Rejection::unauthorized("Invalid or expired token")
    })?;

    let user = state.users.find_or_create(&claims).await.map_err(|e| {
        error!("User directory failure for {}: {}", claims.uid, e);
        Rejection::internal("Failed to load user record")
    })?;

    Ok(user)
}

/// Extractor that runs the auth gate and hands the user to the handler.
pub struct AuthedUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthedUser {
    type Rejection = Rejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(state, &parts.headers).await.map(AuthedUser)
    }
}

/// Verifier backed by an explicit token table. Used in tests and local
/// development; production plugs the real identity provider in at the
/// `TokenVerifier` seam.
#[derive(Debug, Default)]
pub struct StaticTokenVerifier {
    tokens: RwLock<HashMap<String, Claims>>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn issue(&self, token: impl Into<String>, claims: Claims) {
        self.tokens.write().await.insert(token.into(), claims);
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        self.tokens
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or(VerifyError::Invalid)
    }
}

/// In-memory user directory.
#[derive(Debug)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, User>>,
    next_id: AtomicI64,
    default_token_limit: u64,
}

impl InMemoryUserDirectory {
    pub fn new(default_token_limit: u64) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            default_token_limit,
        }
    }

    /// Seed a user record directly (tests, fixtures).
    pub async fn insert(&self, user: User) {
        self.users
            .write()
            .await
            .insert(user.provider_uid.clone(), user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_or_create(&self, claims: &Claims) -> anyhow::Result<User> {
        if let Some(user) = self.users.read().await.get(&claims.uid) {
            return Ok(user.clone());
        }

        let mut users = self.users.write().await;
        // Re-check under the write lock in case a concurrent request
        // created the record between the two lock acquisitions.
        if let Some(user) = users.get(&claims.uid) {
            return Ok(user.clone());
        }

        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            provider_uid: claims.uid.clone(),
            email: claims.email.clone().unwrap_or_default(),
            display_name: claims.name.clone(),
            photo_url: claims.picture.clone(),
            token_usage: 0,
            token_limit: self.default_token_limit,
            created_at: Utc::now(),
        };
        info!("👤 Created user record for {}", claims.uid);
        users.insert(claims.uid.clone(), user.clone());
        Ok(user)
    }
}
