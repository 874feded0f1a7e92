//! Auth client: sign-in flows and user registration.
//!
//! Successful logins install the returned token into the session store so
//! subsequent calls through `ApiClient` are authenticated.

use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::models::{RegisterResponse, TokenResponse, User};
use crate::session::Session;

use super::ApiClient;

pub struct AuthClient {
    api: Arc<ApiClient>,
}

impl AuthClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Complete an OAuth code exchange and install the session.
    pub async fn login_oauth(&self, provider: &str, code: &str) -> Result<TokenResponse, ApiError> {
        let response: TokenResponse = self
            .api
            .post_public(
                &format!("auth/login/oauth/{}", provider),
                &json!({ "code": code }),
            )
            .await?;

        info!("🔑 Signed in via {}", provider);
        self.api
            .session_store()
            .set(Session::from_token(response.access_token.clone()));
        Ok(response)
    }

    /// Email/password sign-in.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let response: TokenResponse = self
            .api
            .post_public(
                "auth/login",
                &json!({ "email": email, "password": password }),
            )
            .await?;

        info!("🔑 Signed in as {}", email);
        self.api
            .session_store()
            .set(Session::from_token(response.access_token.clone()));
        Ok(response)
    }

    /// Register the identity-provider user with the BFF, presenting the
    /// provider's id token as the bearer credential. Idempotent: an
    /// already-registered user is returned as-is.
    pub async fn register(&self, id_token: &str) -> Result<User, ApiError> {
        let response: RegisterResponse = self
            .api
            .post_with_token("api/auth/register", id_token, &json!({}))
            .await?;
        Ok(response.user)
    }

    /// Drop the session (sign-out).
    pub fn logout(&self) {
        if self.api.session_store().clear() {
            info!("👋 Signed out");
        }
    }
}
