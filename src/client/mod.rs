//! HTTP clients for the processing backend.
//!
//! `ApiClient` is the single choke point every authenticated call passes
//! through: it attaches the bearer token from the session store, speaks
//! JSON, normalizes error bodies, and handles 401 by clearing the session
//! and firing the sign-out hook exactly once.

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiError, ErrorEnvelope};
use crate::session::SessionStore;

pub mod auth;
pub mod content;
pub mod videos;

pub use auth::AuthClient;
pub use content::ContentClient;
pub use videos::{PollPolicy, VideoClient};

/// Callback invoked when a 401 response invalidates the session; the UI
/// layer typically redirects to its login view here.
pub type SignOutHook = Arc<dyn Fn() + Send + Sync>;

/// Authenticated JSON client for the processing backend.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    store: SessionStore,
    sign_out_hook: Option<SignOutHook>,
}

impl ApiClient {
    /// Create a client for the given backend origin. The base URL is
    /// normalized to end with a slash so endpoint paths join onto it
    /// instead of replacing its last segment.
    pub fn new(base_url: &str, store: SessionStore) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, store, Duration::from_secs(30))
    }

    pub fn with_timeout(
        base_url: &str,
        store: SessionStore,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let mut normalized = base_url.to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized)
            .map_err(|e| ApiError::Validation(format!("invalid base URL '{}': {}", base_url, e)))?;

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            store,
            sign_out_hook: None,
        })
    }

    /// Register the sign-out hook fired when a 401 clears the session.
    pub fn with_sign_out_hook(mut self, hook: SignOutHook) -> Self {
        self.sign_out_hook = Some(hook);
        self
    }

    pub fn session_store(&self) -> &SessionStore {
        &self.store
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Validation(format!("invalid request path '{}': {}", path, e)))
    }

    /// Build an authenticated request. Fails fast with `Unauthenticated`
    /// when no session exists, before any network dispatch.
    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let token = self.store.token().ok_or(ApiError::Unauthenticated)?;
        Ok(self.http.request(method, self.endpoint(path)?).bearer_auth(token))
    }

    /// Send a built request and classify the response. This is where the
    /// 401 side effect lives: the session is cleared and the sign-out hook
    /// fired only when this request actually removed the session, so
    /// concurrent 401s produce exactly one redirect.
    async fn dispatch(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = read_error_message(response).await;
        debug!("backend returned {}: {}", status, message);

        if status == StatusCode::UNAUTHORIZED {
            if self.store.clear() {
                warn!("🔒 Session invalidated by 401 response");
                if let Some(hook) = &self.sign_out_hook {
                    hook();
                }
            }
            return Err(ApiError::Unauthorized(message));
        }

        Err(ApiError::from_status(status.as_u16(), message))
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.dispatch(self.authed(Method::GET, path)?).await?;
        self.decode(response).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let builder = self.authed(Method::GET, path)?.query(query);
        let response = self.dispatch(builder).await?;
        self.decode(response).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let builder = self.authed(Method::POST, path)?.json(body);
        let response = self.dispatch(builder).await?;
        self.decode(response).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let builder = self.authed(Method::PUT, path)?.json(body);
        let response = self.dispatch(builder).await?;
        self.decode(response).await
    }

    /// PUT against a 200/void endpoint; the response body is discarded.
    pub async fn put_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let builder = self.authed(Method::PUT, path)?.json(body);
        self.dispatch(builder).await.map(|_| ())
    }

    /// POST without requiring a session (login endpoints).
    pub async fn post_public<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let builder = self.http.post(self.endpoint(path)?).json(body);
        let response = self.dispatch(builder).await?;
        self.decode(response).await
    }

    /// POST carrying an explicit bearer token instead of the stored
    /// session (registration presents the provider's id token before any
    /// session exists).
    pub async fn post_with_token<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let builder = self
            .http
            .post(self.endpoint(path)?)
            .bearer_auth(token)
            .json(body);
        let response = self.dispatch(builder).await?;
        self.decode(response).await
    }
}

/// Pull a human-readable message out of an error body: `{"detail": ..}`
/// first, `{"error": ..}` as the legacy fallback, then the status text.
async fn read_error_message(response: Response) -> String {
    let fallback = response
        .status()
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();
    match response.text().await {
        Ok(body) => serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .and_then(|envelope| envelope.message())
            .unwrap_or(fallback),
        Err(_) => fallback,
    }
}
