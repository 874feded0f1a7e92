//! Auth session store.
//!
//! Holds the current authenticated identity and bearer token as an
//! observable value. The store is the only writer of the session; the
//! request wrapper reads it on every authenticated call and clears it on
//! a 401 response.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// The current authenticated identity: a bearer token plus whatever
/// profile data the identity provider yielded. Expiry is implicit; the
/// store holds the token until sign-out or a 401 invalidates it.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user: None,
        }
    }
}

/// Profile fields published by the identity provider.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Abstraction over the identity provider's session resolution. A
/// misconfigured or failing provider degrades to the unauthenticated
/// state; it never brings the process down.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn current_session(&self) -> anyhow::Result<Option<Session>>;
}

/// Observable store for the current session.
///
/// Cloning the store shares the underlying channel, so every client holds
/// the same view. `clear` reports whether it actually removed a session,
/// which is what makes the 401 handling idempotent under concurrent
/// in-flight requests.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Option<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Current session, if signed in.
    pub fn get(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    /// Current bearer token, if signed in.
    pub fn token(&self) -> Option<String> {
        self.tx.borrow().as_ref().map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Publish a new session (sign-in or token refresh).
    pub fn set(&self, session: Session) {
        debug!("session installed");
        self.tx.send_replace(Some(session));
    }

    /// Clear the session. Returns true only if a session was actually
    /// removed, so racing callers observe exactly one transition.
    pub fn clear(&self) -> bool {
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                *current = None;
                true
            } else {
                false
            }
        })
    }

    /// Subscribe to session changes. The receiver yields the new value on
    /// every sign-in, refresh, and sign-out.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }

    /// Resolve the session from an identity provider and publish the
    /// outcome. Provider failures are logged and leave the store
    /// unauthenticated.
    pub async fn resolve_from(&self, provider: &dyn TokenSource) {
        match provider.current_session().await {
            Ok(Some(session)) => self.set(session),
            Ok(None) => {
                self.clear();
            }
            Err(e) => {
                warn!("Identity provider unavailable, staying signed out: {}", e);
                self.clear();
            }
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenProvider;

    #[async_trait]
    impl TokenSource for BrokenProvider {
        async fn current_session(&self) -> anyhow::Result<Option<Session>> {
            Err(anyhow::anyhow!("provider misconfigured"))
        }
    }

    struct FixedProvider(Session);

    #[async_trait]
    impl TokenSource for FixedProvider {
        async fn current_session(&self) -> anyhow::Result<Option<Session>> {
            Ok(Some(self.0.clone()))
        }
    }

    #[test]
    fn test_set_get_clear() {
        let store = SessionStore::new();
        assert!(!store.is_authenticated());

        store.set(Session::from_token("tok-1"));
        assert_eq!(store.token().as_deref(), Some("tok-1"));

        assert!(store.clear());
        assert!(store.get().is_none());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = SessionStore::new();
        store.set(Session::from_token("tok-1"));
        assert!(store.clear());
        assert!(!store.clear());
        assert!(!store.clear());
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::new();
        let other = store.clone();
        store.set(Session::from_token("tok-1"));
        assert_eq!(other.token().as_deref(), Some("tok-1"));
        assert!(other.clear());
        assert!(store.get().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();

        store.set(Session::from_token("tok-1"));
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_some());

        store.clear();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }

    #[tokio::test]
    async fn test_broken_provider_degrades_to_signed_out() {
        let store = SessionStore::new();
        store.set(Session::from_token("stale"));
        store.resolve_from(&BrokenProvider).await;
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_provider_session_installed() {
        let store = SessionStore::new();
        store.resolve_from(&FixedProvider(Session::from_token("fresh"))).await;
        assert_eq!(store.token().as_deref(), Some("fresh"));
    }
}
