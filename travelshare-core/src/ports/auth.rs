//! Auth provider port
//!
//! Defines the interface to the backend's auth subsystem. The session
//! store consumes the auth-change stream; everything else goes through
//! the request/response methods.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::result::Result;
use crate::domain::AuthSession;

/// Auth state transition emitted by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    InitialSession,
    TokenRefreshed,
}

/// A single auth-change notification
#[derive(Debug, Clone)]
pub struct AuthChange {
    pub event: AuthEvent,
    pub session: Option<AuthSession>,
}

/// Backend auth subsystem abstraction
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Sign in with email and password
    ///
    /// Bad credentials surface as an auth error, never retried.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Register a new identity
    ///
    /// Duplicate registration surfaces the backend's auth error.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Sign out the current identity
    ///
    /// Clears the provider's local session and emits a `SignedOut`
    /// change; the session store reacts to that.
    async fn sign_out(&self) -> Result<()>;

    /// Fetch the persisted session, if any
    async fn get_session(&self) -> Result<Option<AuthSession>>;

    /// Subscribe to auth state changes
    fn subscribe(&self) -> broadcast::Receiver<AuthChange>;
}
