//! Auth service - sign-in, registration, sign-out

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::{AuthSession, Profile};
use crate::ports::{AuthProvider, TableStore};

/// Orchestrates the auth flows around the backend's auth subsystem
pub struct AuthService {
    auth: Arc<dyn AuthProvider>,
    tables: Arc<dyn TableStore>,
}

impl AuthService {
    pub fn new(auth: Arc<dyn AuthProvider>, tables: Arc<dyn TableStore>) -> Self {
        Self { auth, tables }
    }

    /// Sign in with email and password
    ///
    /// Bad credentials surface directly and are never retried. On
    /// success the provider emits a `SignedIn` change and the session
    /// store re-enriches from that.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        self.auth.sign_in_with_password(email, password).await
    }

    /// Register a new account and its paired profile row
    ///
    /// The profile starts on the free plan. Duplicate registration
    /// surfaces the backend's auth error before any profile insert.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<AuthSession> {
        let session = self.auth.sign_up(email, password).await?;
        let profile = Profile::new(session.user.id, username);
        if let Err(e) = self.tables.insert_profile(&profile).await {
            // Identity exists but its profile could not be created; the
            // user signs in as a bare identity until a retry succeeds.
            tracing::error!(user_id = %session.user.id, error = %e, "profile creation failed after sign-up");
            return Err(e);
        }
        Ok(session)
    }

    /// Sign out the current identity
    pub async fn sign_out(&self) -> Result<()> {
        self.auth.sign_out().await
    }
}
