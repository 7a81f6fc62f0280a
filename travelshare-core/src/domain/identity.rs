//! Identity and session domain models
//!
//! An [`Identity`] is the authenticated subject issued by the backend's
//! auth subsystem. It is created on sign-in, destroyed on sign-out or
//! session expiry, and owned by the backend; the session store only
//! caches it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated subject returned by the auth subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

impl Identity {
    pub fn new(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

/// A persisted auth session: the identity plus its validity window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: Identity,
    pub access_token: String,
    /// Session validity end, when the backend reports one
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    /// Whether the session's validity window has passed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= now,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(expires_at: Option<DateTime<Utc>>) -> AuthSession {
        AuthSession {
            user: Identity::new(Uuid::new_v4(), "someone@example.com"),
            access_token: "token".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_session_without_expiry_never_expires() {
        assert!(!session(None).is_expired(Utc::now()));
    }

    #[test]
    fn test_session_expiry_window() {
        let now = Utc::now();
        assert!(session(Some(now - Duration::minutes(1))).is_expired(now));
        assert!(!session(Some(now + Duration::minutes(1))).is_expired(now));
    }
}
