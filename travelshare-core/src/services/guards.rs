//! Route guards
//!
//! Two polymorphic guards over a shared capability check. Guards are
//! side-effect-free with respect to data: they never fetch, they only
//! branch on already-resolved session state. Their sole effect is the
//! redirect a denied decision asks the caller to perform.

use crate::domain::Entitlements;
use crate::ports::{Navigator, Route};
use crate::services::session::SessionState;

/// Outcome of a guard check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session determination is not final yet; render a pending state
    Checking,
    /// Access denied; redirect to the given route
    Denied(Route),
    Allowed,
}

/// Guard for routes that require any signed-in user
///
/// While the session store is loading the decision is `Checking`, never
/// a redirect, even when no identity is present yet.
pub fn requires_session(state: &SessionState) -> GuardDecision {
    if state.loading {
        GuardDecision::Checking
    } else if !state.has_identity() {
        GuardDecision::Denied(Route::Landing)
    } else {
        GuardDecision::Allowed
    }
}

/// Guard for admin-only routes: superset of the session check
pub fn requires_admin(state: &SessionState, admin_email: &str) -> GuardDecision {
    if state.loading {
        return GuardDecision::Checking;
    }
    let is_admin = state
        .user
        .as_ref()
        .map(|user| Entitlements::evaluate(user, admin_email).is_admin)
        .unwrap_or(false);
    if !is_admin {
        tracing::warn!("access denied: user is not an admin or not signed in");
        GuardDecision::Denied(Route::Home)
    } else {
        GuardDecision::Allowed
    }
}

impl GuardDecision {
    /// Perform the redirect for a denied decision
    pub fn redirect_if_denied(&self, navigator: &dyn Navigator) {
        if let GuardDecision::Denied(route) = self {
            navigator.navigate(*route);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EnrichedUser, Identity};
    use uuid::Uuid;

    const ADMIN: &str = "admin@travelshare.app";

    fn state(user: Option<EnrichedUser>, loading: bool) -> SessionState {
        SessionState { user, loading }
    }

    fn signed_in(email: &str) -> Option<EnrichedUser> {
        Some(EnrichedUser::bare(Identity::new(Uuid::new_v4(), email)))
    }

    #[test]
    fn test_requires_session_pending_while_loading() {
        // Loading with no identity must render pending, never redirect.
        let decision = requires_session(&state(None, true));
        assert_eq!(decision, GuardDecision::Checking);
    }

    #[test]
    fn test_requires_session_redirects_when_resolved_without_identity() {
        let decision = requires_session(&state(None, false));
        assert_eq!(decision, GuardDecision::Denied(Route::Landing));
    }

    #[test]
    fn test_requires_session_allows_signed_in_user() {
        let decision = requires_session(&state(signed_in("a@b.c"), false));
        assert_eq!(decision, GuardDecision::Allowed);
    }

    #[test]
    fn test_requires_admin_denies_non_admin_to_home() {
        let decision = requires_admin(&state(signed_in("a@b.c"), false), ADMIN);
        assert_eq!(decision, GuardDecision::Denied(Route::Home));
    }

    #[test]
    fn test_requires_admin_allows_admin() {
        let decision = requires_admin(&state(signed_in(ADMIN), false), ADMIN);
        assert_eq!(decision, GuardDecision::Allowed);
    }

    #[test]
    fn test_requires_admin_checking_while_loading() {
        let decision = requires_admin(&state(None, true), ADMIN);
        assert_eq!(decision, GuardDecision::Checking);
    }
}
