//! Entitlement evaluation
//!
//! Entitlements are derived boolean capabilities computed from the
//! enriched user. They are never stored: every check re-evaluates, so a
//! plan upgrade or admin config change is reflected immediately and no
//! stale-privilege state can exist.

use serde::Serialize;

use super::profile::PlanLevel;
use super::user::EnrichedUser;

/// Derived capabilities of the current user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Entitlements {
    pub is_premium: bool,
    pub is_admin: bool,
}

impl Entitlements {
    /// Evaluate entitlements for a user
    ///
    /// Pure function, no I/O. The admin check is a byte-exact email
    /// comparison: case-sensitive, no normalization.
    pub fn evaluate(user: &EnrichedUser, admin_email: &str) -> Self {
        Self {
            is_premium: user.plan_level() == PlanLevel::Premium,
            is_admin: user.email() == admin_email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::Identity;
    use crate::domain::profile::Profile;
    use uuid::Uuid;

    const ADMIN: &str = "admin@travelshare.app";

    fn bare_user(email: &str) -> EnrichedUser {
        EnrichedUser::bare(Identity::new(Uuid::new_v4(), email))
    }

    #[test]
    fn test_missing_profile_is_never_premium() {
        let ent = Entitlements::evaluate(&bare_user("a@b.c"), ADMIN);
        assert!(!ent.is_premium);
    }

    #[test]
    fn test_premium_profile_is_premium() {
        let id = Uuid::new_v4();
        let mut profile = Profile::new(id, "wanderer");
        profile.plan_level = PlanLevel::Premium;
        let user = EnrichedUser::enriched(Identity::new(id, "a@b.c"), profile);
        assert!(Entitlements::evaluate(&user, ADMIN).is_premium);
    }

    #[test]
    fn test_admin_requires_exact_email_match() {
        assert!(Entitlements::evaluate(&bare_user(ADMIN), ADMIN).is_admin);
        assert!(!Entitlements::evaluate(&bare_user("other@travelshare.app"), ADMIN).is_admin);
    }

    #[test]
    fn test_admin_check_is_case_sensitive() {
        // No implicit normalization: a differing-case email is not admin.
        assert!(!Entitlements::evaluate(&bare_user("Admin@travelshare.app"), ADMIN).is_admin);
    }
}
