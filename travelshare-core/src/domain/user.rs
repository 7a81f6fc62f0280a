//! Enriched user domain model
//!
//! The ephemeral merge of an [`Identity`] with its [`Profile`]. Held only
//! in the session store's in-memory state, never persisted. Enrichment
//! can fail (network, row-level security); the merge then carries the
//! bare identity and every consumer must tolerate a missing profile.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identity::Identity;
use super::profile::{PlanLevel, Profile};

/// Merge of identity and profile used throughout the app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedUser {
    pub identity: Identity,
    /// None when enrichment failed or the profile row is missing
    pub profile: Option<Profile>,
}

impl EnrichedUser {
    /// A user whose profile fetch failed or returned no row
    pub fn bare(identity: Identity) -> Self {
        Self {
            identity,
            profile: None,
        }
    }

    pub fn enriched(identity: Identity, profile: Profile) -> Self {
        Self {
            identity,
            profile: Some(profile),
        }
    }

    pub fn id(&self) -> Uuid {
        self.identity.id
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }

    /// Plan level, treating a missing profile as free
    pub fn plan_level(&self) -> PlanLevel {
        self.profile
            .as_ref()
            .map(|p| p.plan_level)
            .unwrap_or_default()
    }

    pub fn username(&self) -> Option<&str> {
        self.profile.as_ref().map(|p| p.username.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_user_defaults_to_free() {
        let user = EnrichedUser::bare(Identity::new(Uuid::new_v4(), "a@b.c"));
        assert_eq!(user.plan_level(), PlanLevel::Free);
        assert!(user.username().is_none());
    }

    #[test]
    fn test_enriched_user_carries_profile() {
        let id = Uuid::new_v4();
        let mut profile = Profile::new(id, "wanderer");
        profile.plan_level = PlanLevel::Premium;
        let user = EnrichedUser::enriched(Identity::new(id, "a@b.c"), profile);
        assert_eq!(user.plan_level(), PlanLevel::Premium);
        assert_eq!(user.username(), Some("wanderer"));
    }
}
