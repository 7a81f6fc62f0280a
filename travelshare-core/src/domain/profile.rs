//! Profile domain model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscription tier controlling the post-count limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanLevel {
    #[default]
    Free,
    Premium,
}

impl PlanLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanLevel::Free => "free",
            PlanLevel::Premium => "premium",
        }
    }
}

/// Per-user application record, paired 1:1 with an identity
///
/// Created at registration, mutated by rename or the premium upgrade
/// flow, and cascade-owned by the identity. `id` is the identity id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub plan_level: PlanLevel,
}

impl Profile {
    pub fn new(id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            plan_level: PlanLevel::Free,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_defaults_to_free() {
        let profile = Profile::new(Uuid::new_v4(), "wanderer");
        assert_eq!(profile.plan_level, PlanLevel::Free);
    }

    #[test]
    fn test_plan_level_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&PlanLevel::Premium).unwrap(),
            "\"premium\""
        );
        let parsed: PlanLevel = serde_json::from_str("\"free\"").unwrap();
        assert_eq!(parsed, PlanLevel::Free);
    }
}
