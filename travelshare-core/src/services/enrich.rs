//! Profile enrichment - merge a raw identity with its profile row

use std::sync::Arc;

use crate::domain::{EnrichedUser, Identity};
use crate::ports::TableStore;

/// Joins a raw identity with its profile record
///
/// Enrichment is deliberately infallible from the caller's point of
/// view: a fetch failure (network, row-level-security denial) is logged
/// and the bare identity is returned, so a broken profile read degrades
/// the user instead of blocking sign-in. A missing row is not a failure;
/// it simply yields a profile-less user, which downstream entitlement
/// checks treat as the free plan.
pub struct ProfileEnricher {
    tables: Arc<dyn TableStore>,
}

impl ProfileEnricher {
    pub fn new(tables: Arc<dyn TableStore>) -> Self {
        Self { tables }
    }

    /// Fetch the profile for an identity and merge
    pub async fn enrich(&self, identity: Identity) -> EnrichedUser {
        match self.tables.get_profile(identity.id).await {
            Ok(Some(profile)) => EnrichedUser::enriched(identity, profile),
            Ok(None) => {
                tracing::debug!(user_id = %identity.id, "no profile row for identity");
                EnrichedUser::bare(identity)
            }
            Err(e) => {
                tracing::warn!(user_id = %identity.id, error = %e, "profile enrichment failed, falling back to bare identity");
                EnrichedUser::bare(identity)
            }
        }
    }
}
