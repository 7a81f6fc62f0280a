//! Upgrade service - the free-to-premium flow

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{EnrichedUser, PlanLevel};
use crate::ports::TableStore;
use crate::services::session::SessionStore;

/// Premium upgrade flow
pub struct UpgradeService {
    tables: Arc<dyn TableStore>,
    session: Arc<SessionStore>,
}

impl UpgradeService {
    pub fn new(tables: Arc<dyn TableStore>, session: Arc<SessionStore>) -> Self {
        Self { tables, session }
    }

    /// Username to display on the upgrade page
    pub async fn current_username(&self, user_id: Uuid) -> Result<Option<String>> {
        Ok(self
            .tables
            .get_profile(user_id)
            .await?
            .map(|profile| profile.username))
    }

    /// Upgrade the user's plan to premium
    ///
    /// Updates the profile row, then forces a session refresh so the
    /// new plan level is reflected in entitlements immediately instead
    /// of waiting for the next auth event. Already-premium users are a
    /// no-op.
    pub async fn upgrade(&self, user: &EnrichedUser) -> Result<()> {
        if user.plan_level() == PlanLevel::Premium {
            return Ok(());
        }
        self.tables
            .update_plan_level(user.id(), PlanLevel::Premium)
            .await?;
        self.session.refresh().await;
        Ok(())
    }
}
