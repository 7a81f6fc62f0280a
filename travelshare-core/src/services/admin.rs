//! Admin service - moderation dashboard flows
//!
//! Every operation re-checks the admin entitlement before issuing a
//! request; a non-admin caller is denied without any network call. The
//! backend's policy independently enforces the same override.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{EnrichedUser, Entitlements, TripWithAuthor};
use crate::ports::{object_path_from_url, ObjectStore, TableStore, TRIP_PHOTOS_BUCKET};

/// Moderation flows for the admin dashboard
pub struct AdminService {
    tables: Arc<dyn TableStore>,
    storage: Arc<dyn ObjectStore>,
    admin_email: String,
}

impl AdminService {
    pub fn new(
        tables: Arc<dyn TableStore>,
        storage: Arc<dyn ObjectStore>,
        admin_email: impl Into<String>,
    ) -> Self {
        Self {
            tables,
            storage,
            admin_email: admin_email.into(),
        }
    }

    fn require_admin(&self, user: &EnrichedUser) -> Result<()> {
        if Entitlements::evaluate(user, &self.admin_email).is_admin {
            Ok(())
        } else {
            Err(Error::denied("admin access required"))
        }
    }

    /// Every trip with its author, newest first
    ///
    /// The search term filters on author username or trip title, case
    /// insensitively, applied client side like the original dashboard.
    pub async fn list_all_trips(
        &self,
        user: &EnrichedUser,
        search: Option<&str>,
    ) -> Result<Vec<TripWithAuthor>> {
        self.require_admin(user)?;
        let trips = self.tables.list_trips().await?;
        Ok(match search {
            Some(term) if !term.trim().is_empty() => {
                let needle = term.to_lowercase();
                trips
                    .into_iter()
                    .filter(|t| {
                        t.author_username
                            .as_deref()
                            .map(|name| name.to_lowercase().contains(&needle))
                            .unwrap_or(false)
                            || t.trip.title.to_lowercase().contains(&needle)
                    })
                    .collect()
            }
            _ => trips,
        })
    }

    /// Delete any trip by id (admin override path)
    pub async fn delete_trip(&self, user: &EnrichedUser, id: Uuid) -> Result<()> {
        self.require_admin(user)?;

        let existing = self
            .tables
            .get_trip(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("trip {id}")))?;

        self.tables.delete_trip(id, None).await?;

        if let Some(photo_url) = existing.trip.photo_url {
            if let Some(path) = object_path_from_url(&photo_url, TRIP_PHOTOS_BUCKET) {
                if let Err(e) = self.storage.remove(TRIP_PHOTOS_BUCKET, &[path]).await {
                    tracing::warn!(error = %e, trip_id = %id, "failed to remove photo for deleted trip");
                }
            }
        }
        Ok(())
    }
}
