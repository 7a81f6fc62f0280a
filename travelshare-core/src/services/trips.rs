//! Trip service - list, detail, create, edit, delete flows
//!
//! Every flow requires a resolved session; the guards handle that at
//! the route level, and the owner-scoped table operations mirror the
//! backend's row-level security so a spoofed call still fails server
//! side.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{EnrichedUser, NewTrip, PlanLevel, Trip, TripUpdate, TripWithAuthor};
use crate::ports::{
    object_path_from_url, ChangeFeed, ObjectStore, TableStore, TripSubscription,
    TRIP_PHOTOS_BUCKET,
};

/// Trips a free-plan user may own before the gate closes
pub const MAX_FREE_TRIPS: u64 = 1;

/// Message shown when the free gate blocks a create
pub const FREE_LIMIT_MESSAGE: &str =
    "free plan limit reached: upgrade to premium to post more trips";

/// A photo to attach to a trip
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    fn extension(&self) -> &str {
        self.file_name.rsplit('.').next().unwrap_or("jpg")
    }
}

/// Trip repository flows
pub struct TripService {
    tables: Arc<dyn TableStore>,
    storage: Arc<dyn ObjectStore>,
    changes: Arc<dyn ChangeFeed>,
}

impl TripService {
    pub fn new(
        tables: Arc<dyn TableStore>,
        storage: Arc<dyn ObjectStore>,
        changes: Arc<dyn ChangeFeed>,
    ) -> Self {
        Self {
            tables,
            storage,
            changes,
        }
    }

    /// Public feed, newest first, optionally filtered by search term
    ///
    /// The filter matches title or location name, case-insensitively,
    /// applied client side like the original feed. A transient fetch
    /// failure degrades to an empty feed; the view renders its empty
    /// state rather than an error page.
    pub async fn feed(&self, search: Option<&str>) -> Result<Vec<TripWithAuthor>> {
        let trips = match self.tables.list_trips().await {
            Ok(trips) => trips,
            Err(e) => {
                tracing::warn!(error = %e, "feed fetch failed, rendering empty");
                return Ok(Vec::new());
            }
        };
        Ok(match search {
            Some(term) if !term.trim().is_empty() => {
                let needle = term.to_lowercase();
                trips
                    .into_iter()
                    .filter(|t| {
                        t.trip.title.to_lowercase().contains(&needle)
                            || t.trip.location_name.to_lowercase().contains(&needle)
                    })
                    .collect()
            }
            _ => trips,
        })
    }

    /// Trips owned by the given user, newest first
    pub async fn my_trips(&self, user_id: Uuid) -> Result<Vec<Trip>> {
        self.tables.list_trips_by_user(user_id).await
    }

    /// Single trip with its author's username
    pub async fn detail(&self, id: Uuid) -> Result<TripWithAuthor> {
        self.tables
            .get_trip(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("trip {id}")))
    }

    /// Point-in-time count of trips the user owns
    ///
    /// Fetched once per page load in the original; not transactional
    /// against concurrent inserts from another session of the same user.
    pub async fn trip_count(&self, user_id: Uuid) -> Result<u64> {
        self.tables.count_trips_for_user(user_id).await
    }

    /// Whether the user may post another trip right now
    pub async fn can_post(&self, user: &EnrichedUser) -> Result<bool> {
        if user.plan_level() == PlanLevel::Premium {
            return Ok(true);
        }
        Ok(self.trip_count(user.id()).await? < MAX_FREE_TRIPS)
    }

    /// Create a trip
    ///
    /// Validation runs before any network call. The free-plan gate is a
    /// client-side optimism check only; the backend's policy remains the
    /// authoritative limit. When the gate blocks, no insert request is
    /// issued at all.
    pub async fn create(
        &self,
        user: &EnrichedUser,
        new_trip: NewTrip,
        photo: Option<PhotoUpload>,
    ) -> Result<Trip> {
        new_trip.validate()?;

        if user.plan_level() != PlanLevel::Premium {
            let count = self.trip_count(user.id()).await?;
            if count >= MAX_FREE_TRIPS {
                return Err(Error::denied(FREE_LIMIT_MESSAGE));
            }
        }

        let photo_url = match photo {
            Some(photo) => Some(self.upload_photo(user.id(), photo).await?),
            None => None,
        };

        let trip = new_trip.into_trip(user.id(), photo_url);
        self.tables.insert_trip(&trip).await?;
        Ok(trip)
    }

    /// Owner-scoped update
    ///
    /// A new photo replaces the old one: the upload happens before the
    /// row update, and the previous object is removed afterwards on a
    /// best-effort basis.
    pub async fn update(
        &self,
        user: &EnrichedUser,
        id: Uuid,
        mut changes: TripUpdate,
        new_photo: Option<PhotoUpload>,
    ) -> Result<()> {
        changes.validate()?;

        let existing = self.detail(id).await?;
        if existing.trip.user_id != user.id() {
            return Err(Error::denied("only the owner can edit this trip"));
        }

        let old_photo_url = existing.trip.photo_url.clone();
        let replacing_photo = new_photo.is_some();
        if let Some(photo) = new_photo {
            let url = self.upload_photo(user.id(), photo).await?;
            changes.photo_url = Some(Some(url));
        }

        if changes.is_empty() {
            return Ok(());
        }

        self.tables.update_trip(id, user.id(), &changes).await?;

        if replacing_photo {
            if let Some(old_url) = old_photo_url {
                self.remove_photo(&old_url).await;
            }
        }
        Ok(())
    }

    /// Owner-scoped delete, removing the photo object as well
    pub async fn delete(&self, user: &EnrichedUser, id: Uuid) -> Result<()> {
        let existing = self.detail(id).await?;
        if existing.trip.user_id != user.id() {
            return Err(Error::denied("only the owner can delete this trip"));
        }

        self.tables.delete_trip(id, Some(user.id())).await?;

        if let Some(photo_url) = existing.trip.photo_url {
            self.remove_photo(&photo_url).await;
        }
        Ok(())
    }

    /// Subscribe to trip changes, optionally filtered to one owner
    ///
    /// The returned subscription is scoped to the view holding it and
    /// ends when dropped.
    pub fn subscribe_changes(&self, owner: Option<Uuid>) -> TripSubscription {
        self.changes.subscribe_trips(owner)
    }

    async fn upload_photo(&self, user_id: Uuid, photo: PhotoUpload) -> Result<String> {
        let path = format!("{}/{}.{}", user_id, Uuid::new_v4(), photo.extension());
        self.storage
            .upload(TRIP_PHOTOS_BUCKET, &path, photo.bytes, &photo.content_type)
            .await?;
        Ok(self.storage.public_url(TRIP_PHOTOS_BUCKET, &path))
    }

    /// Best-effort photo removal; a failure is logged, never surfaced
    async fn remove_photo(&self, photo_url: &str) {
        let Some(path) = object_path_from_url(photo_url, TRIP_PHOTOS_BUCKET) else {
            return;
        };
        if let Err(e) = self.storage.remove(TRIP_PHOTOS_BUCKET, &[path]).await {
            tracing::warn!(error = %e, "failed to remove trip photo from storage");
        }
    }
}
