//! Table store port - backend relation abstraction
//!
//! Typed operations over the `profiles` and `trips` relations. Every
//! call is row-level-security-scoped to the caller's identity by the
//! backend, except where policy grants the admin override.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{PlanLevel, Profile, Trip, TripUpdate, TripWithAuthor};

/// Backend table store abstraction
#[async_trait]
pub trait TableStore: Send + Sync {
    // === Profiles ===

    /// Get a profile by identity id
    ///
    /// A missing row is `Ok(None)`; only real failures (network, policy
    /// denial) are errors.
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>>;

    /// Insert the profile paired with a freshly registered identity
    async fn insert_profile(&self, profile: &Profile) -> Result<()>;

    /// Change a profile's plan level (upgrade flow)
    async fn update_plan_level(&self, user_id: Uuid, plan_level: PlanLevel) -> Result<()>;

    // === Trips ===

    /// All trips with author usernames, newest first
    async fn list_trips(&self) -> Result<Vec<TripWithAuthor>>;

    /// Trips owned by one user, newest first
    async fn list_trips_by_user(&self, user_id: Uuid) -> Result<Vec<Trip>>;

    /// Single trip with author username
    async fn get_trip(&self, id: Uuid) -> Result<Option<TripWithAuthor>>;

    /// Insert a new trip row
    async fn insert_trip(&self, trip: &Trip) -> Result<()>;

    /// Owner-scoped update: matches both trip id and owner id
    async fn update_trip(&self, id: Uuid, owner: Uuid, changes: &TripUpdate) -> Result<()>;

    /// Delete a trip
    ///
    /// With `owner: Some(_)` the delete is owner-scoped; `None` is the
    /// admin override path and deletes by id alone.
    async fn delete_trip(&self, id: Uuid, owner: Option<Uuid>) -> Result<()>;

    /// Point-in-time count of trips owned by a user
    async fn count_trips_for_user(&self, user_id: Uuid) -> Result<u64>;
}
