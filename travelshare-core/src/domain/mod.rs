//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod entitlements;
mod identity;
mod profile;
pub mod result;
mod trip;
mod user;

pub use entitlements::Entitlements;
pub use identity::{AuthSession, Identity};
pub use profile::{PlanLevel, Profile};
pub use trip::{NewTrip, Trip, TripUpdate, TripWithAuthor};
pub use user::EnrichedUser;
