//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core
//! depends only on these traits, not on concrete implementations; all
//! "hard" operations (auth, persistence, storage, change notification)
//! are delegated through them to the backend-as-a-service.

mod auth;
mod changes;
mod navigator;
mod storage;
mod tables;

pub use auth::{AuthChange, AuthEvent, AuthProvider};
pub use changes::{ChangeFeed, ChangeKind, TripChange, TripSubscription};
pub use navigator::{Navigator, NullNavigator, Route};
pub use storage::{object_path_from_url, ObjectStore, TRIP_PHOTOS_BUCKET};
pub use tables::TableStore;
