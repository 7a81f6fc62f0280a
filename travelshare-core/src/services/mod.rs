//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on one flow of the app: session, auth, trips, upgrade,
//! moderation.

mod admin;
mod auth;
mod enrich;
pub mod guards;
mod session;
mod trips;
mod upgrade;

pub use admin::AdminService;
pub use auth::AuthService;
pub use enrich::ProfileEnricher;
pub use guards::{requires_admin, requires_session, GuardDecision};
pub use session::{SessionState, SessionStore};
pub use trips::{PhotoUpload, TripService, FREE_LIMIT_MESSAGE, MAX_FREE_TRIPS};
pub use upgrade::UpgradeService;
