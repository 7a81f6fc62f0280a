//! TravelShare Core - client-side logic for the trip sharing app
//!
//! This crate implements the application core following hexagonal architecture:
//!
//! - **domain**: Core entities (Identity, Profile, Trip, Entitlements)
//! - **ports**: Trait definitions for external dependencies (AuthProvider, TableStore, ObjectStore)
//! - **services**: Session store, route guards, and the trip/auth/upgrade/admin flows
//! - **adapters**: Concrete implementations (Supabase REST, in-memory demo backend)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use adapters::{LocalChangeFeed, MemoryBackend, SupabaseClient};
use config::Config;
use ports::{AuthProvider, Navigator, NullNavigator, ObjectStore, TableStore};
use services::{AdminService, AuthService, SessionStore, TripService, UpgradeService};

// Re-export commonly used types at crate root
pub use domain::result::{Error, Result};
pub use domain::{
    AuthSession, Entitlements, EnrichedUser, Identity, NewTrip, PlanLevel, Profile, Trip,
    TripUpdate, TripWithAuthor,
};
pub use services::{FREE_LIMIT_MESSAGE, MAX_FREE_TRIPS};

/// Main context for TravelShare operations
///
/// The primary entry point: wires one backend (Supabase or in-memory
/// demo) into the session store and the services, and starts the auth
/// event listener.
pub struct TravelShareContext {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub auth_service: AuthService,
    pub trip_service: TripService,
    pub upgrade_service: UpgradeService,
    pub admin_service: AdminService,
}

impl TravelShareContext {
    /// Create a new TravelShare context
    ///
    /// Must run inside a Tokio runtime; the session store's auth
    /// listener is spawned here.
    pub fn new(app_dir: &Path) -> Result<Self> {
        Self::with_navigator(app_dir, Arc::new(NullNavigator))
    }

    /// Create a context with a custom navigation sink
    pub fn with_navigator(app_dir: &Path, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let config = Config::load(app_dir)
            .map_err(|e| Error::Config(format!("failed to load settings: {e}")))?;

        let changes = Arc::new(LocalChangeFeed::new());

        let (auth, tables, storage): (
            Arc<dyn AuthProvider>,
            Arc<dyn TableStore>,
            Arc<dyn ObjectStore>,
        ) = if config.demo_mode {
            let backend = Arc::new(MemoryBackend::new(Arc::clone(&changes)));
            backend.seed_demo();
            (
                Arc::clone(&backend) as Arc<dyn AuthProvider>,
                Arc::clone(&backend) as Arc<dyn TableStore>,
                backend as Arc<dyn ObjectStore>,
            )
        } else {
            let url = config
                .supabase_url
                .as_deref()
                .ok_or_else(|| Error::Config("supabaseUrl is not configured".to_string()))?;
            let anon_key = config
                .anon_key
                .as_deref()
                .ok_or_else(|| Error::Config("anonKey is not configured".to_string()))?;
            let client = Arc::new(SupabaseClient::new(
                url,
                anon_key,
                app_dir.join("session.json"),
                Arc::clone(&changes),
            )?);
            (
                Arc::clone(&client) as Arc<dyn AuthProvider>,
                Arc::clone(&client) as Arc<dyn TableStore>,
                client as Arc<dyn ObjectStore>,
            )
        };

        let session = SessionStore::new(
            Arc::clone(&auth),
            Arc::clone(&tables),
            navigator,
            config.admin_email.clone(),
        );
        session.spawn_auth_listener();

        let auth_service = AuthService::new(Arc::clone(&auth), Arc::clone(&tables));
        let trip_service = TripService::new(
            Arc::clone(&tables),
            Arc::clone(&storage),
            Arc::clone(&changes) as Arc<dyn ports::ChangeFeed>,
        );
        let upgrade_service = UpgradeService::new(Arc::clone(&tables), Arc::clone(&session));
        let admin_service = AdminService::new(
            Arc::clone(&tables),
            Arc::clone(&storage),
            config.admin_email.clone(),
        );

        Ok(Self {
            config,
            session,
            auth_service,
            trip_service,
            upgrade_service,
            admin_service,
        })
    }
}
