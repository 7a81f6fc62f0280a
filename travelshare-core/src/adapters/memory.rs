//! In-memory backend
//!
//! Implements every backend port against process-local state. Used for
//! demo mode (try the app without a Supabase project) and for the
//! integration tests, which steer its failure and latency knobs to
//! reproduce enrichment races and policy denials.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::adapters::changes::LocalChangeFeed;
use crate::domain::result::{Error, Result};
use crate::domain::{
    AuthSession, Identity, NewTrip, PlanLevel, Profile, Trip, TripUpdate, TripWithAuthor,
};
use crate::ports::{AuthChange, AuthEvent, AuthProvider, ChangeKind, ObjectStore, TableStore};

#[derive(Default)]
struct MemoryState {
    /// email -> (password, identity id)
    accounts: HashMap<String, (String, Uuid)>,
    profiles: HashMap<Uuid, Profile>,
    trips: Vec<Trip>,
    /// "bucket/path" -> bytes
    objects: HashMap<String, Vec<u8>>,
    session: Option<AuthSession>,
    /// Per-call artificial latencies for profile fetches, popped FIFO
    profile_delays: Vec<Duration>,
    fail_profile_fetch: bool,
}

/// Process-local backend
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    auth_events: broadcast::Sender<AuthChange>,
    changes: Arc<LocalChangeFeed>,
    /// Trip insert requests actually issued (gate tests assert on this)
    insert_attempts: AtomicU64,
}

impl MemoryBackend {
    pub fn new(changes: Arc<LocalChangeFeed>) -> Self {
        let (auth_events, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(MemoryState::default()),
            auth_events,
            changes,
            insert_attempts: AtomicU64::new(0),
        }
    }

    /// Seed a demo account with a couple of trips
    ///
    /// Credentials: `demo@travelshare.app` / `demo`.
    pub fn seed_demo(&self) {
        let demo_id = Uuid::new_v4();
        let mut state = self.state.lock().unwrap();
        state
            .accounts
            .insert("demo@travelshare.app".to_string(), ("demo".to_string(), demo_id));
        state.profiles.insert(demo_id, Profile::new(demo_id, "demo-traveller"));
        state.trips.push(
            NewTrip {
                title: "Three days in Chiang Mai".to_string(),
                description: "Temples, night markets, and the Doi Suthep loop.".to_string(),
                location_name: "Chiang Mai".to_string(),
                latitude: Some(18.7883),
                longitude: Some(98.9853),
            }
            .into_trip(demo_id, None),
        );
    }

    // === Test and demo steering ===

    /// Register an account without going through sign-up
    pub fn add_account(&self, email: &str, password: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state
            .lock()
            .unwrap()
            .accounts
            .insert(email.to_string(), (password.to_string(), id));
        id
    }

    /// Install or replace a profile row directly
    pub fn put_profile(&self, profile: Profile) {
        self.state.lock().unwrap().profiles.insert(profile.id, profile);
    }

    /// Install a trip row directly
    pub fn put_trip(&self, trip: Trip) {
        self.state.lock().unwrap().trips.push(trip);
    }

    /// Open a session directly, as if restored from disk
    pub fn open_session(&self, identity: Identity) -> AuthSession {
        let session = AuthSession {
            user: identity,
            access_token: "memory-token".to_string(),
            expires_at: None,
        };
        self.state.lock().unwrap().session = Some(session.clone());
        session
    }

    /// Queue artificial latencies for upcoming profile fetches (FIFO)
    pub fn queue_profile_delays(&self, delays: &[Duration]) {
        self.state
            .lock()
            .unwrap()
            .profile_delays
            .extend(delays.iter().copied());
    }

    /// Make subsequent profile fetches fail
    pub fn set_fail_profile_fetch(&self, fail: bool) {
        self.state.lock().unwrap().fail_profile_fetch = fail;
    }

    /// Emit an auth change as the backend would
    pub fn emit_auth_change(&self, event: AuthEvent, session: Option<AuthSession>) {
        let _ = self.auth_events.send(AuthChange { event, session });
    }

    /// How many trip inserts reached the backend
    pub fn insert_attempts(&self) -> u64 {
        self.insert_attempts.load(Ordering::SeqCst)
    }

    /// Whether an object is currently stored
    pub fn has_object(&self, bucket: &str, path: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .objects
            .contains_key(&format!("{bucket}/{path}"))
    }

    fn with_author(&self, trip: &Trip, profiles: &HashMap<Uuid, Profile>) -> TripWithAuthor {
        TripWithAuthor {
            trip: trip.clone(),
            author_username: profiles.get(&trip.user_id).map(|p| p.username.clone()),
        }
    }

    fn sorted_newest_first(mut trips: Vec<Trip>) -> Vec<Trip> {
        trips.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        trips
    }
}

#[async_trait]
impl AuthProvider for MemoryBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        let session = {
            let mut state = self.state.lock().unwrap();
            let (stored_password, id) = state
                .accounts
                .get(email)
                .cloned()
                .ok_or_else(|| Error::auth("invalid login credentials"))?;
            if stored_password != password {
                return Err(Error::auth("invalid login credentials"));
            }
            let session = AuthSession {
                user: Identity::new(id, email),
                access_token: "memory-token".to_string(),
                expires_at: None,
            };
            state.session = Some(session.clone());
            session
        };
        self.emit_auth_change(AuthEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession> {
        let session = {
            let mut state = self.state.lock().unwrap();
            if state.accounts.contains_key(email) {
                return Err(Error::auth("user already registered"));
            }
            let id = Uuid::new_v4();
            state
                .accounts
                .insert(email.to_string(), (password.to_string(), id));
            let session = AuthSession {
                user: Identity::new(id, email),
                access_token: "memory-token".to_string(),
                expires_at: None,
            };
            state.session = Some(session.clone());
            session
        };
        self.emit_auth_change(AuthEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        self.state.lock().unwrap().session = None;
        self.emit_auth_change(AuthEvent::SignedOut, None);
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<AuthSession>> {
        Ok(self.state.lock().unwrap().session.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.auth_events.subscribe()
    }
}

#[async_trait]
impl TableStore for MemoryBackend {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        // Snapshot first, then wait: an overlapping fetch observes the
        // data as of its issue time, which is what makes stale-result
        // races reproducible in tests.
        let (snapshot, delay, fail) = {
            let mut state = self.state.lock().unwrap();
            let delay = if state.profile_delays.is_empty() {
                None
            } else {
                Some(state.profile_delays.remove(0))
            };
            (
                state.profiles.get(&user_id).cloned(),
                delay,
                state.fail_profile_fetch,
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(Error::network("profile fetch failed"));
        }
        Ok(snapshot)
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.profiles.contains_key(&profile.id) {
            return Err(Error::validation("profile already exists"));
        }
        state.profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn update_plan_level(&self, user_id: Uuid, plan_level: PlanLevel) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let profile = state
            .profiles
            .get_mut(&user_id)
            .ok_or_else(|| Error::not_found(format!("profile {user_id}")))?;
        profile.plan_level = plan_level;
        Ok(())
    }

    async fn list_trips(&self) -> Result<Vec<TripWithAuthor>> {
        let state = self.state.lock().unwrap();
        let trips = Self::sorted_newest_first(state.trips.clone());
        Ok(trips
            .iter()
            .map(|t| self.with_author(t, &state.profiles))
            .collect())
    }

    async fn list_trips_by_user(&self, user_id: Uuid) -> Result<Vec<Trip>> {
        let state = self.state.lock().unwrap();
        Ok(Self::sorted_newest_first(
            state
                .trips
                .iter()
                .filter(|t| t.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn get_trip(&self, id: Uuid) -> Result<Option<TripWithAuthor>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .trips
            .iter()
            .find(|t| t.id == id)
            .map(|t| self.with_author(t, &state.profiles)))
    }

    async fn insert_trip(&self, trip: &Trip) -> Result<()> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        self.state.lock().unwrap().trips.push(trip.clone());
        self.changes
            .publish(ChangeKind::Insert, trip.id, trip.user_id);
        Ok(())
    }

    async fn update_trip(&self, id: Uuid, owner: Uuid, changes: &TripUpdate) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let trip = state
            .trips
            .iter_mut()
            .find(|t| t.id == id && t.user_id == owner)
            .ok_or_else(|| Error::not_found(format!("trip {id}")))?;

        if let Some(title) = &changes.title {
            trip.title = title.clone();
        }
        if let Some(description) = &changes.description {
            trip.description = description.clone();
        }
        if let Some(location_name) = &changes.location_name {
            trip.location_name = location_name.clone();
        }
        if let Some(latitude) = changes.latitude {
            trip.latitude = latitude;
        }
        if let Some(longitude) = changes.longitude {
            trip.longitude = longitude;
        }
        if let Some(photo_url) = &changes.photo_url {
            trip.photo_url = photo_url.clone();
        }
        drop(state);
        self.changes.publish(ChangeKind::Update, id, owner);
        Ok(())
    }

    async fn delete_trip(&self, id: Uuid, owner: Option<Uuid>) -> Result<()> {
        let removed_owner = {
            let mut state = self.state.lock().unwrap();
            let position = state
                .trips
                .iter()
                .position(|t| t.id == id && owner.map_or(true, |o| t.user_id == o))
                .ok_or_else(|| Error::not_found(format!("trip {id}")))?;
            state.trips.remove(position).user_id
        };
        self.changes.publish(ChangeKind::Delete, id, removed_owner);
        Ok(())
    }

    async fn count_trips_for_user(&self, user_id: Uuid) -> Result<u64> {
        let state = self.state.lock().unwrap();
        Ok(state.trips.iter().filter(|t| t.user_id == user_id).count() as u64)
    }
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .objects
            .insert(format!("{bucket}/{path}"), bytes);
        Ok(())
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        for path in paths {
            state.objects.remove(&format!("{bucket}/{path}"));
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://{bucket}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> MemoryBackend {
        MemoryBackend::new(Arc::new(LocalChangeFeed::new()))
    }

    #[tokio::test]
    async fn test_sign_in_rejects_bad_password() {
        let backend = backend();
        backend.add_account("a@b.c", "secret");
        let result = backend.sign_in_with_password("a@b.c", "wrong").await;
        assert!(matches!(result, Err(Error::Auth(_))));
    }

    #[tokio::test]
    async fn test_sign_up_rejects_duplicate_email() {
        let backend = backend();
        backend.sign_up("a@b.c", "pw").await.unwrap();
        let result = backend.sign_up("a@b.c", "pw2").await;
        assert!(matches!(result, Err(Error::Auth(_))));
    }

    #[tokio::test]
    async fn test_owner_scoped_delete_misses_foreign_trip() {
        let backend = backend();
        let owner = Uuid::new_v4();
        let trip = NewTrip {
            title: "t".to_string(),
            description: "d".to_string(),
            location_name: "l".to_string(),
            ..Default::default()
        }
        .into_trip(owner, None);
        backend.put_trip(trip.clone());

        let stranger = Uuid::new_v4();
        let result = backend.delete_trip(trip.id, Some(stranger)).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(backend.count_trips_for_user(owner).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_demo_seed_provides_account_and_trip() {
        let backend = backend();
        backend.seed_demo();
        let session = backend
            .sign_in_with_password("demo@travelshare.app", "demo")
            .await
            .unwrap();
        assert_eq!(
            backend.count_trips_for_user(session.user.id).await.unwrap(),
            1
        );
    }
}
