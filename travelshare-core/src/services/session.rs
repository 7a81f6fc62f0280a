//! Session store - single source of truth for the signed-in user
//!
//! Holds the current identity (enriched with its profile) and the
//! loading flag that says whether that determination is final. State is
//! published through a watch channel; views subscribe explicitly and
//! read it, but only this store ever mutates it.
//!
//! Concurrency: enrichment attempts can overlap (a bootstrap racing a
//! manually triggered refresh). Each attempt takes a monotonically
//! increasing sequence number and a completion is discarded unless its
//! number is still the latest issued, so the last *issued* call wins
//! regardless of completion order. A slow stale fetch can never clobber
//! newer data.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::domain::result::Result;
use crate::domain::{EnrichedUser, Entitlements};
use crate::ports::{AuthChange, AuthEvent, AuthProvider, Navigator, Route, TableStore};
use crate::services::enrich::ProfileEnricher;

/// Published session state
#[derive(Debug, Clone)]
pub struct SessionState {
    pub user: Option<EnrichedUser>,
    /// True until the first determination of "who is signed in" lands
    pub loading: bool,
}

impl SessionState {
    fn initial() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    /// Whether a signed-in identity is present
    pub fn has_identity(&self) -> bool {
        self.user.is_some()
    }
}

/// Session store
pub struct SessionStore {
    auth: Arc<dyn AuthProvider>,
    enricher: ProfileEnricher,
    navigator: Arc<dyn Navigator>,
    admin_email: String,
    /// Latest issued enrichment sequence number
    issued: AtomicU64,
    /// Serializes the supersession check with the state publish
    commit_lock: Mutex<()>,
    state_tx: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        tables: Arc<dyn TableStore>,
        navigator: Arc<dyn Navigator>,
        admin_email: impl Into<String>,
    ) -> Arc<Self> {
        let (state_tx, _) = watch::channel(SessionState::initial());
        Arc::new(Self {
            auth,
            enricher: ProfileEnricher::new(tables),
            navigator,
            admin_email: admin_email.into(),
            issued: AtomicU64::new(0),
            commit_lock: Mutex::new(()),
            state_tx,
        })
    }

    /// Subscribe to session state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    /// Entitlements of the current user, re-derived on every call
    pub fn entitlements(&self) -> Entitlements {
        self.state_tx
            .borrow()
            .user
            .as_ref()
            .map(|user| Entitlements::evaluate(user, &self.admin_email))
            .unwrap_or_default()
    }

    /// Resolve the persisted session and enrich it
    ///
    /// Always ends with `loading = false`: a failed session fetch or a
    /// failed enrichment degrades (no user / bare identity), it never
    /// leaves the store stuck loading.
    pub async fn bootstrap(&self) {
        self.run_enrichment().await;
    }

    /// Force re-enrichment, e.g. after a plan upgrade
    ///
    /// Safe to call concurrently with an in-flight bootstrap; the
    /// sequence-number rule resolves the race.
    pub async fn refresh(&self) {
        self.run_enrichment().await;
    }

    /// Delegate sign-out to the backend
    ///
    /// Local state is deliberately not touched here; the subsequent
    /// `SignedOut` auth change clears it, keeping state mutation on a
    /// single path.
    pub async fn sign_out(&self) -> Result<()> {
        self.auth.sign_out().await
    }

    /// Spawn the task that consumes the provider's auth-change stream
    pub fn spawn_auth_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::clone(self);
        let mut events = store.auth.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(change) => store.handle_auth_change(change).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "auth change stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Apply one auth state transition
    ///
    /// Sign-in and initial-session run a full re-enrichment so plan
    /// changes made elsewhere are picked up; every other event adopts
    /// the event's session user verbatim. Sign-out additionally
    /// navigates to the public landing route.
    pub async fn handle_auth_change(&self, change: AuthChange) {
        match change.event {
            AuthEvent::SignedIn | AuthEvent::InitialSession => {
                self.run_enrichment().await;
            }
            AuthEvent::SignedOut => {
                self.adopt(None);
                self.navigator.navigate(Route::Landing);
            }
            _ => {
                self.adopt(change.session.map(|s| EnrichedUser::bare(s.user)));
            }
        }
    }

    async fn run_enrichment(&self) {
        let seq = self.next_seq();
        let user = match self.auth.get_session().await {
            Ok(Some(session)) => Some(self.enricher.enrich(session.user).await),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "session fetch failed during enrichment");
                None
            }
        };
        self.apply(seq, user);
    }

    /// Adopt a user directly, superseding any in-flight enrichment
    fn adopt(&self, user: Option<EnrichedUser>) {
        let seq = self.next_seq();
        self.apply(seq, user);
    }

    fn next_seq(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Commit an enrichment result unless it has been superseded
    fn apply(&self, seq: u64, user: Option<EnrichedUser>) {
        let _guard = self.commit_lock.lock().unwrap();
        if seq != self.issued.load(Ordering::SeqCst) {
            tracing::debug!(seq, "discarding superseded enrichment result");
            return;
        }
        self.state_tx.send_replace(SessionState {
            user,
            loading: false,
        });
    }
}
