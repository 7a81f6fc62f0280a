//! Supabase REST client
//!
//! Implements the auth, table store, and object storage ports against a
//! hosted Supabase project: GoTrue for auth, PostgREST for the
//! `profiles` and `trips` relations, and the storage REST API for trip
//! photos. Row-level security on the backend scopes every table call to
//! the bearer identity; this client only forwards the token.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tokio::sync::broadcast;
use url::Url;
use uuid::Uuid;

use crate::adapters::changes::LocalChangeFeed;
use crate::domain::result::{Error, Result};
use crate::domain::{
    AuthSession, Identity, PlanLevel, Profile, Trip, TripUpdate, TripWithAuthor,
};
use crate::ports::{AuthChange, AuthEvent, AuthProvider, ChangeKind, ObjectStore, TableStore};

/// Supabase REST client
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
    /// Where the persisted session lives between runs
    session_path: PathBuf,
    session: Mutex<Option<AuthSession>>,
    auth_events: broadcast::Sender<AuthChange>,
    changes: Arc<LocalChangeFeed>,
}

// =============================================================================
// Wire models
// =============================================================================

/// GoTrue token/signup response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: Option<WireUser>,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

/// GoTrue error body; the field name varies by endpoint
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl AuthErrorBody {
    fn message(self) -> Option<String> {
        self.error_description.or(self.msg).or(self.message)
    }
}

/// PostgREST error body
#[derive(Debug, Default, Deserialize)]
struct RestErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    id: Uuid,
    username: String,
    #[serde(default)]
    plan_level: PlanLevel,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            username: row.username,
            plan_level: row.plan_level,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TripRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: String,
    location_name: String,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    photo_url: Option<String>,
    created_at: DateTime<Utc>,
    /// Embedded author from `select=*,profiles(username)`
    #[serde(default)]
    profiles: Option<AuthorEmbed>,
}

#[derive(Debug, Deserialize)]
struct AuthorEmbed {
    username: Option<String>,
}

impl From<TripRow> for TripWithAuthor {
    fn from(row: TripRow) -> Self {
        TripWithAuthor {
            author_username: row.profiles.as_ref().and_then(|p| p.username.clone()),
            trip: Trip {
                id: row.id,
                user_id: row.user_id,
                title: row.title,
                description: row.description,
                location_name: row.location_name,
                latitude: row.latitude,
                longitude: row.longitude,
                photo_url: row.photo_url,
                created_at: row.created_at,
            },
        }
    }
}

impl From<TripRow> for Trip {
    fn from(row: TripRow) -> Self {
        TripWithAuthor::from(row).trip
    }
}

// =============================================================================
// Client
// =============================================================================

impl SupabaseClient {
    /// Create a client for a Supabase project
    ///
    /// The project URL must use HTTPS; plain HTTP is accepted only for
    /// localhost development stacks.
    pub fn new(
        project_url: &str,
        anon_key: &str,
        session_path: PathBuf,
        changes: Arc<LocalChangeFeed>,
    ) -> Result<Self> {
        let parsed = Url::parse(project_url)
            .map_err(|e| Error::Config(format!("invalid project URL: {e}")))?;

        let host = parsed.host_str().unwrap_or("");
        let is_local = host == "localhost" || host == "127.0.0.1";
        if parsed.scheme() != "https" && !is_local {
            return Err(Error::Config(
                "project URL must use HTTPS".to_string(),
            ));
        }
        if anon_key.is_empty() {
            return Err(Error::Config("anon key is not configured".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::network(format!("failed to build HTTP client: {e}")))?;

        let base_url = project_url.trim_end_matches('/').to_string();
        let session = Self::load_persisted_session(&session_path);
        let (auth_events, _) = broadcast::channel(16);

        Ok(Self {
            client,
            base_url,
            anon_key: anon_key.to_string(),
            session_path,
            session: Mutex::new(session),
            auth_events,
            changes: Arc::clone(&changes),
        })
    }

    fn load_persisted_session(path: &PathBuf) -> Option<AuthSession> {
        let content = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str::<AuthSession>(&content) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable persisted session");
                None
            }
        }
    }

    fn persist_session(&self, session: Option<&AuthSession>) {
        let result = match session {
            Some(session) => serde_json::to_string_pretty(session)
                .map_err(Error::from)
                .and_then(|json| std::fs::write(&self.session_path, json).map_err(Error::from)),
            None => match std::fs::remove_file(&self.session_path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            },
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist session state");
        }
    }

    fn bearer_token(&self) -> String {
        self.session
            .lock()
            .unwrap()
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn rest_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.anon_key) {
            headers.insert("apikey", value);
        }
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.bearer_token())) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    fn map_request_error(e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::network("request timed out after 30 seconds")
        } else if e.is_connect() {
            Error::network("unable to reach the backend")
        } else {
            Error::network(format!("request failed: {e}"))
        }
    }

    /// Map a non-success auth response to an error
    async fn auth_error(response: Response) -> Error {
        let status = response.status();
        let body: AuthErrorBody = response.json().await.unwrap_or_default();
        let detail = body
            .message()
            .unwrap_or_else(|| format!("HTTP {status}"));
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::denied(detail),
            _ => Error::auth(detail),
        }
    }

    /// Map a non-success PostgREST/storage response to an error
    async fn rest_error(response: Response) -> Error {
        let status = response.status();
        let body: RestErrorBody = response.json().await.unwrap_or_default();
        let detail = body
            .message
            .unwrap_or_else(|| format!("HTTP {status}"));
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::denied(detail),
            StatusCode::NOT_FOUND => Error::not_found(detail),
            _ => Error::network(detail),
        }
    }

    fn session_from_token_response(&self, data: TokenResponse) -> Result<AuthSession> {
        let access_token = data
            .access_token
            .ok_or_else(|| Error::auth("registration succeeded but no session was issued; confirm your email, then sign in"))?;
        let user = data
            .user
            .ok_or_else(|| Error::auth("auth response carried no user"))?;
        let email = user
            .email
            .ok_or_else(|| Error::auth("auth response carried no email"))?;

        let expires_at = data
            .expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .or_else(|| {
                data.expires_in
                    .map(|secs| Utc::now() + chrono::Duration::seconds(secs))
            });

        Ok(AuthSession {
            user: Identity::new(user.id, email),
            access_token,
            expires_at,
        })
    }

    fn adopt_session(&self, session: AuthSession, event: AuthEvent) {
        self.persist_session(Some(&session));
        *self.session.lock().unwrap() = Some(session.clone());
        let _ = self.auth_events.send(AuthChange {
            event,
            session: Some(session),
        });
    }

    /// Fetch trips rows, optionally filtered by owner
    async fn fetch_trip_rows(&self, owner: Option<Uuid>) -> Result<Vec<TripRow>> {
        let mut url = format!(
            "{}/rest/v1/trips?select=*,profiles(username)&order=created_at.desc",
            self.base_url
        );
        if let Some(owner) = owner {
            url.push_str(&format!("&user_id=eq.{owner}"));
        }

        let response = self
            .client
            .get(&url)
            .headers(self.rest_headers())
            .send()
            .await
            .map_err(Self::map_request_error)?;

        if !response.status().is_success() {
            return Err(Self::rest_error(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| Error::network(format!("failed to parse trips response: {e}")))
    }
}

// =============================================================================
// AuthProvider
// =============================================================================

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(Self::map_request_error)?;

        if !response.status().is_success() {
            return Err(Self::auth_error(response).await);
        }

        let data: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::network(format!("failed to parse auth response: {e}")))?;
        let session = self.session_from_token_response(data)?;
        self.adopt_session(session.clone(), AuthEvent::SignedIn);
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(Self::map_request_error)?;

        if !response.status().is_success() {
            return Err(Self::auth_error(response).await);
        }

        let data: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::network(format!("failed to parse signup response: {e}")))?;
        let session = self.session_from_token_response(data)?;
        self.adopt_session(session.clone(), AuthEvent::SignedIn);
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        let token = self.bearer_token();
        let url = format!("{}/auth/v1/logout", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&token)
            .send()
            .await;

        // The local session is cleared even when the revocation call
        // fails; an unreachable backend must not trap the user signed in.
        match response {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!(status = %response.status(), "backend sign-out returned an error");
            }
            Err(e) => {
                tracing::warn!(error = %Self::map_request_error(e), "backend sign-out failed");
            }
            _ => {}
        }

        self.persist_session(None);
        *self.session.lock().unwrap() = None;
        let _ = self.auth_events.send(AuthChange {
            event: AuthEvent::SignedOut,
            session: None,
        });
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<AuthSession>> {
        let session = self.session.lock().unwrap().clone();
        match session {
            Some(session) if session.is_expired(Utc::now()) => {
                tracing::debug!("persisted session has expired");
                self.persist_session(None);
                *self.session.lock().unwrap() = None;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.auth_events.subscribe()
    }
}

// =============================================================================
// TableStore
// =============================================================================

#[async_trait]
impl TableStore for SupabaseClient {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let url = format!(
            "{}/rest/v1/profiles?select=id,username,plan_level&id=eq.{user_id}",
            self.base_url
        );
        let response = self
            .client
            .get(&url)
            .headers(self.rest_headers())
            .header("Accept", "application/vnd.pgrst.object+json")
            .send()
            .await
            .map_err(Self::map_request_error)?;

        // PostgREST answers 406 for a single-object request matching no
        // rows; that is "no profile yet", not a failure.
        if response.status() == StatusCode::NOT_ACCEPTABLE {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::rest_error(response).await);
        }

        let row: ProfileRow = response
            .json()
            .await
            .map_err(|e| Error::network(format!("failed to parse profile response: {e}")))?;
        Ok(Some(row.into()))
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<()> {
        let url = format!("{}/rest/v1/profiles", self.base_url);
        let response = self
            .client
            .post(&url)
            .headers(self.rest_headers())
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({
                "id": profile.id,
                "username": profile.username,
                "plan_level": profile.plan_level,
            }))
            .send()
            .await
            .map_err(Self::map_request_error)?;

        if !response.status().is_success() {
            return Err(Self::rest_error(response).await);
        }
        Ok(())
    }

    async fn update_plan_level(&self, user_id: Uuid, plan_level: PlanLevel) -> Result<()> {
        let url = format!("{}/rest/v1/profiles?id=eq.{user_id}", self.base_url);
        let response = self
            .client
            .patch(&url)
            .headers(self.rest_headers())
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ "plan_level": plan_level }))
            .send()
            .await
            .map_err(Self::map_request_error)?;

        if !response.status().is_success() {
            return Err(Self::rest_error(response).await);
        }
        Ok(())
    }

    async fn list_trips(&self) -> Result<Vec<TripWithAuthor>> {
        let rows = self.fetch_trip_rows(None).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_trips_by_user(&self, user_id: Uuid) -> Result<Vec<Trip>> {
        let rows = self.fetch_trip_rows(Some(user_id)).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_trip(&self, id: Uuid) -> Result<Option<TripWithAuthor>> {
        let url = format!(
            "{}/rest/v1/trips?select=*,profiles(username)&id=eq.{id}",
            self.base_url
        );
        let response = self
            .client
            .get(&url)
            .headers(self.rest_headers())
            .header("Accept", "application/vnd.pgrst.object+json")
            .send()
            .await
            .map_err(Self::map_request_error)?;

        if response.status() == StatusCode::NOT_ACCEPTABLE {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::rest_error(response).await);
        }

        let row: TripRow = response
            .json()
            .await
            .map_err(|e| Error::network(format!("failed to parse trip response: {e}")))?;
        Ok(Some(row.into()))
    }

    async fn insert_trip(&self, trip: &Trip) -> Result<()> {
        let url = format!("{}/rest/v1/trips", self.base_url);
        let response = self
            .client
            .post(&url)
            .headers(self.rest_headers())
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({
                "id": trip.id,
                "user_id": trip.user_id,
                "title": trip.title,
                "description": trip.description,
                "location_name": trip.location_name,
                "latitude": trip.latitude,
                "longitude": trip.longitude,
                "photo_url": trip.photo_url,
            }))
            .send()
            .await
            .map_err(Self::map_request_error)?;

        if !response.status().is_success() {
            return Err(Self::rest_error(response).await);
        }
        self.changes
            .publish(ChangeKind::Insert, trip.id, trip.user_id);
        Ok(())
    }

    async fn update_trip(&self, id: Uuid, owner: Uuid, changes: &TripUpdate) -> Result<()> {
        let url = format!(
            "{}/rest/v1/trips?id=eq.{id}&user_id=eq.{owner}",
            self.base_url
        );
        let response = self
            .client
            .patch(&url)
            .headers(self.rest_headers())
            .header("Prefer", "return=minimal")
            .json(changes)
            .send()
            .await
            .map_err(Self::map_request_error)?;

        if !response.status().is_success() {
            return Err(Self::rest_error(response).await);
        }
        self.changes.publish(ChangeKind::Update, id, owner);
        Ok(())
    }

    async fn delete_trip(&self, id: Uuid, owner: Option<Uuid>) -> Result<()> {
        let mut url = format!("{}/rest/v1/trips?id=eq.{id}", self.base_url);
        if let Some(owner) = owner {
            url.push_str(&format!("&user_id=eq.{owner}"));
        }
        let response = self
            .client
            .delete(&url)
            .headers(self.rest_headers())
            .header("Prefer", "return=minimal")
            .send()
            .await
            .map_err(Self::map_request_error)?;

        if !response.status().is_success() {
            return Err(Self::rest_error(response).await);
        }
        self.changes
            .publish(ChangeKind::Delete, id, owner.unwrap_or(Uuid::nil()));
        Ok(())
    }

    async fn count_trips_for_user(&self, user_id: Uuid) -> Result<u64> {
        let url = format!(
            "{}/rest/v1/trips?select=id&user_id=eq.{user_id}",
            self.base_url
        );
        let response = self
            .client
            .get(&url)
            .headers(self.rest_headers())
            .header("Prefer", "count=exact")
            .header("Range", "0-0")
            .send()
            .await
            .map_err(Self::map_request_error)?;

        if !response.status().is_success() {
            return Err(Self::rest_error(response).await);
        }

        // Content-Range is "0-0/N" (or "*/0" for an empty relation).
        let content_range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        parse_content_range_total(content_range)
            .ok_or_else(|| Error::network(format!("unparseable count header: {content_range:?}")))
    }
}

/// Parse the total from a PostgREST Content-Range header value
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit('/').next()?.trim().parse().ok()
}

// =============================================================================
// ObjectStore
// =============================================================================

#[async_trait]
impl ObjectStore for SupabaseClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        let url = format!("{}/storage/v1/object/{bucket}/{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .headers(self.rest_headers())
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(Self::map_request_error)?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(match Self::rest_error(response).await {
                Error::Denied(msg) => Error::Denied(msg),
                other => Error::Storage(format!("upload failed ({status}): {other}")),
            });
        }
        Ok(())
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<()> {
        let url = format!("{}/storage/v1/object/{bucket}", self.base_url);
        let response = self
            .client
            .delete(&url)
            .headers(self.rest_headers())
            .json(&serde_json::json!({ "prefixes": paths }))
            .send()
            .await
            .map_err(Self::map_request_error)?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::Storage(format!("remove failed ({status})")));
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{path}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(url: &str) -> Result<SupabaseClient> {
        SupabaseClient::new(
            url,
            "anon-key",
            std::env::temp_dir().join("tvs-test-session.json"),
            Arc::new(LocalChangeFeed::new()),
        )
    }

    #[test]
    fn test_reject_http_project_url() {
        let result = client_for("http://proj.supabase.co");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_allow_localhost_http() {
        assert!(client_for("http://localhost:54321").is_ok());
    }

    #[test]
    fn test_reject_empty_anon_key() {
        let result = SupabaseClient::new(
            "https://proj.supabase.co",
            "",
            std::env::temp_dir().join("tvs-test-session.json"),
            Arc::new(LocalChangeFeed::new()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_public_url_shape() {
        let client = client_for("https://proj.supabase.co").unwrap();
        assert_eq!(
            client.public_url("trip-photos", "uid/p.jpg"),
            "https://proj.supabase.co/storage/v1/object/public/trip-photos/uid/p.jpg"
        );
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-0/42"), Some(42));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("garbage"), None);
    }
}
