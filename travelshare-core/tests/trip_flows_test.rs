//! Trip flow tests
//!
//! Posting, the free-plan gate, owner scoping, photo lifecycle, plan
//! upgrades, and the admin override, all against the in-memory backend.
//!
//! Run with: cargo test --test trip_flows_test

use std::sync::Arc;

use uuid::Uuid;

use travelshare_core::adapters::{LocalChangeFeed, MemoryBackend};
use travelshare_core::ports::{
    object_path_from_url, AuthProvider, ChangeFeed, ChangeKind, Navigator, NullNavigator,
    ObjectStore, TableStore, TRIP_PHOTOS_BUCKET,
};
use travelshare_core::services::{
    AdminService, PhotoUpload, SessionStore, TripService, UpgradeService, FREE_LIMIT_MESSAGE,
    MAX_FREE_TRIPS,
};
use travelshare_core::{
    EnrichedUser, Error, Identity, NewTrip, PlanLevel, Profile, TripUpdate,
};

const ADMIN_EMAIL: &str = "admin@travelshare.app";

struct Harness {
    backend: Arc<MemoryBackend>,
    changes: Arc<LocalChangeFeed>,
    trips: TripService,
}

fn harness() -> Harness {
    let changes = Arc::new(LocalChangeFeed::new());
    let backend = Arc::new(MemoryBackend::new(Arc::clone(&changes)));
    let trips = TripService::new(
        Arc::clone(&backend) as Arc<dyn TableStore>,
        Arc::clone(&backend) as Arc<dyn ObjectStore>,
        Arc::clone(&changes) as Arc<dyn ChangeFeed>,
    );
    Harness {
        backend,
        changes,
        trips,
    }
}

fn free_user(backend: &MemoryBackend, email: &str, username: &str) -> EnrichedUser {
    let id = backend.add_account(email, "pw");
    let profile = Profile::new(id, username);
    backend.put_profile(profile.clone());
    EnrichedUser::enriched(Identity::new(id, email), profile)
}

fn premium_user(backend: &MemoryBackend, email: &str, username: &str) -> EnrichedUser {
    let id = backend.add_account(email, "pw");
    let mut profile = Profile::new(id, username);
    profile.plan_level = PlanLevel::Premium;
    backend.put_profile(profile.clone());
    EnrichedUser::enriched(Identity::new(id, email), profile)
}

fn sample_trip(title: &str) -> NewTrip {
    NewTrip {
        title: title.to_string(),
        description: "A trip worth sharing".to_string(),
        location_name: "Lisbon".to_string(),
        latitude: Some(38.7223),
        longitude: Some(-9.1393),
    }
}

fn sample_photo() -> PhotoUpload {
    PhotoUpload {
        file_name: "sunset.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
        bytes: vec![0xff, 0xd8, 0xff],
    }
}

#[tokio::test]
async fn test_first_free_post_succeeds() {
    let h = harness();
    let user = free_user(&h.backend, "a@b.c", "wanderer");

    let trip = h.trips.create(&user, sample_trip("First trip"), None).await.unwrap();
    assert_eq!(trip.user_id, user.id());
    assert_eq!(h.trips.trip_count(user.id()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_free_user_blocked_at_limit_without_insert() {
    let h = harness();
    let user = free_user(&h.backend, "a@b.c", "wanderer");
    h.trips.create(&user, sample_trip("First trip"), None).await.unwrap();
    let inserts_before = h.backend.insert_attempts();

    let result = h.trips.create(&user, sample_trip("Second trip"), None).await;

    match result {
        Err(Error::Denied(message)) => assert_eq!(message, FREE_LIMIT_MESSAGE),
        other => panic!("expected denied, got {other:?}"),
    }
    // The gate blocks before any insert request is issued
    assert_eq!(h.backend.insert_attempts(), inserts_before);
    assert_eq!(h.trips.trip_count(user.id()).await.unwrap(), MAX_FREE_TRIPS);
}

#[tokio::test]
async fn test_premium_user_posts_beyond_free_limit() {
    let h = harness();
    let user = premium_user(&h.backend, "a@b.c", "globetrotter");

    for i in 0..10 {
        h.trips
            .create(&user, sample_trip(&format!("Trip {i}")), None)
            .await
            .unwrap();
    }
    let eleventh = h.trips.create(&user, sample_trip("Trip 10"), None).await;
    assert!(eleventh.is_ok());
    assert_eq!(h.trips.trip_count(user.id()).await.unwrap(), 11);
}

#[tokio::test]
async fn test_validation_rejects_blank_fields_before_any_request() {
    let h = harness();
    let user = free_user(&h.backend, "a@b.c", "wanderer");

    let mut blank = sample_trip("  ");
    blank.title = "   ".to_string();
    let result = h.trips.create(&user, blank, None).await;

    assert!(matches!(result, Err(Error::Validation(_))));
    assert_eq!(h.backend.insert_attempts(), 0);
}

#[tokio::test]
async fn test_feed_filters_on_title_and_location() {
    let h = harness();
    let user = premium_user(&h.backend, "a@b.c", "globetrotter");
    h.trips.create(&user, sample_trip("Surfing in Ericeira"), None).await.unwrap();
    let mut elsewhere = sample_trip("Alpine hike");
    elsewhere.location_name = "Innsbruck".to_string();
    h.trips.create(&user, elsewhere, None).await.unwrap();

    let by_title = h.trips.feed(Some("surfing")).await.unwrap();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].trip.title, "Surfing in Ericeira");

    let by_location = h.trips.feed(Some("innsbruck")).await.unwrap();
    assert_eq!(by_location.len(), 1);

    let all = h.trips.feed(None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].author_username.as_deref(), Some("globetrotter"));
}

#[tokio::test]
async fn test_owner_scoping_denies_foreign_edit_and_delete() {
    let h = harness();
    let owner = free_user(&h.backend, "owner@b.c", "owner");
    let stranger = free_user(&h.backend, "stranger@b.c", "stranger");
    let trip = h.trips.create(&owner, sample_trip("Mine"), None).await.unwrap();

    let changes = TripUpdate {
        title: Some("Hijacked".to_string()),
        ..Default::default()
    };
    let edit = h.trips.update(&stranger, trip.id, changes, None).await;
    assert!(matches!(edit, Err(Error::Denied(_))));

    let delete = h.trips.delete(&stranger, trip.id).await;
    assert!(matches!(delete, Err(Error::Denied(_))));
    assert_eq!(h.trips.trip_count(owner.id()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_photo_uploaded_on_create_and_removed_on_delete() {
    let h = harness();
    let user = free_user(&h.backend, "a@b.c", "wanderer");

    let trip = h
        .trips
        .create(&user, sample_trip("With photo"), Some(sample_photo()))
        .await
        .unwrap();

    let photo_url = trip.photo_url.clone().expect("photo url should be set");
    let path = object_path_from_url(&photo_url, TRIP_PHOTOS_BUCKET)
        .expect("url should resolve to an object path");
    assert!(path.starts_with(&format!("{}/", user.id())));
    assert!(path.ends_with(".jpg"));
    assert!(h.backend.has_object(TRIP_PHOTOS_BUCKET, &path));

    h.trips.delete(&user, trip.id).await.unwrap();
    assert!(!h.backend.has_object(TRIP_PHOTOS_BUCKET, &path));
}

#[tokio::test]
async fn test_replacing_photo_removes_the_old_object() {
    let h = harness();
    let user = free_user(&h.backend, "a@b.c", "wanderer");
    let trip = h
        .trips
        .create(&user, sample_trip("With photo"), Some(sample_photo()))
        .await
        .unwrap();
    let old_path = object_path_from_url(
        trip.photo_url.as_deref().unwrap(),
        TRIP_PHOTOS_BUCKET,
    )
    .unwrap();

    let mut replacement = sample_photo();
    replacement.file_name = "sunrise.png".to_string();
    replacement.content_type = "image/png".to_string();
    h.trips
        .update(&user, trip.id, TripUpdate::default(), Some(replacement))
        .await
        .unwrap();

    assert!(!h.backend.has_object(TRIP_PHOTOS_BUCKET, &old_path));
    let updated = h.trips.detail(trip.id).await.unwrap();
    let new_url = updated.trip.photo_url.expect("new photo url should be set");
    let new_path = object_path_from_url(&new_url, TRIP_PHOTOS_BUCKET).unwrap();
    assert!(new_path.ends_with(".png"));
    assert!(h.backend.has_object(TRIP_PHOTOS_BUCKET, &new_path));
}

#[tokio::test]
async fn test_change_feed_reports_own_mutations() {
    let h = harness();
    let user = free_user(&h.backend, "a@b.c", "wanderer");
    let mut subscription = h.changes.subscribe_trips(Some(user.id()));

    let trip = h.trips.create(&user, sample_trip("Tracked"), None).await.unwrap();

    let change = subscription.next().await.expect("change should arrive");
    assert_eq!(change.kind, ChangeKind::Insert);
    assert_eq!(change.trip_id, trip.id);
    assert_eq!(change.user_id, user.id());
}

#[tokio::test]
async fn test_upgrade_unlocks_posting_and_refreshes_session() {
    let h = harness();
    let user = free_user(&h.backend, "a@b.c", "wanderer");
    h.trips.create(&user, sample_trip("First trip"), None).await.unwrap();

    let store = SessionStore::new(
        Arc::clone(&h.backend) as Arc<dyn AuthProvider>,
        Arc::clone(&h.backend) as Arc<dyn TableStore>,
        Arc::new(NullNavigator) as Arc<dyn Navigator>,
        ADMIN_EMAIL,
    );
    h.backend.open_session(user.identity.clone());
    store.bootstrap().await;
    assert!(!store.entitlements().is_premium);

    let upgrade = UpgradeService::new(
        Arc::clone(&h.backend) as Arc<dyn TableStore>,
        Arc::clone(&store),
    );
    upgrade.upgrade(&user).await.unwrap();

    // The session re-enriched and now reflects the new plan
    assert!(store.entitlements().is_premium);
    let refreshed = store.state().user.expect("user should still be signed in");
    assert_eq!(refreshed.plan_level(), PlanLevel::Premium);

    // The gate no longer applies
    let second = h.trips.create(&refreshed, sample_trip("Second trip"), None).await;
    assert!(second.is_ok());
}

#[tokio::test]
async fn test_admin_can_delete_any_trip_but_others_cannot() {
    let h = harness();
    let owner = free_user(&h.backend, "owner@b.c", "owner");
    let trip = h.trips.create(&owner, sample_trip("Flagged"), None).await.unwrap();

    let admin_service = AdminService::new(
        Arc::clone(&h.backend) as Arc<dyn TableStore>,
        Arc::clone(&h.backend) as Arc<dyn ObjectStore>,
        ADMIN_EMAIL,
    );

    let not_admin = free_user(&h.backend, "user@b.c", "user");
    let denied = admin_service.delete_trip(&not_admin, trip.id).await;
    assert!(matches!(denied, Err(Error::Denied(_))));

    let admin = free_user(&h.backend, ADMIN_EMAIL, "ops");
    admin_service.delete_trip(&admin, trip.id).await.unwrap();
    assert!(matches!(
        h.trips.detail(trip.id).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_admin_list_filters_by_author_or_title() {
    let h = harness();
    let alice = premium_user(&h.backend, "alice@b.c", "alice");
    let bob = premium_user(&h.backend, "bob@b.c", "bob");
    h.trips.create(&alice, sample_trip("Coastal ride"), None).await.unwrap();
    h.trips.create(&bob, sample_trip("Desert trek"), None).await.unwrap();

    let admin_service = AdminService::new(
        Arc::clone(&h.backend) as Arc<dyn TableStore>,
        Arc::clone(&h.backend) as Arc<dyn ObjectStore>,
        ADMIN_EMAIL,
    );
    let admin = free_user(&h.backend, ADMIN_EMAIL, "ops");

    let by_author = admin_service.list_all_trips(&admin, Some("bob")).await.unwrap();
    assert_eq!(by_author.len(), 1);
    assert_eq!(by_author[0].trip.title, "Desert trek");

    let by_title = admin_service.list_all_trips(&admin, Some("coastal")).await.unwrap();
    assert_eq!(by_title.len(), 1);

    let everything = admin_service.list_all_trips(&admin, None).await.unwrap();
    assert_eq!(everything.len(), 2);
}

#[tokio::test]
async fn test_detail_of_unknown_trip_is_not_found() {
    let h = harness();
    let result = h.trips.detail(Uuid::new_v4()).await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}
