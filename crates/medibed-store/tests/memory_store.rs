//! In-memory store tests
//!
//! Covers:
//! - Store-managed fields on create and update
//! - Version-checked updates
//! - Append-only collections
//! - Filters and sort specs through the typed repository
//! - Snapshot persistence

use medibed_store::{
    fields, EntityStore, Filter, InMemoryStore, Repository, SortSpec, StoreError,
};
use medibed_types::{
    AuditAction, AuditEntry, BedCount, BedType, Booking, BookingStatus, Condition, Entity,
    EntityKind, GeoPoint, Hospital, RecordMeta,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

fn repo() -> (InMemoryStore, Repository) {
    let store = InMemoryStore::new();
    let repo = Repository::new(Arc::new(store.clone()));
    (store, repo)
}

fn hospital(name: &str) -> Hospital {
    let mut h = Hospital::new(name, GeoPoint::new(17.4, 78.4));
    h.beds.icu = BedCount::new(5, 10);
    h
}

fn booking(hospital_id: &str, patient: &str, status: BookingStatus) -> Booking {
    Booking {
        meta: RecordMeta::default(),
        patient_name: patient.to_string(),
        patient_email: format!("{}@example.com", patient.to_lowercase()),
        patient_phone: String::new(),
        hospital_id: hospital_id.to_string(),
        hospital_name: String::new(),
        bed_type: BedType::General,
        condition_type: Condition::Normal,
        notes: String::new(),
        status,
        patient_latitude: None,
        patient_longitude: None,
    }
}

// ============================================================================
// Create / update
// ============================================================================

#[tokio::test]
async fn test_create_assigns_id_and_version() {
    let (_, repo) = repo();
    let created = repo.create(&hospital("Apollo")).await.unwrap();

    assert!(!created.id().is_empty());
    assert_eq!(created.version(), 1);
    assert!(created.meta.created_date.is_some());
    assert_eq!(created.beds.icu, BedCount::new(5, 10));
}

#[tokio::test]
async fn test_update_bumps_version_and_ignores_meta_fields() {
    let (_, repo) = repo();
    let h = repo.create(&hospital("Apollo")).await.unwrap();

    repo.update::<Hospital>(h.id(), fields(json!({"phone": "+91 40 1234", "version": 99, "id": "x"})))
        .await
        .unwrap();

    let reloaded: Hospital = repo.get(h.id()).await.unwrap();
    assert_eq!(reloaded.phone.as_deref(), Some("+91 40 1234"));
    assert_eq!(reloaded.version(), 2);
    assert_eq!(reloaded.id(), h.id());
}

#[tokio::test]
async fn test_update_if_version_detects_stale_writer() {
    let (_, repo) = repo();
    let h = repo.create(&hospital("Apollo")).await.unwrap();

    let v2 = repo
        .update_if_version::<Hospital>(h.id(), 1, fields(json!({"name": "Apollo Jubilee"})))
        .await
        .unwrap();
    assert_eq!(v2, 2);

    let stale = repo
        .update_if_version::<Hospital>(h.id(), 1, fields(json!({"name": "Stale"})))
        .await;
    assert_eq!(
        stale,
        Err(StoreError::VersionConflict {
            kind: EntityKind::Hospital,
            id: h.id().to_string(),
            expected: 1,
            actual: 2,
        })
    );

    let reloaded: Hospital = repo.get(h.id()).await.unwrap();
    assert_eq!(reloaded.name, "Apollo Jubilee");
}

#[tokio::test]
async fn test_audit_log_is_append_only() {
    let (store, repo) = repo();
    let entry = AuditEntry::new(
        "admin@example.com",
        AuditAction::BedUpdate,
        "Updated bed counts. ICU: 5/10",
        "h1",
        chrono::Utc::now(),
    );
    let entry = repo.create(&entry).await.unwrap();

    let result = store
        .update(EntityKind::AuditLog, entry.id(), fields(json!({"details": "edited"})))
        .await;
    assert_eq!(result, Err(StoreError::AppendOnly(EntityKind::AuditLog)));

    let result = repo.delete::<AuditEntry>(entry.id()).await;
    assert_eq!(result, Err(StoreError::AppendOnly(EntityKind::AuditLog)));
    assert_eq!(store.count(EntityKind::AuditLog), 1);
}

#[tokio::test]
async fn test_delete_removes_record() {
    let (store, repo) = repo();
    let h = repo.create(&hospital("City General")).await.unwrap();
    let b = repo
        .create(&booking(h.id(), "Asha", BookingStatus::Pending))
        .await
        .unwrap();

    repo.delete::<Booking>(b.id()).await.unwrap();
    assert_eq!(repo.find::<Booking>(b.id()).await.unwrap(), None);
    assert_eq!(store.count(EntityKind::BedBooking), 0);
    assert_eq!(store.count(EntityKind::Hospital), 1);

    let again = repo.delete::<Booking>(b.id()).await;
    assert!(matches!(again, Err(StoreError::NotFound { kind: EntityKind::BedBooking, .. })));
}

#[tokio::test]
async fn test_missing_record() {
    let (_, repo) = repo();
    let result = repo.get::<Hospital>("nope").await;
    assert!(matches!(result, Err(StoreError::NotFound { kind: EntityKind::Hospital, .. })));

    let result = repo.update::<Hospital>("nope", fields(json!({"name": "x"}))).await;
    assert!(matches!(result, Err(StoreError::NotFound { .. })));
}

#[tokio::test]
async fn test_duplicate_caller_id_is_rejected() {
    let (store, _) = repo();
    store
        .create(EntityKind::Hospital, fields(json!({"id": "h1", "name": "A"})))
        .await
        .unwrap();
    let again = store
        .create(EntityKind::Hospital, fields(json!({"id": "h1", "name": "B"})))
        .await;
    assert!(matches!(again, Err(StoreError::Duplicate { .. })));
}

// ============================================================================
// Queries
// ============================================================================

#[tokio::test]
async fn test_filter_by_hospital_sorted_descending() {
    let (_, repo) = repo();
    for name in ["Asha", "Ravi", "Meena"] {
        repo.create(&booking("h1", name, BookingStatus::Pending)).await.unwrap();
    }
    repo.create(&booking("h2", "Other", BookingStatus::Pending)).await.unwrap();

    let sort: SortSpec = "-patient_name".parse().unwrap();
    let bookings: Vec<Booking> = repo
        .filter(&Filter::all().where_eq("hospital_id", "h1"), Some(&sort))
        .await
        .unwrap();

    let names: Vec<_> = bookings.iter().map(|b| b.patient_name.as_str()).collect();
    assert_eq!(names, vec!["Ravi", "Meena", "Asha"]);
}

#[tokio::test]
async fn test_filter_on_status_value() {
    let (_, repo) = repo();
    repo.create(&booking("h1", "Asha", BookingStatus::Approved)).await.unwrap();
    repo.create(&booking("h1", "Ravi", BookingStatus::Pending)).await.unwrap();

    let approved: Vec<Booking> = repo
        .filter(&Filter::all().where_eq("status", "Approved"), None)
        .await
        .unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].patient_name, "Asha");
}

// ============================================================================
// Snapshots
// ============================================================================

#[tokio::test]
async fn test_snapshot_round_trip_through_file() {
    let (store, repo) = repo();
    let h = repo.create(&hospital("Apollo")).await.unwrap();
    repo.create(&booking(h.id(), "Asha", BookingStatus::Pending)).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medibed.json");
    store.save(&path).unwrap();

    let restored = InMemoryStore::load(&path).unwrap();
    assert_eq!(restored.count(EntityKind::Hospital), 1);
    assert_eq!(restored.count(EntityKind::BedBooking), 1);

    let restored_repo = Repository::new(Arc::new(restored));
    let reloaded: Hospital = restored_repo.get(h.id()).await.unwrap();
    assert_eq!(reloaded, h);
}

#[test]
fn test_load_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = InMemoryStore::load(dir.path().join("absent.json")).unwrap();
    assert_eq!(store.count(EntityKind::Hospital), 0);
}

#[test]
fn test_snapshot_rejects_unknown_kind() {
    let result = InMemoryStore::from_snapshot(&json!({"Doctor": []}));
    assert!(matches!(result, Err(StoreError::Serialization(_))));
}
