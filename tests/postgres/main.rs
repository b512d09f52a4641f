//! PostgreSQL adapter tests.
//!
//! Skipped unless `CONTACTS_TEST_DSN` points at a scratch database. The
//! schema in `sql/schema.sql` is applied before each test.

#![cfg(feature = "postgres")]

use std::time::Duration;

use contact_service::store::postgres::{self, PostgresContactStore, PostgresGroupStore};
use contact_service::{
    ContactStore, DbConfig, GroupStore, NewContact, NewGroup, StoreError, INITIAL_VERSION,
};
use tokio::time::Instant;

const SCHEMA: &str = include_str!("../../sql/schema.sql");

async fn pool() -> Option<deadpool_postgres::Pool> {
    let dsn = std::env::var("CONTACTS_TEST_DSN").ok()?;
    let cfg = DbConfig {
        dsn,
        max_open_conns: 4,
        ..DbConfig::default()
    };
    let pool = postgres::open_pool(&cfg).unwrap();
    postgres::ping(&pool, Duration::from_secs(5)).await.unwrap();
    // Parallel tests race on CREATE TABLE IF NOT EXISTS without the lock.
    let setup = format!("BEGIN; SELECT pg_advisory_xact_lock(7420); {SCHEMA} COMMIT;");
    pool.get().await.unwrap().batch_execute(&setup).await.unwrap();
    Some(pool)
}

fn deadline() -> Instant {
    Instant::now() + Duration::from_secs(6)
}

#[tokio::test]
async fn contact_lifecycle() {
    let Some(pool) = pool().await else { return };
    let store = PostgresContactStore::new(pool);

    let created = store
        .create(&NewContact::new("Jane Q Public", "+1-555-0100"), deadline())
        .await
        .unwrap();
    assert!(created.id >= 1);
    assert_eq!(created.version, INITIAL_VERSION);

    let loaded = store.get_by_id(created.id, deadline()).await.unwrap();
    assert_eq!(loaded.full_name, "Jane Q Public");
    assert_eq!(loaded.created_at, created.created_at);

    let mut edited = loaded.clone();
    edited.phone = "555-0199".into();
    let version = store.update(&edited, deadline()).await.unwrap();
    assert_eq!(version, loaded.version + 1);

    store.delete(created.id, deadline()).await.unwrap();
    let err = store.get_by_id(created.id, deadline()).await.unwrap_err();
    assert!(err.is_not_found());
    let err = store.delete(created.id, deadline()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn stale_contact_update_conflicts() {
    let Some(pool) = pool().await else { return };
    let store = PostgresContactStore::new(pool);

    let original = store
        .create(&NewContact::new("Jane Q Public", "555"), deadline())
        .await
        .unwrap();
    let mut first = original.clone();
    first.full_name = "Jane R Public".into();
    store.update(&first, deadline()).await.unwrap();

    let mut stale = original.clone();
    stale.full_name = "Jane S Public".into();
    let err = store.update(&stale, deadline()).await.unwrap_err();
    assert!(matches!(err, StoreError::EditConflict { .. }));

    let stored = store.get_by_id(original.id, deadline()).await.unwrap();
    assert_eq!(stored.full_name, "Jane R Public");
    assert_eq!(stored.version, original.version + 1);
}

#[tokio::test]
async fn update_of_deleted_contact_conflicts() {
    let Some(pool) = pool().await else { return };
    let store = PostgresContactStore::new(pool);

    let contact = store
        .create(&NewContact::new("Jane Q Public", "555"), deadline())
        .await
        .unwrap();
    store.delete(contact.id, deadline()).await.unwrap();
    assert!(store
        .update(&contact, deadline())
        .await
        .unwrap_err()
        .is_edit_conflict());
}

#[tokio::test]
async fn group_rename_and_conflict() {
    let Some(pool) = pool().await else { return };
    let store = PostgresGroupStore::new(pool);

    let group = store
        .create(&NewGroup::new("friends"), deadline())
        .await
        .unwrap();
    let mut renamed = group.clone();
    renamed.group_name = "family".into();
    assert_eq!(
        store.update(&renamed, deadline()).await.unwrap(),
        group.version + 1
    );
    assert!(store
        .update(&renamed, deadline())
        .await
        .unwrap_err()
        .is_edit_conflict());

    let stored = store.get_by_id(group.id, deadline()).await.unwrap();
    assert_eq!(stored.group_name, "family");
}

#[tokio::test]
async fn reaper_trims_idle_connections() {
    let Some(pool) = pool().await else { return };
    {
        let _a = pool.get().await.unwrap();
        let _b = pool.get().await.unwrap();
    }
    assert!(pool.status().size >= 2);

    let evicted = postgres::reap_idle(&pool, 1, Duration::from_secs(900));
    assert!(evicted >= 1);
    assert_eq!(pool.status().size, 1);
}
