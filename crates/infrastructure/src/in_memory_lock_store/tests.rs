use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use pit_application::{LeaseRenewal, LockLease, LockStore};
use pit_domain::{LockId, LockOwner};

use super::InMemoryLockStore;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("test"))
}

fn lock_id(value: &str) -> LockId {
    LockId::new(value).unwrap_or_else(|_| panic!("test"))
}

fn owner(value: &str) -> LockOwner {
    LockOwner::new(value).unwrap_or_else(|_| panic!("test"))
}

fn lease(id: &str, holder: &str, at: DateTime<Utc>, seconds: i64) -> LockLease {
    LockLease {
        lock_id: lock_id(id),
        owner: owner(holder),
        acquired_at: at,
        expires_at: at + Duration::seconds(seconds),
    }
}

fn renewal(id: &str, holder: &str, at: DateTime<Utc>, seconds: i64) -> LeaseRenewal {
    LeaseRenewal {
        lock_ids: vec![lock_id(id)],
        owner: owner(holder),
        renewed_at: at,
        expires_at: at + Duration::seconds(seconds),
    }
}

#[tokio::test]
async fn lock_becomes_free_exactly_at_expiry() {
    let store = InMemoryLockStore::new();

    assert!(matches!(store.try_acquire(&lease("L1", "A", start(), 10)).await, Ok(true)));

    let just_before = start() + Duration::seconds(9);
    assert!(matches!(store.try_acquire(&lease("L1", "B", just_before, 10)).await, Ok(false)));

    let at_expiry = start() + Duration::seconds(10);
    assert!(matches!(store.try_acquire(&lease("L1", "B", at_expiry, 10)).await, Ok(true)));

    let stored = store.find(&lock_id("L1")).await;
    assert!(matches!(
        stored,
        Ok(Some(ref lock)) if lock.owner().as_str() == "B" && lock.created_at() == at_expiry
    ));
}

#[tokio::test]
async fn renewal_keeps_creation_time_and_rejects_expired_rows() {
    let store = InMemoryLockStore::new();
    assert!(matches!(store.try_acquire(&lease("L1", "A", start(), 10)).await, Ok(true)));

    let renewed_at = start() + Duration::seconds(5);
    assert!(matches!(
        store.extend_expiry(&renewal("L1", "A", renewed_at, 30)).await,
        Ok(ref ids) if ids == &[lock_id("L1")]
    ));
    assert!(matches!(
        store.extend_expiry(&renewal("L1", "B", renewed_at, 30)).await,
        Ok(ref ids) if ids.is_empty()
    ));

    let stored = store.find(&lock_id("L1")).await;
    assert!(matches!(
        stored,
        Ok(Some(ref lock))
            if lock.created_at() == start() && lock.expires_at() == renewed_at + Duration::seconds(30)
    ));

    let after_expiry = renewed_at + Duration::seconds(31);
    assert!(matches!(
        store.extend_expiry(&renewal("L1", "A", after_expiry, 30)).await,
        Ok(ref ids) if ids.is_empty()
    ));
    assert!(matches!(
        store.extend_expiry(&renewal("L2", "A", after_expiry, 30)).await,
        Ok(ref ids) if ids.is_empty()
    ));
}

#[tokio::test]
async fn shorter_renewal_keeps_later_expiry() {
    let store = InMemoryLockStore::new();
    assert!(matches!(store.try_acquire(&lease("S1", "A", start(), 600)).await, Ok(true)));

    assert!(matches!(
        store.extend_expiry(&renewal("S1", "A", start(), 5)).await,
        Ok(ref ids) if ids.len() == 1
    ));

    let later = start() + Duration::seconds(10);
    assert!(matches!(store.try_acquire(&lease("S1", "B", later, 10)).await, Ok(false)));
    assert!(matches!(
        store.find(&lock_id("S1")).await,
        Ok(Some(ref lock)) if lock.expires_at() == start() + Duration::seconds(600)
    ));
}

#[tokio::test]
async fn remove_requires_matching_owner() {
    let store = InMemoryLockStore::new();
    assert!(matches!(store.try_acquire(&lease("L1", "A", start(), 10)).await, Ok(true)));

    assert!(matches!(store.try_acquire(&lease("L2", "B", start(), 10)).await, Ok(true)));
    let requested = [lock_id("L1"), lock_id("L2"), lock_id("missing")];

    assert!(matches!(
        store.remove_if_owned(&requested, &owner("C")).await,
        Ok(ref ids) if ids.is_empty()
    ));
    assert!(matches!(
        store.remove_if_owned(&requested, &owner("A")).await,
        Ok(ref ids) if ids == &[lock_id("L1")]
    ));
    assert!(matches!(
        store.remove_if_owned(&requested, &owner("A")).await,
        Ok(ref ids) if ids.is_empty()
    ));
    assert!(matches!(store.find(&lock_id("L1")).await, Ok(None)));
    assert!(matches!(store.find(&lock_id("L2")).await, Ok(Some(_))));
}

#[tokio::test]
async fn purge_keeps_rows_expiring_at_or_after_cutoff() {
    let store = InMemoryLockStore::new();
    assert!(matches!(store.try_acquire(&lease("old", "A", start(), 10)).await, Ok(true)));
    assert!(matches!(store.try_acquire(&lease("edge", "A", start(), 20)).await, Ok(true)));
    assert!(matches!(store.try_acquire(&lease("new", "A", start(), 60)).await, Ok(true)));

    let purged = store.purge_expired(start() + Duration::seconds(20)).await;

    assert!(matches!(purged, Ok(1)));
    assert!(matches!(store.find(&lock_id("old")).await, Ok(None)));
    assert!(matches!(store.find(&lock_id("edge")).await, Ok(Some(_))));
    assert!(matches!(store.find(&lock_id("new")).await, Ok(Some(_))));
}

#[tokio::test]
async fn concurrent_acquires_have_single_winner() {
    let store = Arc::new(InMemoryLockStore::new());

    let mut tasks = tokio::task::JoinSet::new();
    for index in 0..32 {
        let store = store.clone();
        let attempt = lease("race", &format!("owner-{index}"), start(), 30);
        tasks.spawn(async move { store.try_acquire(&attempt).await });
    }

    let mut winners = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(true)) => winners += 1,
            Ok(Ok(false)) => {}
            Ok(Err(error)) => panic!("acquire failed: {error}"),
            Err(error) => panic!("task failed: {error}"),
        }
    }

    assert_eq!(winners, 1);
}
