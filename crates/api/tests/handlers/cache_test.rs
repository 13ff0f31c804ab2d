use std::collections::HashMap;
use std::time::Duration;

use pretty_assertions::assert_eq;
use scoutplan_api::{
    cache::{QueryCache, QueryKey},
    handlers::program::build_detail,
};
use scoutplan_core::time::ClockTime;
use uuid::Uuid;

use crate::test_utils::{sample_activity, sample_program};

fn cache() -> QueryCache {
    QueryCache::new(100, Duration::from_secs(60))
}

#[tokio::test]
async fn test_program_round_trip_and_invalidate() {
    let cache = cache();
    let program = sample_program(Uuid::new_v4(), ClockTime::from_hm(9, 0));
    let id = program.id;

    assert!(cache.program(id).await.is_none());
    cache
        .put_program(build_detail(program, Vec::new(), &HashMap::new()))
        .await;
    assert_eq!(cache.program(id).await.map(|d| d.program.id), Some(id));

    cache.invalidate(&QueryKey::program(id)).await;
    assert!(cache.program(id).await.is_none());
}

#[tokio::test]
async fn test_keys_do_not_collide_across_kinds() {
    let cache = cache();
    let activity = sample_activity(None, 20, true);
    let id = activity.id;

    cache.put_activity(activity).await;

    assert!(cache.program(id).await.is_none());
    assert_eq!(cache.activity(id).await.map(|a| a.id), Some(id));
}

#[tokio::test]
async fn test_invalidate_programs_keeps_activities() {
    let cache = cache();
    let activity = sample_activity(None, 20, true);
    let activity_id = activity.id;
    cache.put_activity(activity).await;

    let mut program_ids = Vec::new();
    for _ in 0..3 {
        let program = sample_program(Uuid::new_v4(), ClockTime::from_hm(9, 0));
        program_ids.push(program.id);
        cache
            .put_program(build_detail(program, Vec::new(), &HashMap::new()))
            .await;
    }

    cache.invalidate_programs();
    cache.run_pending_tasks().await;

    for id in program_ids {
        assert!(cache.program(id).await.is_none());
    }
    assert!(cache.activity(activity_id).await.is_some());
}

#[tokio::test]
async fn test_older_detail_does_not_replace_newer() {
    let cache = cache();
    let stale = sample_program(Uuid::new_v4(), ClockTime::from_hm(9, 0));
    let mut fresh = stale.clone();
    fresh.start_time = ClockTime::from_hm(10, 0);
    fresh.updated_at = stale.updated_at + chrono::Duration::seconds(5);
    let id = fresh.id;

    cache
        .put_program(build_detail(fresh, Vec::new(), &HashMap::new()))
        .await;
    let kept = cache
        .put_program(build_detail(stale, Vec::new(), &HashMap::new()))
        .await;

    assert_eq!(kept.program.start_time, ClockTime::from_hm(10, 0));
    assert_eq!(
        cache.program(id).await.map(|d| d.program.start_time),
        Some(ClockTime::from_hm(10, 0))
    );
}

#[tokio::test]
async fn test_newer_detail_replaces_older() {
    let cache = cache();
    let stale = sample_program(Uuid::new_v4(), ClockTime::from_hm(9, 0));
    let mut fresh = stale.clone();
    fresh.start_time = ClockTime::from_hm(10, 0);
    fresh.updated_at = stale.updated_at + chrono::Duration::seconds(5);
    let id = fresh.id;

    cache
        .put_program(build_detail(stale, Vec::new(), &HashMap::new()))
        .await;
    cache
        .put_program(build_detail(fresh, Vec::new(), &HashMap::new()))
        .await;

    assert_eq!(
        cache.program(id).await.map(|d| d.program.start_time),
        Some(ClockTime::from_hm(10, 0))
    );
}

#[test]
fn test_key_factory() {
    let id = Uuid::new_v4();
    assert!(QueryKey::program(id).is_program());
    assert!(!QueryKey::activity(id).is_program());
    assert_ne!(QueryKey::program(id), QueryKey::activity(id));
}
