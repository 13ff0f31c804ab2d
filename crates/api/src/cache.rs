//! # Query Cache
//!
//! Shared cache of assembled responses, owned by [`crate::ApiState`] and
//! passed to handlers through it. Keys come from the [`QueryKey`] factory
//! functions; every write path invalidates the keys it affects explicitly.

use std::sync::Arc;
use std::time::Duration;

use moka::{future::Cache, ops::compute::Op};
use scoutplan_core::models::{activity::Activity, program::ProgramDetailResponse};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Program(Uuid),
    Activity(Uuid),
}

impl QueryKey {
    pub fn program(id: Uuid) -> Self {
        QueryKey::Program(id)
    }

    pub fn activity(id: Uuid) -> Self {
        QueryKey::Activity(id)
    }

    pub fn is_program(&self) -> bool {
        matches!(self, QueryKey::Program(_))
    }
}

#[derive(Debug, Clone)]
pub enum CachedValue {
    Program(Arc<ProgramDetailResponse>),
    Activity(Arc<Activity>),
}

#[derive(Clone)]
pub struct QueryCache {
    inner: Cache<QueryKey, CachedValue>,
}

impl QueryCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .support_invalidation_closures()
                .build(),
        }
    }

    pub async fn program(&self, id: Uuid) -> Option<Arc<ProgramDetailResponse>> {
        match self.inner.get(&QueryKey::program(id)).await {
            Some(CachedValue::Program(detail)) => Some(detail),
            _ => None,
        }
    }

    /// Caches `detail` unless a newer detail of the same program is already
    /// cached, and returns whichever one the cache holds afterwards.
    ///
    /// Newer means a later `updated_at`; every program or entry write moves
    /// it, so a reader that loaded before a write cannot replace the
    /// writer's detail.
    pub async fn put_program(&self, detail: ProgramDetailResponse) -> Arc<ProgramDetailResponse> {
        let detail = Arc::new(detail);
        let candidate = detail.clone();

        let result = self
            .inner
            .entry(QueryKey::program(detail.program.id))
            .and_compute_with(move |current| {
                let op = match current.map(|entry| entry.into_value()) {
                    Some(CachedValue::Program(cached))
                        if cached.program.updated_at > candidate.program.updated_at =>
                    {
                        tracing::debug!(
                            program_id = %candidate.program.id,
                            "keeping newer cached program detail"
                        );
                        Op::Nop
                    }
                    _ => Op::Put(CachedValue::Program(candidate)),
                };
                std::future::ready(op)
            })
            .await;

        match result.into_entry().map(|entry| entry.into_value()) {
            Some(CachedValue::Program(kept)) => kept,
            _ => detail,
        }
    }

    pub async fn activity(&self, id: Uuid) -> Option<Arc<Activity>> {
        match self.inner.get(&QueryKey::activity(id)).await {
            Some(CachedValue::Activity(activity)) => Some(activity),
            _ => None,
        }
    }

    pub async fn put_activity(&self, activity: Activity) -> Arc<Activity> {
        let activity = Arc::new(activity);
        self.inner
            .insert(
                QueryKey::activity(activity.id),
                CachedValue::Activity(activity.clone()),
            )
            .await;
        activity
    }

    pub async fn invalidate(&self, key: &QueryKey) {
        tracing::debug!(?key, "invalidating cache entry");
        self.inner.invalidate(key).await;
    }

    /// Drops every cached program. Program details embed activity names and
    /// durations, so any activity write makes them stale.
    pub fn invalidate_programs(&self) {
        if let Err(e) = self.inner.invalidate_entries_if(|key, _| key.is_program()) {
            tracing::warn!("Falling back to full cache invalidation: {}", e);
            self.inner.invalidate_all();
        }
    }

    /// Applies pending evictions and invalidations.
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }
}
