use async_trait::async_trait;
use uuid::Uuid;

use crate::models::entry::ScheduledEntry;

/// Storage boundary for a program's entry list.
///
/// Implementations must replace the whole list as one unit: readers see
/// either the old entries or the new ones, never an empty or partial set.
#[async_trait]
pub trait ProgramEntryStore: Send + Sync {
    async fn replace_entries(
        &self,
        program_id: Uuid,
        entries: &[ScheduledEntry],
    ) -> eyre::Result<()>;
}
