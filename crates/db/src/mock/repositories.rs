use std::collections::HashMap;

use async_trait::async_trait;
use mockall::mock;
use scoutplan_core::{
    models::{
        activity::ActivitySummary,
        entry::{ProgramEntry, ScheduledEntry},
        program::Program,
    },
    store::ProgramEntryStore,
};
use uuid::Uuid;

use crate::models::DbUser;

// Mock repositories for testing
mock! {
    pub ProgramRepo {
        pub async fn get_program_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<Program>>;

        pub async fn get_entries_by_program_id(
            &self,
            program_id: Uuid,
        ) -> eyre::Result<Vec<ProgramEntry>>;

        pub async fn delete_program(
            &self,
            id: Uuid,
        ) -> eyre::Result<bool>;
    }
}

mock! {
    pub ActivityRepo {
        pub async fn get_activity_summaries(
            &self,
            ids: Vec<Uuid>,
        ) -> eyre::Result<HashMap<Uuid, ActivitySummary>>;
    }
}

mock! {
    pub UserRepo {
        pub async fn get_user_by_session_token(
            &self,
            token: &'static str,
        ) -> eyre::Result<Option<DbUser>>;
    }
}

mock! {
    pub EntryStore {}

    #[async_trait]
    impl ProgramEntryStore for EntryStore {
        async fn replace_entries(
            &self,
            program_id: Uuid,
            entries: &[ScheduledEntry],
        ) -> eyre::Result<()>;
    }
}
