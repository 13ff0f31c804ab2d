use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at)",
    "CREATE INDEX IF NOT EXISTS idx_activities_name ON activities(name)",
    "CREATE INDEX IF NOT EXISTS idx_activities_is_approved ON activities(is_approved)",
    "CREATE INDEX IF NOT EXISTS idx_activity_categories_category_id ON activity_categories(category_id)",
    "CREATE INDEX IF NOT EXISTS idx_programs_user_id ON programs(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_programs_is_public ON programs(is_public)",
    "CREATE INDEX IF NOT EXISTS idx_program_entries_program_id ON program_entries(program_id)",
];

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create users table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            username VARCHAR(64) NOT NULL UNIQUE,
            password_hash VARCHAR(255) NOT NULL,
            is_admin BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create sessions table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token VARCHAR(128) PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            expires_at TIMESTAMP WITH TIME ZONE NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create categories table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(100) NOT NULL UNIQUE
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create activities table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS activities (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            materials TEXT NULL,
            approximate_duration_minutes INTEGER NOT NULL,
            group_size VARCHAR(64) NULL,
            effort_level VARCHAR(16) NOT NULL,
            location VARCHAR(16) NOT NULL,
            age_group VARCHAR(64) NULL,
            is_approved BOOLEAN NOT NULL DEFAULT FALSE,
            created_by UUID NULL REFERENCES users(id) ON DELETE SET NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_duration CHECK (approximate_duration_minutes >= 0),
            CONSTRAINT valid_effort_level CHECK (effort_level IN ('low', 'medium', 'high')),
            CONSTRAINT valid_location CHECK (location IN ('indoor', 'outdoor', 'both'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create activity_categories table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS activity_categories (
            activity_id UUID NOT NULL REFERENCES activities(id) ON DELETE CASCADE,
            category_id UUID NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
            PRIMARY KEY (activity_id, category_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create programs table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS programs (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            date DATE NULL,
            start_time VARCHAR(5) NOT NULL,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            is_public BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create program_entries table. No foreign key on activity_id: a deleted
    // activity leaves a dangling id that schedules as 0 minutes.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS program_entries (
            id UUID PRIMARY KEY,
            program_id UUID NOT NULL REFERENCES programs(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            start_time VARCHAR(16) NOT NULL,
            end_time VARCHAR(16) NOT NULL,
            entry_type VARCHAR(16) NOT NULL,
            activity_id UUID NULL,
            custom_title VARCHAR(255) NULL,
            custom_duration_minutes INTEGER NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT unique_entry_position UNIQUE (program_id, position),
            CONSTRAINT valid_position CHECK (position >= 0),
            CONSTRAINT entry_kind_fields CHECK (
                (entry_type = 'activity'
                    AND activity_id IS NOT NULL
                    AND custom_title IS NULL
                    AND custom_duration_minutes IS NULL)
                OR
                (entry_type = 'custom'
                    AND activity_id IS NULL
                    AND custom_title IS NOT NULL)
            )
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    for statement in INDEXES {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
