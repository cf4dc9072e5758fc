use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Create pipelines table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pipelines (
            id UUID PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            description TEXT,
            docker_image TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            tags TEXT[] NOT NULL DEFAULT '{}',
            instance_type VARCHAR(255),
            disk_size BIGINT,
            env_vars JSONB NOT NULL DEFAULT '{}'
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create runs table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS runs (
            id UUID PRIMARY KEY,
            pipeline_id UUID REFERENCES pipelines(id) ON DELETE SET NULL,
            status VARCHAR(50) NOT NULL,
            docker_image TEXT NOT NULL,
            owner VARCHAR(255) NOT NULL,
            node_name VARCHAR(255),
            node_type VARCHAR(255),
            node_disk BIGINT,
            service_urls JSONB NOT NULL DEFAULT '{}',
            parameters JSONB NOT NULL DEFAULT '[]',
            started_at TIMESTAMPTZ NOT NULL,
            finished_at TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create docker registries table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS docker_registries (
            id UUID PRIMARY KEY,
            path VARCHAR(255) NOT NULL UNIQUE,
            description TEXT,
            external_url VARCHAR(255),
            owner VARCHAR(255) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create tool groups table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tool_groups (
            id UUID PRIMARY KEY,
            registry_id UUID NOT NULL REFERENCES docker_registries(id) ON DELETE CASCADE,
            name VARCHAR(255) NOT NULL,
            owner VARCHAR(255) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            UNIQUE (registry_id, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create tools table. The (registry_id, image) constraint is what makes
    // concurrent registrations of one image surface as a conflict.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tools (
            id UUID PRIMARY KEY,
            registry_id UUID NOT NULL REFERENCES docker_registries(id) ON DELETE CASCADE,
            tool_group_id UUID NOT NULL REFERENCES tool_groups(id) ON DELETE CASCADE,
            image VARCHAR(255) NOT NULL,
            owner VARCHAR(255) NOT NULL,
            cpu VARCHAR(50) NOT NULL,
            ram VARCHAR(50) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            UNIQUE (registry_id, image)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create tool versions table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tool_versions (
            id SERIAL PRIMARY KEY,
            tool_id UUID NOT NULL REFERENCES tools(id) ON DELETE CASCADE,
            version VARCHAR(255) NOT NULL,
            digest VARCHAR(255) NOT NULL,
            size BIGINT NOT NULL,
            modified_at TIMESTAMPTZ NOT NULL,
            UNIQUE (tool_id, version)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create permissions table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS permissions (
            id SERIAL PRIMARY KEY,
            user_name VARCHAR(255) NOT NULL,
            entity_kind VARCHAR(50) NOT NULL,
            entity_id UUID NOT NULL,
            can_write BOOLEAN NOT NULL DEFAULT FALSE,
            UNIQUE (user_name, entity_kind, entity_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for better query performance
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_runs_status ON runs(status)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_runs_pipeline_id ON runs(pipeline_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_runs_started_at ON runs(started_at DESC)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tools_registry_image ON tools(registry_id, image)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_tool_versions_tool_id ON tool_versions(tool_id, version)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
