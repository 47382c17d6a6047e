//! Table definitions, applied idempotently at startup

use deadpool_postgres::Pool;
use tracing::info;

use crate::store::error::Result;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id              BIGSERIAL PRIMARY KEY,
    username        TEXT NOT NULL UNIQUE,
    hashed_password TEXT NOT NULL,
    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
    is_admin        BOOLEAN NOT NULL DEFAULT FALSE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS licenses (
    id          BIGSERIAL PRIMARY KEY,
    license_key TEXT NOT NULL UNIQUE,
    user_id     BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
    max_calls   INTEGER NOT NULL DEFAULT 100,
    used_calls  INTEGER NOT NULL DEFAULT 0,
    expires_at  TIMESTAMPTZ NOT NULL,
    is_active   BOOLEAN NOT NULL DEFAULT TRUE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS licenses_active_user_idx ON licenses (user_id) WHERE is_active;

CREATE TABLE IF NOT EXISTS projects (
    id               BIGSERIAL PRIMARY KEY,
    name             TEXT NOT NULL,
    description      TEXT,
    user_id          BIGINT REFERENCES users (id) ON DELETE CASCADE,
    raw_requirement  TEXT,
    requirements_doc TEXT,
    product_doc      TEXT,
    tech_doc         TEXT,
    demo_code        TEXT,
    report_content   TEXT,
    share_token      TEXT UNIQUE,
    created_at       TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at       TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS projects_user_updated_idx ON projects (user_id, updated_at DESC);

CREATE TABLE IF NOT EXISTS demo_data (
    id           BIGSERIAL PRIMARY KEY,
    project_id   BIGINT NOT NULL REFERENCES projects (id) ON DELETE CASCADE,
    data_key     TEXT NOT NULL,
    data_content JSONB NOT NULL DEFAULT '[]'::jsonb,
    updated_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (project_id, data_key)
);

CREATE TABLE IF NOT EXISTS file_uploads (
    id         BIGSERIAL PRIMARY KEY,
    filename   TEXT NOT NULL,
    file_path  TEXT NOT NULL,
    file_type  TEXT NOT NULL,
    user_id    BIGINT REFERENCES users (id) ON DELETE SET NULL,
    project_id BIGINT REFERENCES projects (id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS file_uploads_project_idx ON file_uploads (project_id, user_id);
"#;

/// Create any missing tables and indexes
pub async fn apply_schema(pool: &Pool) -> Result<()> {
    let conn = pool.get().await?;
    conn.batch_execute(SCHEMA).await?;
    info!("database schema is up to date");
    Ok(())
}
