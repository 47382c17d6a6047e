//! Key-value storage used by generated prototypes

use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use serde::Serialize;
use serde_json::Value;
use tokio_postgres::Row;

use crate::store::error::Result;

#[derive(Debug, Clone, Serialize)]
pub struct DemoData {
    pub id: i64,
    pub project_id: i64,
    pub data_key: String,
    pub data_content: Value,
    pub updated_at: DateTime<Utc>,
}

fn parse_demo_data_row(row: &Row) -> Result<DemoData> {
    Ok(DemoData {
        id: row.try_get("id")?,
        project_id: row.try_get("project_id")?,
        data_key: row.try_get("data_key")?,
        data_content: row.try_get("data_content")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub async fn get_demo_data(pool: &Pool, project_id: i64, key: &str) -> Result<Option<DemoData>> {
    let conn = pool.get().await?;

    let row = conn
        .query_opt(
            "SELECT * FROM demo_data WHERE project_id = $1 AND data_key = $2",
            &[&project_id, &key],
        )
        .await?;

    row.as_ref().map(parse_demo_data_row).transpose()
}

/// Insert or replace the value stored under `key`
pub async fn put_demo_data(pool: &Pool, project_id: i64, key: &str, content: &Value) -> Result<()> {
    let conn = pool.get().await?;

    conn.execute(
        "INSERT INTO demo_data (project_id, data_key, data_content)
         VALUES ($1, $2, $3)
         ON CONFLICT (project_id, data_key)
         DO UPDATE SET data_content = EXCLUDED.data_content, updated_at = now()",
        &[&project_id, &key, content],
    )
    .await?;

    Ok(())
}

/// Returns the number of removed rows (0 or 1)
pub async fn clear_demo_data(pool: &Pool, project_id: i64, key: &str) -> Result<u64> {
    let conn = pool.get().await?;

    let deleted = conn
        .execute(
            "DELETE FROM demo_data WHERE project_id = $1 AND data_key = $2",
            &[&project_id, &key],
        )
        .await?;

    Ok(deleted)
}
