//! Metadata of uploaded files; the bytes live on local disk

use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use serde::Serialize;
use tokio_postgres::Row;

use crate::store::error::{Result, StoreError};

pub const FILE_NOT_FOUND: &str = "File not found";

#[derive(Debug, Clone, Serialize)]
pub struct FileUpload {
    pub id: i64,
    pub filename: String,
    pub file_path: String,
    pub file_type: String,
    pub user_id: Option<i64>,
    pub project_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Values for a new metadata row
#[derive(Debug, Clone)]
pub struct NewFileUpload {
    pub filename: String,
    pub file_path: String,
    pub file_type: String,
    pub user_id: i64,
    pub project_id: Option<i64>,
}

fn parse_file_row(row: &Row) -> Result<FileUpload> {
    Ok(FileUpload {
        id: row.try_get("id")?,
        filename: row.try_get("filename")?,
        file_path: row.try_get("file_path")?,
        file_type: row.try_get("file_type")?,
        user_id: row.try_get("user_id")?,
        project_id: row.try_get("project_id")?,
        created_at: row.try_get("created_at")?,
    })
}

pub async fn insert_file(pool: &Pool, file: &NewFileUpload) -> Result<FileUpload> {
    let conn = pool.get().await?;

    let row = conn
        .query_one(
            "INSERT INTO file_uploads (filename, file_path, file_type, user_id, project_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
            &[
                &file.filename,
                &file.file_path,
                &file.file_type,
                &file.user_id,
                &file.project_id,
            ],
        )
        .await?;

    parse_file_row(&row)
}

/// The caller's uploads attached to `project_id`, oldest first
pub async fn list_project_files(
    pool: &Pool,
    user_id: i64,
    project_id: i64,
) -> Result<Vec<FileUpload>> {
    let conn = pool.get().await?;

    let rows = conn
        .query(
            "SELECT * FROM file_uploads
             WHERE project_id = $1 AND user_id = $2
             ORDER BY id",
            &[&project_id, &user_id],
        )
        .await?;

    rows.iter().map(parse_file_row).collect()
}

pub async fn get_file(pool: &Pool, file_id: i64) -> Result<FileUpload> {
    let conn = pool.get().await?;

    let row = conn
        .query_opt("SELECT * FROM file_uploads WHERE id = $1", &[&file_id])
        .await?
        .ok_or_else(|| StoreError::NotFound(FILE_NOT_FOUND.to_string()))?;

    parse_file_row(&row)
}
