//! Projects and their stage documents.
//!
//! Every operation taking a `user_id` is owner-scoped: a project owned by
//! someone else behaves exactly like a missing one.

use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::store::error::{Result, StoreError};

pub const PROJECT_NOT_FOUND: &str = "Project not found";
pub const SHARE_LINK_INVALID: &str = "Share link is no longer valid";

/// Default page size for [`list_projects`]
pub const DEFAULT_LIMIT: i64 = 100;
/// Largest page size accepted by [`list_projects`]
pub const MAX_LIMIT: i64 = 500;

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub user_id: Option<i64>,
    pub raw_requirement: Option<String>,
    pub requirements_doc: Option<String>,
    pub product_doc: Option<String>,
    pub tech_doc: Option<String>,
    pub demo_code: Option<String>,
    pub report_content: Option<String>,
    pub share_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update; absent or null fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub raw_requirement: Option<String>,
    #[serde(default)]
    pub requirements_doc: Option<String>,
    #[serde(default)]
    pub product_doc: Option<String>,
    #[serde(default)]
    pub tech_doc: Option<String>,
    #[serde(default)]
    pub demo_code: Option<String>,
    #[serde(default)]
    pub report_content: Option<String>,
}

pub(crate) fn parse_project_row(row: &Row) -> Result<Project> {
    Ok(Project {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        user_id: row.try_get("user_id")?,
        raw_requirement: row.try_get("raw_requirement")?,
        requirements_doc: row.try_get("requirements_doc")?,
        product_doc: row.try_get("product_doc")?,
        tech_doc: row.try_get("tech_doc")?,
        demo_code: row.try_get("demo_code")?,
        report_content: row.try_get("report_content")?,
        share_token: row.try_get("share_token")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn not_found() -> StoreError {
    StoreError::NotFound(PROJECT_NOT_FOUND.to_string())
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StoreError::ValidationError(
            "Project name must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Clamp a requested page size into `1..=MAX_LIMIT`
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

pub async fn create_project(pool: &Pool, user_id: i64, project: &NewProject) -> Result<Project> {
    validate_name(&project.name)?;
    let conn = pool.get().await?;

    let row = conn
        .query_one(
            "INSERT INTO projects (name, description, user_id)
             VALUES ($1, $2, $3)
             RETURNING *",
            &[&project.name, &project.description, &user_id],
        )
        .await?;

    parse_project_row(&row)
}

/// The caller's projects, most recently updated first
pub async fn list_projects(
    pool: &Pool,
    user_id: i64,
    offset: i64,
    limit: i64,
) -> Result<Vec<Project>> {
    let conn = pool.get().await?;
    let offset = offset.max(0);

    let rows = conn
        .query(
            "SELECT * FROM projects
             WHERE user_id = $1
             ORDER BY updated_at DESC, id DESC
             OFFSET $2 LIMIT $3",
            &[&user_id, &offset, &limit],
        )
        .await?;

    rows.iter().map(parse_project_row).collect()
}

pub async fn get_project(pool: &Pool, user_id: i64, project_id: i64) -> Result<Project> {
    let conn = pool.get().await?;

    let row = conn
        .query_opt(
            "SELECT * FROM projects WHERE id = $1 AND user_id = $2",
            &[&project_id, &user_id],
        )
        .await?
        .ok_or_else(not_found)?;

    parse_project_row(&row)
}

pub async fn update_project(
    pool: &Pool,
    user_id: i64,
    project_id: i64,
    changes: &ProjectChanges,
) -> Result<Project> {
    if let Some(name) = &changes.name {
        validate_name(name)?;
    }
    let conn = pool.get().await?;

    let row = conn
        .query_opt(
            "UPDATE projects SET
                 name = COALESCE($3, name),
                 raw_requirement = COALESCE($4, raw_requirement),
                 requirements_doc = COALESCE($5, requirements_doc),
                 product_doc = COALESCE($6, product_doc),
                 tech_doc = COALESCE($7, tech_doc),
                 demo_code = COALESCE($8, demo_code),
                 report_content = COALESCE($9, report_content),
                 updated_at = now()
             WHERE id = $1 AND user_id = $2
             RETURNING *",
            &[
                &project_id,
                &user_id,
                &changes.name,
                &changes.raw_requirement,
                &changes.requirements_doc,
                &changes.product_doc,
                &changes.tech_doc,
                &changes.demo_code,
                &changes.report_content,
            ],
        )
        .await?
        .ok_or_else(not_found)?;

    parse_project_row(&row)
}

/// Delete a project. Its demo data goes with it; uploaded files are
/// detached but kept.
pub async fn delete_project(pool: &Pool, user_id: i64, project_id: i64) -> Result<()> {
    let conn = pool.get().await?;

    let deleted = conn
        .execute(
            "DELETE FROM projects WHERE id = $1 AND user_id = $2",
            &[&project_id, &user_id],
        )
        .await?;

    if deleted == 0 {
        return Err(not_found());
    }
    Ok(())
}

/// Assign a share token unless the project already has one.
///
/// Returns the project's (possibly pre-existing) token.
pub async fn publish_project(pool: &Pool, user_id: i64, project_id: i64) -> Result<String> {
    let conn = pool.get().await?;
    let candidate = Uuid::new_v4().simple().to_string();

    let row = conn
        .query_opt(
            "UPDATE projects SET share_token = COALESCE(share_token, $3)
             WHERE id = $1 AND user_id = $2
             RETURNING share_token",
            &[&project_id, &user_id, &candidate],
        )
        .await?
        .ok_or_else(not_found)?;

    let token: Option<String> = row.try_get("share_token")?;
    token.ok_or_else(|| StoreError::DatabaseError("share token was not stored".to_string()))
}

/// Look up a published project; no ownership check
pub async fn find_by_share_token(pool: &Pool, share_token: &str) -> Result<Project> {
    let conn = pool.get().await?;

    let row = conn
        .query_opt(
            "SELECT * FROM projects WHERE share_token = $1",
            &[&share_token],
        )
        .await?
        .ok_or_else(|| StoreError::NotFound(SHARE_LINK_INVALID.to_string()))?;

    parse_project_row(&row)
}

/// Id of the oldest project, used when a prototype sends a placeholder id
pub async fn first_project_id(pool: &Pool) -> Result<Option<i64>> {
    let conn = pool.get().await?;

    let row = conn
        .query_opt("SELECT id FROM projects ORDER BY id LIMIT 1", &[])
        .await?;

    row.map(|r| r.try_get::<_, i64>("id"))
        .transpose()
        .map_err(StoreError::from)
}
