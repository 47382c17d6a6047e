use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use serde::Serialize;
use tokio_postgres::Row;

use crate::store::error::{Result, StoreError};

/// A registered account
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

pub(crate) fn parse_user_row(row: &Row) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        hashed_password: row.try_get("hashed_password")?,
        is_active: row.try_get("is_active")?,
        is_admin: row.try_get("is_admin")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Insert a new account.
///
/// Returns [`StoreError::Conflict`] when the username is taken.
pub async fn create_user(
    pool: &Pool,
    username: &str,
    hashed_password: &str,
    is_admin: bool,
) -> Result<User> {
    let conn = pool.get().await?;

    let row = conn
        .query_one(
            "INSERT INTO users (username, hashed_password, is_admin)
             VALUES ($1, $2, $3)
             RETURNING *",
            &[&username, &hashed_password, &is_admin],
        )
        .await
        .map_err(|e| match StoreError::from(e) {
            StoreError::Conflict(_) => {
                StoreError::Conflict("Username already registered".to_string())
            }
            other => other,
        })?;

    parse_user_row(&row)
}

pub async fn find_user_by_username(pool: &Pool, username: &str) -> Result<Option<User>> {
    let conn = pool.get().await?;

    let row = conn
        .query_opt("SELECT * FROM users WHERE username = $1", &[&username])
        .await?;

    row.as_ref().map(parse_user_row).transpose()
}

/// Insert an administrator unless the username already exists.
///
/// Returns `true` when a new account was created.
pub async fn insert_admin_if_missing(
    pool: &Pool,
    username: &str,
    hashed_password: &str,
) -> Result<bool> {
    let conn = pool.get().await?;

    let inserted = conn
        .execute(
            "INSERT INTO users (username, hashed_password, is_admin)
             VALUES ($1, $2, TRUE)
             ON CONFLICT (username) DO NOTHING",
            &[&username, &hashed_password],
        )
        .await?;

    Ok(inserted == 1)
}
