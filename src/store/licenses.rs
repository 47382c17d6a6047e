//! License rows and the call quota counter

use chrono::{DateTime, Duration, Utc};
use deadpool_postgres::Pool;
use serde::Serialize;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::store::error::{Result, StoreError};

/// A grant of a bounded number of generation calls until a fixed expiry
#[derive(Debug, Clone, Serialize)]
pub struct License {
    pub id: i64,
    pub license_key: String,
    pub user_id: i64,
    pub max_calls: i32,
    pub used_calls: i32,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Outcome of checking a license at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseStatus {
    Valid,
    Expired,
    Exhausted,
}

impl License {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    pub fn is_exhausted(&self) -> bool {
        self.used_calls >= self.max_calls
    }

    /// Expiry is reported before exhaustion
    pub fn status_at(&self, now: DateTime<Utc>) -> LicenseStatus {
        if self.is_expired(now) {
            LicenseStatus::Expired
        } else if self.is_exhausted() {
            LicenseStatus::Exhausted
        } else {
            LicenseStatus::Valid
        }
    }
}

/// A license together with its owner's username
#[derive(Debug, Clone, Serialize)]
pub struct LicenseRecord {
    #[serde(flatten)]
    pub license: License,
    pub username: String,
}

pub(crate) fn parse_license_row(row: &Row) -> Result<License> {
    Ok(License {
        id: row.try_get("id")?,
        license_key: row.try_get("license_key")?,
        user_id: row.try_get("user_id")?,
        max_calls: row.try_get("max_calls")?,
        used_calls: row.try_get("used_calls")?,
        expires_at: row.try_get("expires_at")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn parse_license_record_row(row: &Row) -> Result<LicenseRecord> {
    Ok(LicenseRecord {
        license: parse_license_row(row)?,
        username: row.try_get("username")?,
    })
}

/// First 16 characters of an upper-cased, dash-less UUIDv4
pub fn new_license_key() -> String {
    Uuid::new_v4().simple().to_string().to_uppercase()[..16].to_string()
}

/// The user's current active license, if any
pub async fn find_active_license(pool: &Pool, user_id: i64) -> Result<Option<License>> {
    let conn = pool.get().await?;

    let row = conn
        .query_opt(
            "SELECT * FROM licenses
             WHERE user_id = $1 AND is_active
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
            &[&user_id],
        )
        .await?;

    row.as_ref().map(parse_license_row).transpose()
}

/// Count one call against a license.
///
/// The check and the increment happen in a single statement, so concurrent
/// callers can never push `used_calls` past `max_calls`. Returns `false`
/// when the license was exhausted or expired at the time of the update.
pub async fn consume_call(pool: &Pool, license_id: i64) -> Result<bool> {
    let conn = pool.get().await?;

    let updated = conn
        .execute(
            "UPDATE licenses
             SET used_calls = used_calls + 1
             WHERE id = $1 AND is_active AND used_calls < max_calls AND expires_at > now()",
            &[&license_id],
        )
        .await?;

    Ok(updated == 1)
}

/// Issue a new license for `username`, deactivating any previous ones
pub async fn generate_license(
    pool: &Pool,
    username: &str,
    max_calls: i32,
    valid_days: i64,
) -> Result<LicenseRecord> {
    if max_calls < 0 {
        return Err(StoreError::ValidationError(
            "max_calls must not be negative".to_string(),
        ));
    }
    let validity = Duration::try_days(valid_days)
        .ok_or_else(|| StoreError::ValidationError("valid_days is out of range".to_string()))?;
    let expires_at = Utc::now() + validity;

    let mut conn = pool.get().await?;
    let txn = conn.transaction().await?;

    let user_row = txn
        .query_opt("SELECT id FROM users WHERE username = $1", &[&username])
        .await?
        .ok_or_else(|| StoreError::NotFound("User not found".to_string()))?;
    let user_id: i64 = user_row.try_get("id")?;

    txn.execute(
        "UPDATE licenses SET is_active = FALSE WHERE user_id = $1 AND is_active",
        &[&user_id],
    )
    .await?;

    let row = txn
        .query_one(
            "INSERT INTO licenses (license_key, user_id, max_calls, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
            &[&new_license_key(), &user_id, &max_calls, &expires_at],
        )
        .await?;
    let license = parse_license_row(&row)?;

    txn.commit().await?;

    Ok(LicenseRecord {
        license,
        username: username.to_string(),
    })
}

/// Every license with its owner's username, newest first
pub async fn list_licenses(pool: &Pool) -> Result<Vec<LicenseRecord>> {
    let conn = pool.get().await?;

    let rows = conn
        .query(
            "SELECT l.*, u.username
             FROM licenses l
             JOIN users u ON u.id = l.user_id
             ORDER BY l.created_at DESC, l.id DESC",
            &[],
        )
        .await?;

    rows.iter().map(parse_license_record_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn license(max_calls: i32, used_calls: i32, expires_in: Duration) -> License {
        let now = Utc::now();
        License {
            id: 1,
            license_key: new_license_key(),
            user_id: 7,
            max_calls,
            used_calls,
            expires_at: now + expires_in,
            is_active: true,
            created_at: now,
        }
    }

    #[test]
    fn test_license_key_format() {
        let key = new_license_key();
        assert_eq!(key.len(), 16);
        assert!(key
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        assert_ne!(key, new_license_key());
    }

    #[test]
    fn test_status_valid() {
        let lic = license(10, 9, Duration::days(1));
        assert_eq!(lic.status_at(Utc::now()), LicenseStatus::Valid);
    }

    #[test]
    fn test_status_exhausted() {
        let lic = license(10, 10, Duration::days(1));
        assert_eq!(lic.status_at(Utc::now()), LicenseStatus::Exhausted);
        assert!(license(0, 0, Duration::days(1)).is_exhausted());
    }

    #[test]
    fn test_expiry_reported_before_exhaustion() {
        let lic = license(10, 10, Duration::days(-1));
        assert_eq!(lic.status_at(Utc::now()), LicenseStatus::Expired);
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = LicenseRecord {
            license: license(5, 1, Duration::days(3)),
            username: "alice".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["username"], "alice");
        assert_eq!(json["max_calls"], 5);
        assert_eq!(json["used_calls"], 1);
        assert!(json.get("license").is_none());
    }
}
