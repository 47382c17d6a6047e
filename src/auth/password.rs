//! bcrypt password hashing.
//!
//! Hashing is CPU bound, so both operations run on the blocking pool.

use super::error::AuthError;

pub async fn hash_password(plain: &str, cost: u32) -> Result<String, AuthError> {
    let plain = plain.to_string();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost)).await??;
    Ok(hashed)
}

/// A malformed stored hash counts as a mismatch
pub async fn verify_password(plain: &str, hashed: &str) -> Result<bool, AuthError> {
    let plain = plain.to_string();
    let hashed = hashed.to_string();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hashed).unwrap_or(false))
        .await?;
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hashed = hash_password("admin123", 4).await.unwrap();
        assert!(hashed.starts_with("$2"));
        assert!(verify_password("admin123", &hashed).await.unwrap());
        assert!(!verify_password("admin124", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_does_not_match() {
        assert!(!verify_password("secret", "plaintext").await.unwrap());
    }
}
