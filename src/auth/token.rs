//! HS256 access tokens

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::AuthError;

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Username
    pub sub: String,
    /// Expiry as seconds since the Unix epoch
    pub exp: u64,
}

/// Signs and verifies access tokens with a shared secret
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, username: &str) -> Result<String, AuthError> {
        let exp = Utc::now().timestamp().max(0) as u64 + self.ttl.as_secs();
        self.encode(&Claims {
            sub: username.to_string(),
            exp,
        })
    }

    pub(crate) fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the claims
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> TokenKeys {
        TokenKeys::new("test-secret", Duration::from_secs(60 * 60))
    }

    #[test]
    fn test_issued_token_decodes_to_username() {
        let keys = keys();
        let token = keys.issue("alice").unwrap();
        let claims = keys.decode(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert!(claims.exp > Utc::now().timestamp() as u64);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let keys = keys();
        let token = keys
            .encode(&Claims {
                sub: "alice".to_string(),
                exp: (Utc::now().timestamp() - 10) as u64,
            })
            .unwrap();
        assert!(matches!(keys.decode(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let other = TokenKeys::new("another-secret", Duration::from_secs(60));
        let token = other.issue("mallory").unwrap();
        assert!(keys().decode(&token).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(keys().decode("not-a-jwt").is_err());
    }
}
