use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
