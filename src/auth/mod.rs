//! Credentials, access tokens and request guards

pub mod error;
pub mod guard;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use guard::{authenticate, require_admin, verify_license, with_admin, with_user};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenKeys};
