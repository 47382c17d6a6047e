//! Request guards: bearer identity, admin role and license quota

use chrono::Utc;
use tracing::{debug, info};
use warp::{Filter, Rejection};

use crate::error::ApiError;
use crate::state::{with_state, AppState};
use crate::store::{LicenseStatus, User};

pub const NO_LICENSE: &str = "No active license found, contact the administrator";
pub const LICENSE_EXPIRED: &str = "License has expired";
pub const LICENSE_EXHAUSTED: &str = "License call quota exhausted";

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let (scheme, token) = header?.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Resolve the account behind an `Authorization` header
pub async fn authenticate(state: &AppState, header: Option<&str>) -> Result<User, ApiError> {
    let token = bearer_token(header).ok_or_else(ApiError::credentials)?;
    let claims = state
        .tokens
        .decode(token)
        .map_err(|e| {
            debug!(error = %e, "rejected bearer token");
            ApiError::credentials()
        })?;

    match state.store.find_user_by_username(&claims.sub).await? {
        Some(user) if user.is_active => Ok(user),
        _ => Err(ApiError::credentials()),
    }
}

pub fn require_admin(user: User) -> Result<User, ApiError> {
    if user.is_admin {
        Ok(user)
    } else {
        Err(ApiError::Forbidden(
            "Only administrators can perform this action".to_string(),
        ))
    }
}

/// Check the caller's license and count one call against it.
///
/// Administrators are exempt and never counted.
pub async fn verify_license(state: &AppState, user: &User) -> Result<(), ApiError> {
    if user.is_admin {
        return Ok(());
    }

    let license = state
        .store
        .find_active_license(user.id)
        .await?
        .ok_or_else(|| ApiError::PaymentRequired(NO_LICENSE.to_string()))?;

    match license.status_at(Utc::now()) {
        LicenseStatus::Expired => {
            return Err(ApiError::PaymentRequired(LICENSE_EXPIRED.to_string()))
        }
        LicenseStatus::Exhausted => {
            return Err(ApiError::PaymentRequired(LICENSE_EXHAUSTED.to_string()))
        }
        LicenseStatus::Valid => {}
    }

    // Another request may have used the last call since the read above
    if !state.store.consume_call(license.id).await? {
        return Err(ApiError::PaymentRequired(LICENSE_EXHAUSTED.to_string()));
    }

    info!(
        user = %user.username,
        license = %license.license_key,
        used_calls = license.used_calls + 1,
        max_calls = license.max_calls,
        "license call counted"
    );
    Ok(())
}

/// Any authenticated account
pub fn with_user(state: AppState) -> impl Filter<Extract = (User,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(with_state(state))
        .and_then(|header: Option<String>, state: AppState| async move {
            authenticate(&state, header.as_deref())
                .await
                .map_err(Rejection::from)
        })
}

/// Authenticated administrators only
pub fn with_admin(state: AppState) -> impl Filter<Extract = (User,), Error = Rejection> + Clone {
    with_user(state).and_then(|user: User| async move { require_admin(user).map_err(Rejection::from) })
}
