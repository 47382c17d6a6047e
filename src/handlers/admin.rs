// License administration handlers

use chrono::Utc;
use tracing::info;
use warp::Rejection;

use crate::error::ApiError;
use crate::models::{LicenseCheck, LicenseCreate};
use crate::state::AppState;
use crate::store::User;

pub async fn generate_license_handler(
    admin: User,
    request: LicenseCreate,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let record = state
        .store
        .generate_license(request.username.trim(), request.max_calls, request.valid_days)
        .await
        .map_err(ApiError::from)?;

    info!(
        admin = %admin.username,
        user = %record.username,
        max_calls = record.license.max_calls,
        expires_at = %record.license.expires_at,
        "issued license"
    );
    Ok(warp::reply::json(&record))
}

pub async fn list_licenses_handler(
    _admin: User,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let records = state.store.list_licenses().await.map_err(ApiError::from)?;
    Ok(warp::reply::json(&records))
}

pub async fn check_license_handler(
    user: User,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let license = state
        .store
        .find_active_license(user.id)
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&LicenseCheck::from_license(
        license.as_ref(),
        Utc::now(),
    )))
}
