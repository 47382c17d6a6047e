// POST /auth/register and POST /auth/login handlers

use tracing::info;
use warp::Rejection;

use crate::auth::{hash_password, verify_password};
use crate::error::ApiError;
use crate::models::{Credentials, TokenResponse};
use crate::state::AppState;
use crate::store::{StoreError, User};

fn token_response(state: &AppState, user: User) -> Result<impl warp::Reply, Rejection> {
    let access_token = state.tokens.issue(&user.username).map_err(ApiError::from)?;
    Ok(warp::reply::json(&TokenResponse::bearer(
        access_token,
        user.username,
        user.is_admin,
    )))
}

pub async fn register_handler(
    credentials: Credentials,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let username = credentials.username.trim();
    if username.is_empty() || credentials.password.is_empty() {
        return Err(ApiError::BadRequest("Username and password are required".to_string()).into());
    }

    let hashed = hash_password(&credentials.password, state.bcrypt_cost)
        .await
        .map_err(ApiError::from)?;

    let user = match state.store.create_user(username, &hashed, false).await {
        Ok(user) => user,
        Err(StoreError::Conflict(_)) => {
            return Err(ApiError::BadRequest("Username already registered".to_string()).into())
        }
        Err(e) => return Err(ApiError::from(e).into()),
    };

    info!(user = %user.username, "registered new account");
    token_response(&state, user)
}

pub async fn login_handler(
    credentials: Credentials,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let rejected = || ApiError::Unauthorized("Incorrect username or password".to_string());

    let user = state
        .store
        .find_user_by_username(credentials.username.trim())
        .await
        .map_err(ApiError::from)?
        .ok_or_else(rejected)?;

    let matches = verify_password(&credentials.password, &user.hashed_password)
        .await
        .map_err(ApiError::from)?;
    if !matches || !user.is_active {
        return Err(rejected().into());
    }

    token_response(&state, user)
}
