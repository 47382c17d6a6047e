// Key-value data endpoints used by generated prototypes.
//
// Prototypes often hardcode a placeholder such as "default" instead of a
// numeric project id; reads and writes then fall back to the first project.

use serde_json::Value;
use warp::Rejection;

use crate::error::ApiError;
use crate::models::StatusResponse;
use crate::state::AppState;

async fn resolve_project_id(state: &AppState, raw: &str) -> Result<Option<i64>, ApiError> {
    match raw.trim().parse::<i64>() {
        Ok(id) => Ok(Some(id)),
        Err(_) => Ok(state.store.first_project_id().await?),
    }
}

pub async fn get_demo_data_handler(
    project_id: String,
    key: String,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let empty = Value::Array(Vec::new());

    let Some(project_id) = resolve_project_id(&state, &project_id).await? else {
        return Ok(warp::reply::json(&empty));
    };

    let data = state
        .store
        .get_demo_data(project_id, &key)
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(
        &data.map(|d| d.data_content).unwrap_or(empty),
    ))
}

pub async fn save_demo_data_handler(
    project_id: String,
    key: String,
    payload: Value,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let project_id = resolve_project_id(&state, &project_id)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest("Invalid project ID and no projects exist".to_string())
        })?;

    state
        .store
        .put_demo_data(project_id, &key, &payload)
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&StatusResponse::new("success")))
}

pub async fn clear_demo_data_handler(
    project_id: String,
    key: String,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let Ok(project_id) = project_id.trim().parse::<i64>() else {
        return Ok(warp::reply::json(
            &StatusResponse::new("skipped").with_reason("invalid project id"),
        ));
    };

    state
        .store
        .clear_demo_data(project_id, &key)
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&StatusResponse::new("cleared")))
}
