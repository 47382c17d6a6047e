// Project CRUD, publishing and public preview handlers

use tracing::info;
use warp::Rejection;

use crate::error::ApiError;
use crate::models::{ListQuery, PublicPreview, PublishResponse, StatusResponse};
use crate::state::AppState;
use crate::store::projects::clamp_limit;
use crate::store::{NewProject, ProjectChanges, User};

pub async fn create_project_handler(
    user: User,
    project: NewProject,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let project = state
        .store
        .create_project(user.id, &project)
        .await
        .map_err(ApiError::from)?;

    info!(user = %user.username, project_id = project.id, "created project");
    Ok(warp::reply::json(&project))
}

pub async fn list_projects_handler(
    user: User,
    query: ListQuery,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let projects = state
        .store
        .list_projects(user.id, query.offset.unwrap_or(0), clamp_limit(query.limit))
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&projects))
}

pub async fn get_project_handler(
    project_id: i64,
    user: User,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let project = state
        .store
        .get_project(user.id, project_id)
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&project))
}

pub async fn update_project_handler(
    project_id: i64,
    user: User,
    changes: ProjectChanges,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let project = state
        .store
        .update_project(user.id, project_id, &changes)
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&project))
}

pub async fn delete_project_handler(
    project_id: i64,
    user: User,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    state
        .store
        .delete_project(user.id, project_id)
        .await
        .map_err(ApiError::from)?;

    info!(user = %user.username, project_id, "deleted project");
    Ok(warp::reply::json(
        &StatusResponse::new("success").with_message("Project deleted"),
    ))
}

pub async fn publish_project_handler(
    project_id: i64,
    user: User,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let share_token = state
        .store
        .publish_project(user.id, project_id)
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&PublishResponse::new(share_token)))
}

pub async fn public_preview_handler(
    share_token: String,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let project = state
        .store
        .find_by_share_token(&share_token)
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&PublicPreview {
        name: project.name,
        demo_code: project.demo_code,
        project_id: project.id,
    }))
}
