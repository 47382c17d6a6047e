// Handlers module

pub mod admin;
pub mod auth;
pub mod demo_storage;
pub mod files;
pub mod generation;
pub mod projects;

pub use admin::{check_license_handler, generate_license_handler, list_licenses_handler};
pub use auth::{login_handler, register_handler};
pub use demo_storage::{clear_demo_data_handler, get_demo_data_handler, save_demo_data_handler};
pub use files::{download_handler, list_files_handler, upload_handler};
pub use generation::stream_stage_handler;
pub use projects::{
    create_project_handler, delete_project_handler, get_project_handler, list_projects_handler,
    public_preview_handler, publish_project_handler, update_project_handler,
};

use std::convert::Infallible;

// GET /api/health
pub async fn health_handler() -> Result<impl warp::Reply, Infallible> {
    Ok(warp::reply::json(&serde_json::json!({ "status": "ok" })))
}
