// Route definitions

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};
use warp::filters::BoxedFilter;
use warp::{Filter, Reply};

use crate::auth::{with_admin, with_user};
use crate::error::handle_rejection;
use crate::handlers;
use crate::models::{
    DemoRequest, IterateRequest, PartialEditRequest, ProductDocRequest, ReportRequest,
    RequirementRequest, TechDocRequest,
};
use crate::prompts::Stage;
use crate::state::{with_state, AppState};

/// Largest accepted JSON request body
pub const JSON_BODY_LIMIT: u64 = 8 * 1024 * 1024;

const FORM_BODY_LIMIT: u64 = 16 * 1024;

// Room for multipart boundaries and part headers
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

fn json_body<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: DeserializeOwned + Send,
{
    warp::body::content_length_limit(JSON_BODY_LIMIT).and(warp::body::json())
}

fn auth_routes(state: AppState) -> BoxedFilter<(impl Reply,)> {
    // POST /auth/register
    let register = warp::path!("auth" / "register")
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::register_handler);

    // POST /auth/login (OAuth2 password form)
    let login = warp::path!("auth" / "login")
        .and(warp::post())
        .and(warp::body::content_length_limit(FORM_BODY_LIMIT))
        .and(warp::body::form())
        .and(with_state(state))
        .and_then(handlers::login_handler);

    register.or(login).boxed()
}

fn admin_routes(state: AppState) -> BoxedFilter<(impl Reply,)> {
    // POST /admin/generate
    let generate = warp::path!("admin" / "generate")
        .and(warp::post())
        .and(with_admin(state.clone()))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::generate_license_handler);

    // GET /admin/list
    let list = warp::path!("admin" / "list")
        .and(warp::get())
        .and(with_admin(state.clone()))
        .and(with_state(state.clone()))
        .and_then(handlers::list_licenses_handler);

    // GET /admin/check-me
    let check_me = warp::path!("admin" / "check-me")
        .and(warp::get())
        .and(with_user(state.clone()))
        .and(with_state(state))
        .and_then(handlers::check_license_handler);

    generate.or(list).or(check_me).boxed()
}

fn project_routes(state: AppState) -> BoxedFilter<(impl Reply,)> {
    // POST /generation/projects
    let create = warp::path!("generation" / "projects")
        .and(warp::post())
        .and(with_user(state.clone()))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::create_project_handler);

    // GET /generation/projects?offset=&limit=
    let list = warp::path!("generation" / "projects")
        .and(warp::get())
        .and(with_user(state.clone()))
        .and(warp::query())
        .and(with_state(state.clone()))
        .and_then(handlers::list_projects_handler);

    // GET /generation/projects/{id}
    let get = warp::path!("generation" / "projects" / i64)
        .and(warp::get())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and_then(handlers::get_project_handler);

    // PATCH /generation/projects/{id}
    let update = warp::path!("generation" / "projects" / i64)
        .and(warp::patch())
        .and(with_user(state.clone()))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::update_project_handler);

    // DELETE /generation/projects/{id}
    let delete = warp::path!("generation" / "projects" / i64)
        .and(warp::delete())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and_then(handlers::delete_project_handler);

    // POST /generation/projects/{id}/publish
    let publish = warp::path!("generation" / "projects" / i64 / "publish")
        .and(warp::post())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and_then(handlers::publish_project_handler);

    // GET /generation/public/preview/{token}
    let preview = warp::path!("generation" / "public" / "preview" / String)
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::public_preview_handler);

    create
        .or(list)
        .or(get)
        .or(update)
        .or(delete)
        .or(publish)
        .or(preview)
        .boxed()
}

// POST /generation/stream/{name}
fn stage_route<S>(name: &'static str, state: AppState) -> BoxedFilter<(impl Reply,)>
where
    S: Stage + DeserializeOwned + Send + Sync + 'static,
{
    warp::path("generation")
        .and(warp::path("stream"))
        .and(warp::path(name))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_user(state.clone()))
        .and(json_body::<S>())
        .and(with_state(state))
        .and_then(handlers::stream_stage_handler::<S>)
        .boxed()
}

fn generation_routes(state: AppState) -> BoxedFilter<(impl Reply,)> {
    stage_route::<RequirementRequest>("requirements", state.clone())
        .or(stage_route::<ProductDocRequest>("product", state.clone()))
        .or(stage_route::<TechDocRequest>("technical", state.clone()))
        .or(stage_route::<DemoRequest>("demo", state.clone()))
        .or(stage_route::<ReportRequest>("report", state.clone()))
        .or(stage_route::<IterateRequest>("iterate", state.clone()))
        .or(stage_route::<PartialEditRequest>("partial_edit", state))
        .boxed()
}

fn file_routes(state: AppState) -> BoxedFilter<(impl Reply,)> {
    let form_limit = state.uploads.max_bytes().saturating_add(MULTIPART_OVERHEAD);

    // POST /files/upload?project_id=
    let upload = warp::path!("files" / "upload")
        .and(warp::post())
        .and(with_user(state.clone()))
        .and(warp::query())
        .and(warp::multipart::form().max_length(form_limit))
        .and(with_state(state.clone()))
        .and_then(handlers::upload_handler);

    // GET /files/list/{project_id}
    let list = warp::path!("files" / "list" / i64)
        .and(warp::get())
        .and(with_user(state.clone()))
        .and(with_state(state.clone()))
        .and_then(handlers::list_files_handler);

    // GET /files/download/{file_id}
    let download = warp::path!("files" / "download" / i64)
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::download_handler);

    upload.or(list).or(download).boxed()
}

fn demo_routes(state: AppState) -> BoxedFilter<(impl Reply,)> {
    // GET /demo/{project_id}/data/{key}
    let get = warp::path!("demo" / String / "data" / String)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::get_demo_data_handler);

    // POST /demo/{project_id}/data/{key}
    let save = warp::path!("demo" / String / "data" / String)
        .and(warp::post())
        .and(json_body::<Value>())
        .and(with_state(state.clone()))
        .and_then(handlers::save_demo_data_handler);

    // DELETE /demo/{project_id}/data/{key}
    let clear = warp::path!("demo" / String / "data" / String)
        .and(warp::delete())
        .and(with_state(state))
        .and_then(handlers::clear_demo_data_handler);

    get.or(save).or(clear).boxed()
}

/// Every API route, without error rendering
pub fn configure_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // GET /api/health
    let health = warp::path!("api" / "health")
        .and(warp::get())
        .and_then(handlers::health_handler);

    let api = warp::path("api").and(warp::path("v1"));

    let v1 = auth_routes(state.clone())
        .or(admin_routes(state.clone()))
        .or(project_routes(state.clone()))
        .or(generation_routes(state.clone()))
        .or(file_routes(state.clone()))
        .or(demo_routes(state));

    health.or(api.and(v1))
}

fn cors(origins: &[String]) -> warp::cors::Builder {
    let valid: Vec<&str> = origins
        .iter()
        .map(String::as_str)
        .filter(|origin| {
            let ok = origin.starts_with("http://") || origin.starts_with("https://");
            if !ok {
                warn!(%origin, "ignoring malformed CORS origin");
            }
            ok
        })
        .collect();

    warp::cors()
        .allow_origins(valid)
        .allow_credentials(true)
        .allow_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
        .allow_headers(vec!["authorization", "content-type"])
}

/// The complete service: routes, JSON error bodies, CORS and request logging
pub fn app(
    state: AppState,
    cors_origins: &[String],
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let log = warp::log::custom(|request| {
        info!(
            method = %request.method(),
            path = request.path(),
            status = request.status().as_u16(),
            elapsed_ms = request.elapsed().as_millis() as u64,
            "request"
        );
    });

    configure_routes(state)
        .recover(handle_rejection)
        .with(cors(cors_origins))
        .with(log)
}
