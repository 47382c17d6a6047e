// File upload, listing and download handlers

use futures::StreamExt;
use std::path::Path;
use tokio_util::io::ReaderStream;
use tracing::{info, warn};
use warp::http::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use warp::multipart::FormData;
use warp::{Rejection, Reply};

use crate::error::ApiError;
use crate::models::{UploadQuery, UploadResponse};
use crate::state::AppState;
use crate::store::{NewFileUpload, User};
use crate::uploads::{open_stored, sanitize_filename, UploadError};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub async fn upload_handler(
    user: User,
    query: UploadQuery,
    form: FormData,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let mut form = Box::pin(form);

    while let Some(part) = form.next().await {
        let part = part.map_err(|e| ApiError::from(UploadError::Multipart(e.to_string())))?;
        if part.name() != "file" {
            continue;
        }

        let filename = part
            .filename()
            .and_then(sanitize_filename)
            .ok_or_else(|| ApiError::from(UploadError::InvalidFilename))?;
        let file_type = part
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let path = state
            .uploads
            .save(&filename, Box::pin(part.stream()))
            .await
            .map_err(ApiError::from)?;
        let file_path = path.to_string_lossy().into_owned();

        let record = state
            .store
            .insert_file(&NewFileUpload {
                filename,
                file_path,
                file_type,
                user_id: user.id,
                project_id: query.project_id,
            })
            .await;

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                if let Err(io) = tokio::fs::remove_file(&path).await {
                    warn!(path = %path.display(), error = %io, "failed to remove orphaned upload");
                }
                return Err(ApiError::from(e).into());
            }
        };

        info!(
            user = %user.username,
            file_id = record.id,
            project_id = ?record.project_id,
            "stored upload"
        );
        return Ok(warp::reply::json(&UploadResponse {
            id: record.id,
            url: format!("/api/v1/files/download/{}", record.id),
            filename: record.filename,
        }));
    }

    Err(ApiError::from(UploadError::MissingFile).into())
}

pub async fn list_files_handler(
    project_id: i64,
    user: User,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let files = state
        .store
        .list_project_files(user.id, project_id)
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&files))
}

pub async fn download_handler(
    file_id: i64,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let file = state.store.get_file(file_id).await.map_err(ApiError::from)?;

    let (stored, len) = open_stored(Path::new(&file.file_path))
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound("Stored file is missing".to_string()))?;

    let content_type = HeaderValue::from_str(&file.file_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    let mut response = warp::reply::stream(ReaderStream::new(stored)).into_response();
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, content_type);
    headers.insert(CONTENT_LENGTH, HeaderValue::from(len));

    Ok(response)
}
