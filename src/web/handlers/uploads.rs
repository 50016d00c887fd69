use crate::services::uploads::{self, UploadError};
use crate::web::extractors::CurrentUser;
use crate::web::state::AppState;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

/// Rich-text editor image endpoint. Expects a multipart field named `file`
/// and answers with the JSON shape the editor consumes:
/// `{"location": "<url>"}` on success, `{"error": "..."}` otherwise.
pub async fn store(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Response {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let original_name = field.file_name().unwrap_or("upload").to_string();
        match field.bytes().await {
            Ok(bytes) => file = Some((original_name, bytes.to_vec())),
            Err(e) => {
                tracing::error!("failed reading upload body: {}", e);
                return error_response(StatusCode::BAD_REQUEST, "Could not read uploaded file");
            }
        }
        break;
    }

    let Some((original_name, data)) = file else {
        return error_response(StatusCode::BAD_REQUEST, "No file was uploaded");
    };

    tracing::debug!(
        user_id = user.id,
        original_name = %original_name,
        size = data.len(),
        "image upload received"
    );

    let stored = uploads::store_upload(
        &state.upload_dir,
        &original_name,
        &data,
        state.config.media.max_upload_bytes,
        Utc::now(),
    );

    match stored {
        Ok(upload) => {
            let location = format!(
                "{}{}",
                state.config.site.url.trim_end_matches('/'),
                upload.url
            );
            Json(json!({ "location": location })).into_response()
        }
        Err(UploadError::Rejected(msg)) => error_response(StatusCode::BAD_REQUEST, &msg),
        Err(UploadError::Storage(e)) => {
            tracing::error!("upload storage failure: {:?}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Could not store file")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
