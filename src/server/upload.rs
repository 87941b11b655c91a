use super::{json_error, ServerState};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

const MAX_FILES: usize = 2;
const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;
const UPLOAD_FOLDER: &str = "photostudio/uploads";

#[derive(Debug, Serialize)]
struct UploadedFile {
    id: String,
    filename: String,
    url: String,
    size: usize,
    #[serde(rename = "type")]
    content_type: String,
}

pub(super) async fn upload_product(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Response {
    let mut pending: Vec<(String, String, Vec<u8>)> = Vec::new();

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("files") {
                    continue;
                }

                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();

                match field.bytes().await {
                    Ok(bytes) => pending.push((filename, content_type, bytes.to_vec())),
                    Err(e) => {
                        return json_error(
                            StatusCode::BAD_REQUEST,
                            format!("Malformed multipart payload: {}", e),
                        );
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                return json_error(
                    StatusCode::BAD_REQUEST,
                    format!("Malformed multipart payload: {}", e),
                );
            }
        }
    }

    if pending.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "No files provided");
    }
    if pending.len() > MAX_FILES {
        return json_error(StatusCode::BAD_REQUEST, "Maximum 2 files allowed");
    }

    for (filename, content_type, bytes) in &pending {
        if !content_type.starts_with("image/") {
            return json_error(
                StatusCode::BAD_REQUEST,
                format!("Invalid file type: {}", content_type),
            );
        }
        if bytes.len() > MAX_FILE_BYTES {
            return json_error(
                StatusCode::BAD_REQUEST,
                format!("File too large: {}. Max size is 10MB", filename),
            );
        }
    }

    let mut files = Vec::with_capacity(pending.len());
    for (filename, content_type, bytes) in pending {
        match state
            .media
            .upload_image(&bytes, &content_type, UPLOAD_FOLDER)
            .await
        {
            Ok(media) => {
                info!(
                    "File uploaded to media host: {} ({} bytes) -> {}",
                    filename,
                    bytes.len(),
                    media.url
                );
                files.push(UploadedFile {
                    id: media.id,
                    filename,
                    url: media.url,
                    size: bytes.len(),
                    content_type,
                });
            }
            Err(e) => {
                error!("Error uploading files to media host: {}", e);
                return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to upload files");
            }
        }
    }

    Json(json!({ "success": true, "files": files })).into_response()
}
