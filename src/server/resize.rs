use super::{json_error, ServerState};
use crate::formats;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeImageBody {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

pub(super) async fn resize_image(
    State(state): State<ServerState>,
    Json(body): Json<ResizeImageBody>,
) -> Response {
    let Some(image_url) = body.image_url else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "imageUrl is required and must be a string",
        );
    };
    let Some(format) = body.format else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "format is required and must be a string",
        );
    };

    if formats::lookup(&format).is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("Invalid format: {}", format),
                "availableFormats": formats::keys(),
            })),
        )
            .into_response();
    }

    info!("Resize image request: {} -> {}", image_url, format);

    match state.app.export_format(&image_url, &format).await {
        Ok(resized) => {
            let headers = [
                (header::CONTENT_TYPE, "image/jpeg".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}.jpg\"", format),
                ),
                (header::CONTENT_LENGTH, resized.bytes.len().to_string()),
            ];
            (headers, resized.bytes).into_response()
        }
        Err(e) => {
            error!("Error in resize-image API: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to resize image",
                    "details": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}
