use super::{json_error, ServerState};
use crate::ai::OutputView;
use crate::app::StudioRequest;
use crate::Error;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

const MAX_OUTPUT_TYPES: usize = 3;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateStudioBody {
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub output_types: Option<Vec<String>>,
    #[serde(default)]
    pub user_id: Option<i32>,
    #[serde(default)]
    pub product_description: Option<String>,
}

pub(super) async fn generate_studio(
    State(state): State<ServerState>,
    Json(body): Json<GenerateStudioBody>,
) -> Response {
    let image_urls = match body.image_urls {
        Some(urls) if !urls.is_empty() => urls,
        _ => {
            return json_error(
                StatusCode::BAD_REQUEST,
                "imageUrls is required and must be a non-empty array",
            );
        }
    };

    let raw_types = match body.output_types {
        Some(types) if !types.is_empty() => types,
        _ => {
            return json_error(
                StatusCode::BAD_REQUEST,
                "outputTypes is required and must be a non-empty array",
            );
        }
    };

    if raw_types.len() > MAX_OUTPUT_TYPES {
        return json_error(StatusCode::BAD_REQUEST, "Maximum 3 output types allowed");
    }

    let mut output_types = Vec::with_capacity(raw_types.len());
    for raw in &raw_types {
        match OutputView::parse(raw) {
            Some(view) => output_types.push(view),
            None => {
                return json_error(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid output type: {}", raw),
                );
            }
        }
    }

    info!(
        "Starting image generation: {} url(s), views {:?}",
        image_urls.len(),
        raw_types
    );

    let request = StudioRequest {
        image_urls,
        output_types,
        user_id: body.user_id,
        product_description: body.product_description,
    };

    match state.app.generate_studio(request).await {
        Ok(images) => Json(json!({ "success": true, "images": images })).into_response(),
        Err(e @ Error::FetchFailed(_)) => {
            error!("Error loading reference image: {}", e);
            json_error(
                StatusCode::BAD_REQUEST,
                format!("Failed to load reference image: {}", e),
            )
        }
        Err(e) => {
            error!("Error generating images: {}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
