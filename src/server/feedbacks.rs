use super::{json_error, ServerState};
use crate::db::NewFeedback;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackBody {
    #[serde(default)]
    pub user_id: Option<i32>,
    #[serde(default)]
    pub generation_id: Option<String>,
    #[serde(default)]
    pub output_type: Option<String>,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub what_worked: Option<String>,
    #[serde(default)]
    pub what_to_improve: Option<String>,
    #[serde(default)]
    pub met_needs: Option<String>,
    #[serde(default)]
    pub additional_comments: Option<String>,
}

pub(super) async fn create_feedback(
    State(state): State<ServerState>,
    Json(body): Json<CreateFeedbackBody>,
) -> Response {
    let (Some(user_id), Some(generation_id), Some(output_type)) =
        (body.user_id, body.generation_id, body.output_type)
    else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "userId, generationId, and outputType are required",
        );
    };

    if let Some(rating) = body.rating {
        if !(1..=5).contains(&rating) {
            return json_error(StatusCode::BAD_REQUEST, "rating must be between 1 and 5");
        }
    }

    let feedback = NewFeedback {
        user_id,
        generation_id,
        output_type,
        rating: body.rating,
        what_worked: body.what_worked,
        what_to_improve: body.what_to_improve,
        met_needs: body.met_needs,
        additional_comments: body.additional_comments,
    };

    match state.feedbacks.insert(feedback).await {
        Ok(saved) => Json(json!({ "success": true, "feedback": saved })).into_response(),
        Err(e) => {
            error!("Error creating feedback: {}", e);
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create feedback",
            )
        }
    }
}
