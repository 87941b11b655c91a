use super::{json_error, ServerState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
    #[serde(default)]
    pub email: Option<String>,
}

/// Mirror of the classic `local@domain.tld` shape check: no whitespace or
/// extra `@`, and at least one dot in the domain.
fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if local.is_empty() || local.chars().any(char::is_whitespace) {
        return false;
    }
    if domain.chars().any(char::is_whitespace) {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

pub(super) async fn create_user(
    State(state): State<ServerState>,
    Json(body): Json<CreateUserBody>,
) -> Response {
    let Some(email) = body.email else {
        return json_error(StatusCode::BAD_REQUEST, "Email is required");
    };

    if !is_valid_email(&email) {
        return json_error(StatusCode::BAD_REQUEST, "Invalid email format");
    }

    let normalized = email.to_lowercase().trim().to_string();

    match state.users.find_or_create(&normalized).await {
        Ok(user) => Json(json!({
            "success": true,
            "user": { "id": user.id, "email": user.email },
        }))
        .into_response(),
        Err(e) => {
            error!("Error creating/finding user: {}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to process user")
        }
    }
}
