//! HTTP surface
//!
//! Thin axum wrappers over the orchestrator and the persistence stores. All
//! error bodies are structured JSON; no stack traces reach the client.

mod feedbacks;
mod resize;
mod studio;
mod upload;
mod users;

use crate::ai::{GeminiImageClient, ImageGenerationService, UnconfiguredImageClient};
use crate::app::{App, AppServices};
use crate::db::{
    FeedbackStore, GenerationStore, PgFeedbackStore, PgGenerationStore, PgUserStore,
    UnconfiguredDatabase, UserStore,
};
use crate::media::{MediaHostClient, MediaHostService, UnconfiguredMediaHost};
use crate::models::Config;
use crate::resize::ResizeEngine;
use crate::Result;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Two 10 MB product photos plus multipart framing overhead.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone)]
pub struct ServerState {
    pub app: Arc<App>,
    pub users: Arc<dyn UserStore>,
    pub feedbacks: Arc<dyn FeedbackStore>,
    pub media: Arc<dyn MediaHostService>,
    pub started_at: Instant,
}

/// Wire up collaborators from configuration. A missing credential swaps in
/// an unconfigured placeholder that fails at first use, so the server still
/// starts and every other route keeps working.
pub async fn build_state(config: &Config) -> Result<ServerState> {
    let provider: Arc<dyn ImageGenerationService> = match &config.gemini_api_key {
        Some(api_key) => {
            info!("Image provider: Gemini (model: {})", config.gemini_image_model);
            let mut client =
                GeminiImageClient::new(api_key.clone(), config.gemini_image_model.clone());
            if let Some(base_url) = &config.gemini_base_url {
                client = client.with_base_url(base_url.clone());
            }
            Arc::new(client)
        }
        None => {
            warn!("GEMINI_API_KEY not set; image generation will fail at first use");
            Arc::new(UnconfiguredImageClient)
        }
    };

    let media: Arc<dyn MediaHostService> = match config.media_credentials() {
        Some((access_key_id, secret_access_key)) => Arc::new(
            MediaHostClient::new(
                access_key_id,
                secret_access_key,
                config.media_endpoint.clone(),
                config.media_bucket.clone(),
                config.media_base_url.clone(),
            )
            .await?,
        ),
        None => {
            warn!("Media host credentials not set; uploads will fail at first use");
            Arc::new(UnconfiguredMediaHost)
        }
    };

    let (users, generations, feedbacks): (
        Arc<dyn UserStore>,
        Arc<dyn GenerationStore>,
        Arc<dyn FeedbackStore>,
    ) = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            if config.run_migrations {
                sqlx::migrate!("./migrations").run(&pool).await?;
                info!("Database migrations applied");
            }
            (
                Arc::new(PgUserStore::new(pool.clone())),
                Arc::new(PgGenerationStore::new(pool.clone())),
                Arc::new(PgFeedbackStore::new(pool)),
            )
        }
        None => {
            warn!("DATABASE_URL not set; persistence will fail at first use");
            let db = Arc::new(UnconfiguredDatabase);
            (db.clone(), db.clone(), db)
        }
    };

    let app = App::with_services(
        AppServices {
            provider,
            media: media.clone(),
            generations,
            resize: Arc::new(ResizeEngine::new()),
        },
        config.gemini_image_model.clone(),
    );

    Ok(ServerState {
        app: Arc::new(app),
        users,
        feedbacks,
        media,
        started_at: Instant::now(),
    })
}

pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/resize-image", post(resize::resize_image))
        .route("/generate-studio", post(studio::generate_studio))
        .route("/upload-product", post(upload::upload_product))
        .route("/users", post(users::create_user))
        .route("/feedbacks", post(feedbacks::create_feedback))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: &Config, addr: SocketAddr) -> Result<()> {
    let state = build_state(config).await?;
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}

/// Structured JSON error body used by every route.
pub(crate) fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

#[derive(Serialize)]
struct HealthResponse {
    name: &'static str,
    version: &'static str,
    uptime: String,
}

async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    Json(HealthResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        uptime: format_uptime(state.started_at.elapsed()),
    })
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(format_uptime(Duration::from_secs(61)), "0d 00:01:01");
        assert_eq!(
            format_uptime(Duration::from_secs(2 * 86_400 + 3 * 3600 + 4 * 60 + 5)),
            "2d 03:04:05"
        );
    }
}
