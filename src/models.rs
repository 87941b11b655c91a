//! Runtime configuration
//!
//! Environment-backed configuration for the server and its external
//! collaborators. A missing credential does not abort startup: the
//! corresponding collaborator is wired up as unconfigured and hard-fails at
//! first use instead.

const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Debug, Clone)]
pub struct Config {
    /// Generative image provider. `None` disables generation at first use.
    pub gemini_api_key: Option<String>,
    pub gemini_image_model: String,
    /// Override of the provider base URL, mainly for local harnesses.
    pub gemini_base_url: Option<String>,

    /// Postgres connection string. `None` disables persistence at first use.
    pub database_url: Option<String>,
    pub run_migrations: bool,

    /// S3-compatible media host. Both keys must be present for uploads to
    /// be enabled.
    pub media_access_key_id: Option<String>,
    pub media_secret_access_key: Option<String>,
    pub media_endpoint: String,
    pub media_bucket: String,
    pub media_base_url: String,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
            gemini_image_model: std::env::var("GEMINI_IMAGE_MODEL")
                .unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string()),
            gemini_base_url: std::env::var("GEMINI_BASE_URL").ok(),
            database_url: std::env::var("DATABASE_URL").ok(),
            run_migrations: std::env::var("RUN_MIGRATIONS")
                .map(|v| v != "0" && v.to_lowercase() != "false")
                .unwrap_or(true),
            media_access_key_id: std::env::var("MEDIA_ACCESS_KEY_ID").ok(),
            media_secret_access_key: std::env::var("MEDIA_SECRET_ACCESS_KEY").ok(),
            media_endpoint: std::env::var("MEDIA_ENDPOINT")
                .unwrap_or_else(|_| "https://nyc3.digitaloceanspaces.com".to_string()),
            media_bucket: std::env::var("MEDIA_BUCKET")
                .unwrap_or_else(|_| "photostudio".to_string()),
            media_base_url: std::env::var("MEDIA_BASE_URL")
                .unwrap_or_else(|_| "https://cdn.photostudio.example".to_string()),
        })
    }

    /// Media host credentials, when both halves are configured.
    pub fn media_credentials(&self) -> Option<(String, String)> {
        match (&self.media_access_key_id, &self.media_secret_access_key) {
            (Some(id), Some(secret)) => Some((id.clone(), secret.clone())),
            _ => None,
        }
    }
}
