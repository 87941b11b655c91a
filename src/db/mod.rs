//! Relational persistence
//!
//! Plain CRUD over users, generation records, and feedback in Postgres. No
//! engine-level invariants beyond foreign-key integrity and email
//! uniqueness.

pub mod mock;
pub mod postgres;

pub use mock::{MockFeedbackStore, MockGenerationStore, MockUserStore};
pub use postgres::{PgFeedbackStore, PgGenerationStore, PgUserStore};

use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A persisted row describing one produced image, its lineage, cost, and
/// timing.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GenerationRecord {
    pub id: Uuid,
    pub original_photo_url: String,
    pub generated_url: String,
    pub output_type: String,
    pub prompt_used: String,
    pub product_description: Option<String>,
    pub model_api: String,
    pub generation_time_ms: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub metadata: Option<serde_json::Value>,
    pub user_id: Option<i32>,
    pub prompt_tokens: i32,
    pub candidates_tokens: i32,
    pub total_tokens: i32,
    pub input_cost_usd: f64,
    pub output_cost_usd: f64,
    pub total_cost_usd: f64,
}

/// Insert payload for a generation record; the store assigns id and
/// created_at.
#[derive(Debug, Clone)]
pub struct NewGenerationRecord {
    pub original_photo_url: String,
    pub generated_url: String,
    pub output_type: String,
    pub prompt_used: String,
    pub product_description: Option<String>,
    pub model_api: String,
    pub generation_time_ms: Option<i32>,
    pub metadata: Option<serde_json::Value>,
    pub user_id: Option<i32>,
    pub prompt_tokens: i32,
    pub candidates_tokens: i32,
    pub total_tokens: i32,
    pub input_cost_usd: f64,
    pub output_cost_usd: f64,
    pub total_cost_usd: f64,
}

impl GenerationRecord {
    /// Materialize a record that could not be durably written, so callers
    /// can still hand the result back to the user.
    pub fn unsaved(new: NewGenerationRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_photo_url: new.original_photo_url,
            generated_url: new.generated_url,
            output_type: new.output_type,
            prompt_used: new.prompt_used,
            product_description: new.product_description,
            model_api: new.model_api,
            generation_time_ms: new.generation_time_ms,
            created_at: Utc::now(),
            metadata: new.metadata,
            user_id: new.user_id,
            prompt_tokens: new.prompt_tokens,
            candidates_tokens: new.candidates_tokens,
            total_tokens: new.total_tokens,
            input_cost_usd: new.input_cost_usd,
            output_cost_usd: new.output_cost_usd,
            total_cost_usd: new.total_cost_usd,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Feedback {
    pub id: i32,
    pub user_id: i32,
    pub generation_id: String,
    pub output_type: String,
    pub rating: Option<i32>,
    pub what_worked: Option<String>,
    pub what_to_improve: Option<String>,
    pub met_needs: Option<String>,
    pub additional_comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub user_id: i32,
    pub generation_id: String,
    pub output_type: String,
    pub rating: Option<i32>,
    pub what_worked: Option<String>,
    pub what_to_improve: Option<String>,
    pub met_needs: Option<String>,
    pub additional_comments: Option<String>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_or_create(&self, email: &str) -> Result<User>;
}

#[async_trait]
pub trait GenerationStore: Send + Sync {
    async fn insert(&self, record: NewGenerationRecord) -> Result<GenerationRecord>;
    async fn get(&self, id: Uuid) -> Result<Option<GenerationRecord>>;
    async fn recent(&self, limit: i64, offset: i64) -> Result<Vec<GenerationRecord>>;
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn insert(&self, feedback: NewFeedback) -> Result<Feedback>;
    async fn for_generation(&self, generation_id: &str) -> Result<Vec<Feedback>>;
}

/// Placeholder wired in when `DATABASE_URL` is absent: startup succeeds,
/// the first query fails.
pub struct UnconfiguredDatabase;

fn unconfigured<T>() -> Result<T> {
    Err(Error::Persist("DATABASE_URL is not set".to_string()))
}

#[async_trait]
impl UserStore for UnconfiguredDatabase {
    async fn find_by_email(&self, _email: &str) -> Result<Option<User>> {
        unconfigured()
    }

    async fn find_or_create(&self, _email: &str) -> Result<User> {
        unconfigured()
    }
}

#[async_trait]
impl GenerationStore for UnconfiguredDatabase {
    async fn insert(&self, _record: NewGenerationRecord) -> Result<GenerationRecord> {
        unconfigured()
    }

    async fn get(&self, _id: Uuid) -> Result<Option<GenerationRecord>> {
        unconfigured()
    }

    async fn recent(&self, _limit: i64, _offset: i64) -> Result<Vec<GenerationRecord>> {
        unconfigured()
    }
}

#[async_trait]
impl FeedbackStore for UnconfiguredDatabase {
    async fn insert(&self, _feedback: NewFeedback) -> Result<Feedback> {
        unconfigured()
    }

    async fn for_generation(&self, _generation_id: &str) -> Result<Vec<Feedback>> {
        unconfigured()
    }
}
