use super::{
    Feedback, FeedbackStore, GenerationRecord, GenerationStore, NewFeedback, NewGenerationRecord,
    User, UserStore,
};
use crate::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

const GENERATION_COLUMNS: &str = "id, original_photo_url, generated_url, output_type, \
     prompt_used, product_description, model_api, generation_time_ms, created_at, metadata, \
     user_id, prompt_tokens, candidates_tokens, total_tokens, input_cost_usd, output_cost_usd, \
     total_cost_usd";

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_or_create(&self, email: &str) -> Result<User> {
        if let Some(existing) = self.find_by_email(email).await? {
            return Ok(existing);
        }

        // Concurrent first-time requests race on the unique index; the
        // ON CONFLICT no-op plus re-select keeps both winners consistent.
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email) VALUES ($1) \
             ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email \
             RETURNING id, email, created_at",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("User created: id={} email={}", user.id, user.email);
        Ok(user)
    }
}

#[derive(Clone)]
pub struct PgGenerationStore {
    pool: PgPool,
}

impl PgGenerationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenerationStore for PgGenerationStore {
    async fn insert(&self, record: NewGenerationRecord) -> Result<GenerationRecord> {
        let query = format!(
            "INSERT INTO generated_images \
             (original_photo_url, generated_url, output_type, prompt_used, product_description, \
              model_api, generation_time_ms, metadata, user_id, prompt_tokens, candidates_tokens, \
              total_tokens, input_cost_usd, output_cost_usd, total_cost_usd) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {}",
            GENERATION_COLUMNS
        );

        let saved = sqlx::query_as::<_, GenerationRecord>(&query)
            .bind(&record.original_photo_url)
            .bind(&record.generated_url)
            .bind(&record.output_type)
            .bind(&record.prompt_used)
            .bind(&record.product_description)
            .bind(&record.model_api)
            .bind(record.generation_time_ms)
            .bind(&record.metadata)
            .bind(record.user_id)
            .bind(record.prompt_tokens)
            .bind(record.candidates_tokens)
            .bind(record.total_tokens)
            .bind(record.input_cost_usd)
            .bind(record.output_cost_usd)
            .bind(record.total_cost_usd)
            .fetch_one(&self.pool)
            .await?;

        Ok(saved)
    }

    async fn get(&self, id: Uuid) -> Result<Option<GenerationRecord>> {
        let query = format!(
            "SELECT {} FROM generated_images WHERE id = $1",
            GENERATION_COLUMNS
        );

        let record = sqlx::query_as::<_, GenerationRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn recent(&self, limit: i64, offset: i64) -> Result<Vec<GenerationRecord>> {
        let query = format!(
            "SELECT {} FROM generated_images ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            GENERATION_COLUMNS
        );

        let records = sqlx::query_as::<_, GenerationRecord>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }
}

#[derive(Clone)]
pub struct PgFeedbackStore {
    pool: PgPool,
}

impl PgFeedbackStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackStore for PgFeedbackStore {
    async fn insert(&self, feedback: NewFeedback) -> Result<Feedback> {
        let saved = sqlx::query_as::<_, Feedback>(
            "INSERT INTO feedbacks \
             (user_id, generation_id, output_type, rating, what_worked, what_to_improve, \
              met_needs, additional_comments) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id, user_id, generation_id, output_type, rating, what_worked, \
                       what_to_improve, met_needs, additional_comments, created_at",
        )
        .bind(feedback.user_id)
        .bind(&feedback.generation_id)
        .bind(&feedback.output_type)
        .bind(feedback.rating)
        .bind(&feedback.what_worked)
        .bind(&feedback.what_to_improve)
        .bind(&feedback.met_needs)
        .bind(&feedback.additional_comments)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            "Feedback created: id={} user_id={} generation_id={}",
            saved.id,
            saved.user_id,
            saved.generation_id
        );

        Ok(saved)
    }

    async fn for_generation(&self, generation_id: &str) -> Result<Vec<Feedback>> {
        let feedbacks = sqlx::query_as::<_, Feedback>(
            "SELECT id, user_id, generation_id, output_type, rating, what_worked, \
                    what_to_improve, met_needs, additional_comments, created_at \
             FROM feedbacks WHERE generation_id = $1 ORDER BY created_at DESC",
        )
        .bind(generation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(feedbacks)
    }
}
