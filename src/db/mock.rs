use super::{
    Feedback, FeedbackStore, GenerationRecord, GenerationStore, NewFeedback, NewGenerationRecord,
    User, UserStore,
};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Clone)]
pub struct MockUserStore {
    users: Arc<Mutex<Vec<User>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockUserStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_users(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }
}

impl Default for MockUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MockUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        if *self.should_fail.lock().unwrap() {
            return Err(Error::Persist("Mock database failure".to_string()));
        }

        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_or_create(&self, email: &str) -> Result<User> {
        if let Some(existing) = self.find_by_email(email).await? {
            return Ok(existing);
        }

        let mut users = self.users.lock().unwrap();
        let user = User {
            id: users.len() as i32 + 1,
            email: email.to_string(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[derive(Clone)]
pub struct MockGenerationStore {
    records: Arc<Mutex<Vec<GenerationRecord>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockGenerationStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_records(&self) -> Vec<GenerationRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn get_insert_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl Default for MockGenerationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationStore for MockGenerationStore {
    async fn insert(&self, record: NewGenerationRecord) -> Result<GenerationRecord> {
        if *self.should_fail.lock().unwrap() {
            return Err(Error::Persist("Mock database failure".to_string()));
        }

        let saved = GenerationRecord::unsaved(record);
        self.records.lock().unwrap().push(saved.clone());
        Ok(saved)
    }

    async fn get(&self, id: Uuid) -> Result<Option<GenerationRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.id == id)
            .cloned())
    }

    async fn recent(&self, limit: i64, offset: i64) -> Result<Vec<GenerationRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[derive(Clone)]
pub struct MockFeedbackStore {
    feedbacks: Arc<Mutex<Vec<Feedback>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockFeedbackStore {
    pub fn new() -> Self {
        Self {
            feedbacks: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_feedbacks(&self) -> Vec<Feedback> {
        self.feedbacks.lock().unwrap().clone()
    }
}

impl Default for MockFeedbackStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedbackStore for MockFeedbackStore {
    async fn insert(&self, feedback: NewFeedback) -> Result<Feedback> {
        if *self.should_fail.lock().unwrap() {
            return Err(Error::Persist("Mock database failure".to_string()));
        }

        let mut feedbacks = self.feedbacks.lock().unwrap();
        let saved = Feedback {
            id: feedbacks.len() as i32 + 1,
            user_id: feedback.user_id,
            generation_id: feedback.generation_id,
            output_type: feedback.output_type,
            rating: feedback.rating,
            what_worked: feedback.what_worked,
            what_to_improve: feedback.what_to_improve,
            met_needs: feedback.met_needs,
            additional_comments: feedback.additional_comments,
            created_at: Utc::now(),
        };
        feedbacks.push(saved.clone());
        Ok(saved)
    }

    async fn for_generation(&self, generation_id: &str) -> Result<Vec<Feedback>> {
        Ok(self
            .feedbacks
            .lock()
            .unwrap()
            .iter()
            .filter(|feedback| feedback.generation_id == generation_id)
            .cloned()
            .collect())
    }
}
