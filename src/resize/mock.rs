use super::{ResizeService, ResizedImage};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// JPEG SOI marker followed by filler, enough to look like encoded output.
const DEFAULT_JPEG: [u8; 6] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

#[derive(Clone)]
pub struct MockResizeService {
    responses: Arc<Mutex<Vec<Vec<u8>>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockResizeService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_response(self, bytes: Vec<u8>) -> Self {
        self.responses.lock().unwrap().push(bytes);
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for MockResizeService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResizeService for MockResizeService {
    async fn export(&self, image_url: &str, format_key: &str) -> Result<ResizedImage> {
        // Mirror the engine's contract: an unknown key fails before any
        // "fetch" is recorded.
        crate::formats::lookup(format_key)?;

        if *self.should_fail.lock().unwrap() {
            return Err(Error::FetchFailed("mock fetch failure".to_string()));
        }

        let mut requests = self.requests.lock().unwrap();
        requests.push((image_url.to_string(), format_key.to_string()));
        let call = requests.len();

        let responses = self.responses.lock().unwrap();
        let bytes = if responses.is_empty() {
            DEFAULT_JPEG.to_vec()
        } else {
            responses[(call - 1) % responses.len()].clone()
        };

        Ok(ResizedImage {
            source_bytes: bytes.len() * 2,
            output_bytes: bytes.len(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_requests() {
        let mock = MockResizeService::new();

        let result = mock.export("https://example.com/a.png", "amazon").await.unwrap();
        assert!(!result.bytes.is_empty());
        assert_eq!(
            mock.get_requests(),
            vec![("https://example.com/a.png".to_string(), "amazon".to_string())]
        );
    }

    #[tokio::test]
    async fn test_mock_rejects_unknown_format() {
        let mock = MockResizeService::new();

        let err = mock.export("https://example.com/a.png", "bogus").await.unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
        assert_eq!(mock.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockResizeService::new().with_failure(true);

        let err = mock.export("https://example.com/a.png", "shopee").await.unwrap_err();
        assert!(matches!(err, Error::FetchFailed(_)));
    }

    #[tokio::test]
    async fn test_mock_queued_responses_cycle() {
        let mock = MockResizeService::new().with_response(vec![1, 2, 3]);

        let first = mock.export("u", "amazon").await.unwrap();
        let second = mock.export("u", "shopee").await.unwrap();
        assert_eq!(first.bytes, vec![1, 2, 3]);
        assert_eq!(second.bytes, vec![1, 2, 3]);
    }
}
