use super::{GeneratedImage, ImageGenerationService, OutputView, TokenUsage};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Tiny valid 1x1 PNG used as the default generated image.
const DEFAULT_PNG: [u8; 69] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1 pixel
    0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49,
    0x44, 0x41, // IDAT chunk
    0x54, 0x08, 0x99, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0xE2,
    0x25, 0x00, 0xBC, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, // IEND chunk
    0x44, 0xAE, 0x42, 0x60, 0x82,
];

#[derive(Clone)]
pub struct MockImageGenerationClient {
    image_responses: Arc<Mutex<Vec<Vec<u8>>>>,
    usage: Arc<Mutex<TokenUsage>>,
    delays: Arc<Mutex<HashMap<OutputView, Duration>>>,
    completed_views: Arc<Mutex<Vec<OutputView>>>,
    call_count: Arc<Mutex<usize>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            image_responses: Arc::new(Mutex::new(Vec::new())),
            usage: Arc::new(Mutex::new(TokenUsage::default())),
            delays: Arc::new(Mutex::new(HashMap::new())),
            completed_views: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_image_response(self, response: Vec<u8>) -> Self {
        self.image_responses.lock().unwrap().push(response);
        self
    }

    pub fn with_usage(self, usage: TokenUsage) -> Self {
        *self.usage.lock().unwrap() = usage;
        self
    }

    /// Delay completion of a specific view, for exercising out-of-order
    /// completion in fan-out callers.
    pub fn with_delay(self, view: OutputView, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(view, delay);
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Views in the order their generation calls finished.
    pub fn get_completed_views(&self) -> Vec<OutputView> {
        self.completed_views.lock().unwrap().clone()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate(&self, view: OutputView, _reference_image: &[u8]) -> Result<GeneratedImage> {
        if *self.should_fail.lock().unwrap() {
            return Err(Error::Provider("Mock provider failure".to_string()));
        }

        let call = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count
        };

        let delay = self.delays.lock().unwrap().get(&view).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let bytes = {
            let responses = self.image_responses.lock().unwrap();
            if responses.is_empty() {
                DEFAULT_PNG.to_vec()
            } else {
                responses[(call - 1) % responses.len()].clone()
            }
        };

        self.completed_views.lock().unwrap().push(view);

        Ok(GeneratedImage {
            bytes,
            mime_type: "image/png".to_string(),
            prompt: crate::prompts::for_view(view).to_string(),
            usage: *self.usage.lock().unwrap(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_default_png() {
        let client = MockImageGenerationClient::new();

        let generated = client
            .generate(OutputView::Front, b"reference")
            .await
            .unwrap();
        assert_eq!(&generated.bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
        assert_eq!(client.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_queued_responses_cycle() {
        let client = MockImageGenerationClient::new()
            .with_image_response(vec![1])
            .with_image_response(vec![2]);

        let first = client.generate(OutputView::Front, b"r").await.unwrap();
        let second = client.generate(OutputView::Back, b"r").await.unwrap();
        let third = client.generate(OutputView::Front, b"r").await.unwrap();

        assert_eq!(first.bytes, vec![1]);
        assert_eq!(second.bytes, vec![2]);
        assert_eq!(third.bytes, vec![1]);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let client = MockImageGenerationClient::new().with_failure(true);

        let err = client.generate(OutputView::Front, b"r").await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[tokio::test]
    async fn test_mock_records_completion_order() {
        let client = MockImageGenerationClient::new()
            .with_delay(OutputView::Front, Duration::from_millis(50));

        let (first, second) = tokio::join!(
            client.generate(OutputView::Front, b"r"),
            client.generate(OutputView::Back, b"r"),
        );
        first.unwrap();
        second.unwrap();

        assert_eq!(
            client.get_completed_views(),
            vec![OutputView::Back, OutputView::Front]
        );
    }
}
