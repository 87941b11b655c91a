use super::{MediaHostService, UploadedMedia};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockMediaHost {
    uploads: Arc<Mutex<Vec<(String, Vec<u8>, String)>>>,
    base_url: String,
    should_fail: Arc<Mutex<bool>>,
}

impl MockMediaHost {
    pub fn new() -> Self {
        Self {
            uploads: Arc::new(Mutex::new(Vec::new())),
            base_url: "https://mock-media.example.com".to_string(),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    /// Uploads as (folder, bytes, content_type) tuples, in call order.
    pub fn get_uploads(&self) -> Vec<(String, Vec<u8>, String)> {
        self.uploads.lock().unwrap().clone()
    }
}

impl Default for MockMediaHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaHostService for MockMediaHost {
    async fn upload_image(
        &self,
        data: &[u8],
        content_type: &str,
        folder: &str,
    ) -> Result<UploadedMedia> {
        if *self.should_fail.lock().unwrap() {
            return Err(Error::Upload("Mock upload failure".to_string()));
        }

        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((folder.to_string(), data.to_vec(), content_type.to_string()));

        let key = format!("{}/upload-{}.jpg", folder, uploads.len());
        Ok(UploadedMedia {
            url: format!("{}/{}", self.base_url, key),
            id: key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_upload_returns_url_under_base() {
        let host = MockMediaHost::new().with_base_url("https://cdn.test".to_string());

        let media = host
            .upload_image(b"bytes", "image/jpeg", "photostudio/uploads")
            .await
            .unwrap();

        assert!(media.url.starts_with("https://cdn.test/photostudio/uploads/"));
        assert_eq!(host.get_upload_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_records_folder_and_bytes() {
        let host = MockMediaHost::new();
        host.upload_image(b"abc", "image/png", "photostudio/generated")
            .await
            .unwrap();

        let uploads = host.get_uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0, "photostudio/generated");
        assert_eq!(uploads[0].1, b"abc".to_vec());
        assert_eq!(uploads[0].2, "image/png");
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let host = MockMediaHost::new().with_failure(true);
        let err = host
            .upload_image(b"abc", "image/png", "f")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upload(_)));
    }
}
