//! Media host integration
//!
//! Uploads product photos and generated renders to S3-compatible object
//! storage and hands back durable public URLs.

pub mod client;
pub mod mime;
pub mod mock;

pub use client::MediaHostClient;
pub use mock::MockMediaHost;

use crate::{Error, Result};
use async_trait::async_trait;

/// Durable reference to one uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub url: String,
    pub id: String,
}

#[async_trait]
pub trait MediaHostService: Send + Sync {
    /// Upload image bytes under a folder hint, returning the public URL and
    /// the host-side identifier.
    async fn upload_image(
        &self,
        data: &[u8],
        content_type: &str,
        folder: &str,
    ) -> Result<UploadedMedia>;
}

/// Placeholder wired in when media-host credentials are absent: startup
/// succeeds, the first upload fails.
pub struct UnconfiguredMediaHost;

#[async_trait]
impl MediaHostService for UnconfiguredMediaHost {
    async fn upload_image(
        &self,
        _data: &[u8],
        _content_type: &str,
        _folder: &str,
    ) -> Result<UploadedMedia> {
        Err(Error::Upload(
            "MEDIA_ACCESS_KEY_ID / MEDIA_SECRET_ACCESS_KEY are not set".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_host_fails_at_first_use() {
        let host = UnconfiguredMediaHost;
        let err = host
            .upload_image(b"bytes", "image/jpeg", "photostudio/uploads")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upload(_)));
    }
}
