//! Export resize pipeline
//!
//! Fetches a source image by URL and re-encodes it to one of the catalog's
//! named export formats. Nothing is cached or pooled across requests.

pub mod engine;
pub mod mock;

pub use engine::ResizeEngine;
pub use mock::MockResizeService;

use crate::Result;
use async_trait::async_trait;

/// Output of one export: encoded JPEG bytes plus the pre- and post-resize
/// byte counts for observability.
#[derive(Debug, Clone)]
pub struct ResizedImage {
    pub bytes: Vec<u8>,
    pub source_bytes: usize,
    pub output_bytes: usize,
}

#[async_trait]
pub trait ResizeService: Send + Sync {
    /// Produce the JPEG export of `image_url` for the catalog format named
    /// by `format_key`.
    async fn export(&self, image_url: &str, format_key: &str) -> Result<ResizedImage>;
}
