use super::{ResizeService, ResizedImage};
use crate::formats::{self, FitStrategy, ImageFormat};
use crate::{Error, Result};
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use std::io::Cursor;
use std::time::Duration;

/// Fixed output quality. Callers never choose codec or quality: exports are
/// always JPEG at the highest practical setting.
const JPEG_QUALITY: u8 = 95;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads a source image and re-encodes it to a catalog format.
pub struct ResizeEngine {
    client: reqwest::Client,
    timeout: Duration,
}

impl ResizeEngine {
    pub fn new() -> Self {
        Self::new_with_client(reqwest::Client::new())
    }

    pub fn new_with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: FETCH_TIMEOUT,
        }
    }

    async fn fetch(&self, image_url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(image_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::FetchFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::FetchFailed(format!(
                "upstream returned status {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::FetchFailed(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// Decode, apply the fit strategy, and encode. CPU-bound; runs on a
    /// blocking thread via [`ResizeService::export`].
    fn render_sync(format: &ImageFormat, data: &[u8]) -> Result<Vec<u8>> {
        let source =
            image::load_from_memory(data).map_err(|e| Error::DecodeFailed(e.to_string()))?;

        let (width, height) = (format.width, format.height);
        let output: RgbImage = match format.fit {
            FitStrategy::Cover => source.resize_to_fill(width, height, FilterType::Lanczos3).to_rgb8(),
            FitStrategy::Contain => {
                let scaled = source.resize(width, height, FilterType::Lanczos3).to_rgb8();
                let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
                let x = (width - scaled.width()) / 2;
                let y = (height - scaled.height()) / 2;
                image::imageops::overlay(&mut canvas, &scaled, i64::from(x), i64::from(y));
                canvas
            }
            FitStrategy::Fill => source.resize_exact(width, height, FilterType::Lanczos3).to_rgb8(),
        };

        let mut bytes = Vec::new();
        let mut cursor = Cursor::new(&mut bytes);
        let encoder = JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        output.write_with_encoder(encoder)?;
        Ok(bytes)
    }
}

impl Default for ResizeEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResizeService for ResizeEngine {
    async fn export(&self, image_url: &str, format_key: &str) -> Result<ResizedImage> {
        // Resolve the format before any network I/O so a request that can
        // never succeed does not cost a download.
        let format = formats::lookup(format_key)?.clone();

        tracing::info!(
            "Resizing {} to {} ({}x{})",
            image_url,
            format.key,
            format.width,
            format.height
        );

        let source = self.fetch(image_url).await?;
        let source_bytes = source.len();
        tracing::debug!("Fetched source image ({} bytes)", source_bytes);

        let bytes = tokio::task::spawn_blocking(move || Self::render_sync(&format, &source))
            .await
            .map_err(|e| Error::Generic(format!("Resize task join error: {}", e)))??;

        let output_bytes = bytes.len();
        tracing::info!(
            "Resized {} ({} -> {} bytes)",
            format_key,
            source_bytes,
            output_bytes
        );

        Ok(ResizedImage {
            bytes,
            source_bytes,
            output_bytes,
        })
    }
}
