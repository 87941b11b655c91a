//! Generative image provider integration
//!
//! Interfaces to the Gemini image API for producing studio-style renders of
//! a product from a reference photo.

pub mod gemini;
pub mod mock;
pub mod pricing;

pub use gemini::GeminiImageClient;
pub use mock::MockImageGenerationClient;

use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Which generated perspective is being requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputView {
    Front,
    Back,
    RealSituation,
}

impl OutputView {
    pub const ALL: [OutputView; 3] = [
        OutputView::Front,
        OutputView::Back,
        OutputView::RealSituation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputView::Front => "front",
            OutputView::Back => "back",
            OutputView::RealSituation => "real_situation",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|view| view.as_str() == value)
    }
}

impl std::fmt::Display for OutputView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token counts reported by the provider for one generation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: i32,
    pub candidates_tokens: i32,
    pub total_tokens: i32,
}

/// One generated render plus the metadata needed for cost accounting.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub prompt: String,
    pub usage: TokenUsage,
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Generate the requested view from a reference product image.
    async fn generate(&self, view: OutputView, reference_image: &[u8]) -> Result<GeneratedImage>;
}

/// Placeholder wired in when the provider API key is absent: startup
/// succeeds, the first generation call fails.
pub struct UnconfiguredImageClient;

#[async_trait]
impl ImageGenerationService for UnconfiguredImageClient {
    async fn generate(&self, _view: OutputView, _reference_image: &[u8]) -> Result<GeneratedImage> {
        Err(Error::Provider("GEMINI_API_KEY is not set".to_string()))
    }
}
