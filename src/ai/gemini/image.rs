use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, InlineData, Part};
use crate::ai::{GeneratedImage, ImageGenerationService, OutputView, TokenUsage};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ImageRequest {
    contents: Vec<Content>,
}

pub struct GeminiImageClient {
    http: GeminiHttpClient,
}

impl GeminiImageClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(120),
                client,
            ),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }
}

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate(&self, view: OutputView, reference_image: &[u8]) -> Result<GeneratedImage> {
        use base64::Engine as _;

        let prompt = prompts::for_view(view);
        let reference_b64 = base64::engine::general_purpose::STANDARD.encode(reference_image);

        let request = ImageRequest {
            contents: vec![Content {
                role: None,
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/jpeg".to_string(),
                            data: reference_b64,
                        },
                    },
                ],
            }],
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let usage = response
            .usage_metadata
            .map(|meta| TokenUsage {
                prompt_tokens: meta.prompt_token_count,
                candidates_tokens: meta.candidates_token_count,
                total_tokens: meta.total_token_count,
            })
            .unwrap_or_default();

        let image_data = response
            .candidates
            .first()
            .and_then(|c| {
                c.content.parts.iter().find_map(|p| match p {
                    Part::InlineData { inline_data } => Some(inline_data),
                    _ => None,
                })
            })
            .ok_or_else(|| Error::Provider("No image data in Gemini response".to_string()))?;

        tracing::debug!(
            "Gemini returned {} image for view {}",
            image_data.mime_type,
            view
        );

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&image_data.data)
            .map_err(|e| {
                Error::Provider(format!("Failed to decode Gemini base64 image: {}", e))
            })?;

        Ok(GeneratedImage {
            bytes,
            mime_type: image_data.mime_type.clone(),
            prompt: prompt.to_string(),
            usage,
        })
    }
}
