//! Application orchestration for generating and publishing studio renders.

use crate::ai::{pricing, ImageGenerationService, OutputView};
use crate::db::{GenerationRecord, GenerationStore, NewGenerationRecord};
use crate::media::MediaHostService;
use crate::resize::{ResizeService, ResizedImage};
use crate::{Error, Result};
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_retry::{strategy::FixedInterval, Retry};
use tracing::{info, warn};

const REFERENCE_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const GENERATED_MEDIA_FOLDER: &str = "photostudio/generated";

/// One batch of requested studio renders.
#[derive(Debug, Clone)]
pub struct StudioRequest {
    pub image_urls: Vec<String>,
    pub output_types: Vec<OutputView>,
    pub user_id: Option<i32>,
    pub product_description: Option<String>,
}

/// Coordinates provider generation, media publishing, and persistence.
pub struct App {
    provider: Arc<dyn ImageGenerationService>,
    media: Arc<dyn MediaHostService>,
    generations: Arc<dyn GenerationStore>,
    resize: Arc<dyn ResizeService>,
    http: reqwest::Client,
    model_api: String,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub provider: Arc<dyn ImageGenerationService>,
    pub media: Arc<dyn MediaHostService>,
    pub generations: Arc<dyn GenerationStore>,
    pub resize: Arc<dyn ResizeService>,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices, model_api: String) -> Self {
        Self {
            provider: services.provider,
            media: services.media,
            generations: services.generations,
            resize: services.resize,
            http: reqwest::Client::new(),
            model_api,
        }
    }

    /// Produce the export of a hosted image for a named catalog format.
    pub async fn export_format(&self, image_url: &str, format_key: &str) -> Result<ResizedImage> {
        self.resize.export(image_url, format_key).await
    }

    /// Generate every requested view from the first reference image.
    ///
    /// The per-view pipelines run concurrently; the returned vector matches
    /// the order of `request.output_types` regardless of which underlying
    /// call finishes first.
    pub async fn generate_studio(&self, request: StudioRequest) -> Result<Vec<GenerationRecord>> {
        let source_url = request
            .image_urls
            .first()
            .ok_or_else(|| Error::Generic("No reference image URL provided".to_string()))?;

        info!(
            "Generating {} view(s) from reference {}",
            request.output_types.len(),
            source_url
        );

        let reference = self.fetch_reference(source_url).await?;

        let pipelines = request.output_types.iter().map(|&view| {
            self.generate_view(
                view,
                &reference,
                source_url,
                request.user_id,
                request.product_description.as_deref(),
            )
        });

        let records = join_all(pipelines)
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        info!("Generated {} image(s)", records.len());
        Ok(records)
    }

    /// Download the reference image, retrying once on transient failure.
    async fn fetch_reference(&self, source_url: &str) -> Result<Vec<u8>> {
        let retry_strategy = FixedInterval::from_millis(2000).take(1);

        Retry::spawn(retry_strategy, move || async move {
            match self.fetch_once(source_url).await {
                Ok(bytes) => Ok(bytes),
                Err(e) => {
                    warn!("Reference fetch attempt failed: {}. Will retry...", e);
                    Err(e)
                }
            }
        })
        .await
    }

    async fn fetch_once(&self, source_url: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(source_url)
            .timeout(REFERENCE_FETCH_TIMEOUT)
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

    async fn generate_view(
        &self,
        view: OutputView,
        reference: &[u8],
        source_url: &str,
        user_id: Option<i32>,
        product_description: Option<&str>,
    ) -> Result<GenerationRecord> {
        let started = Instant::now();
        let generated = self.provider.generate(view, reference).await?;
        let generation_time_ms = started.elapsed().as_millis() as i32;

        info!(
            "[{}] Generated image ({} bytes) in {}ms",
            view,
            generated.bytes.len(),
            generation_time_ms
        );

        let generated_url = match self
            .media
            .upload_image(&generated.bytes, &generated.mime_type, GENERATED_MEDIA_FOLDER)
            .await
        {
            Ok(media) => media.url,
            Err(e) => {
                // Hosting outages must not block delivery: hand the image
                // back inline instead of failing the request.
                warn!("[{}] Media upload failed, falling back to data URI: {}", view, e);
                data_uri(&generated.mime_type, &generated.bytes)
            }
        };

        let cost = pricing::cost_for(&generated.usage);
        let record = NewGenerationRecord {
            original_photo_url: source_url.to_string(),
            generated_url,
            output_type: view.as_str().to_string(),
            prompt_used: generated.prompt,
            product_description: product_description.map(str::to_string),
            model_api: self.model_api.clone(),
            generation_time_ms: Some(generation_time_ms),
            metadata: None,
            user_id,
            prompt_tokens: generated.usage.prompt_tokens,
            candidates_tokens: generated.usage.candidates_tokens,
            total_tokens: generated.usage.total_tokens,
            input_cost_usd: cost.input_cost_usd,
            output_cost_usd: cost.output_cost_usd,
            total_cost_usd: cost.total_cost_usd,
        };

        match self.generations.insert(record.clone()).await {
            Ok(saved) => Ok(saved),
            Err(e) => {
                // The generation already succeeded; losing the bookkeeping
                // row is preferable to losing the user's image.
                warn!("[{}] Generation succeeded but could not be recorded: {}", view, e);
                Ok(GenerationRecord::unsaved(record))
            }
        }
    }
}

fn data_uri(mime_type: &str, bytes: &[u8]) -> String {
    use base64::Engine as _;
    format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockImageGenerationClient, TokenUsage};
    use crate::db::MockGenerationStore;
    use crate::media::MockMediaHost;
    use crate::resize::MockResizeService;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_MODEL: &str = "gemini-2.5-flash-image";

    struct TestHarness {
        app: App,
        provider: MockImageGenerationClient,
        media: MockMediaHost,
        generations: MockGenerationStore,
        resize: MockResizeService,
    }

    fn build_app(provider: MockImageGenerationClient, media: MockMediaHost) -> TestHarness {
        let generations = MockGenerationStore::new();
        let resize = MockResizeService::new();

        let app = App::with_services(
            AppServices {
                provider: Arc::new(provider.clone()),
                media: Arc::new(media.clone()),
                generations: Arc::new(generations.clone()),
                resize: Arc::new(resize.clone()),
            },
            TEST_MODEL.to_string(),
        );

        TestHarness {
            app,
            provider,
            media,
            generations,
            resize,
        }
    }

    async fn reference_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/product.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"reference-bytes".to_vec()))
            .mount(&server)
            .await;
        server
    }

    fn studio_request(server: &MockServer, views: Vec<OutputView>) -> StudioRequest {
        StudioRequest {
            image_urls: vec![format!("{}/product.jpg", server.uri())],
            output_types: views,
            user_id: Some(42),
            product_description: Some("blue shirt".to_string()),
        }
    }

    #[tokio::test]
    async fn test_generate_studio_persists_records_with_costs() {
        let server = reference_server().await;
        let usage = TokenUsage {
            prompt_tokens: 1_000_000,
            candidates_tokens: 1_000_000,
            total_tokens: 2_000_000,
        };
        let harness = build_app(
            MockImageGenerationClient::new().with_usage(usage),
            MockMediaHost::new(),
        );

        let records = harness
            .app
            .generate_studio(studio_request(&server, vec![OutputView::Front]))
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.output_type, "front");
        assert_eq!(record.model_api, TEST_MODEL);
        assert_eq!(record.user_id, Some(42));
        assert_eq!(record.total_tokens, 2_000_000);
        assert!((record.input_cost_usd - 0.30).abs() < 1e-9);
        assert!((record.output_cost_usd - 30.0).abs() < 1e-9);
        assert!(record.generated_url.starts_with("https://mock-media.example.com/"));

        assert_eq!(harness.generations.get_insert_count(), 1);
        assert_eq!(harness.media.get_upload_count(), 1);
        assert_eq!(harness.provider.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_results_keep_request_order_despite_completion_order() {
        let server = reference_server().await;
        let provider = MockImageGenerationClient::new()
            .with_delay(OutputView::Front, Duration::from_millis(80))
            .with_delay(OutputView::Back, Duration::from_millis(40));
        let harness = build_app(provider, MockMediaHost::new());

        let views = vec![OutputView::Front, OutputView::Back, OutputView::RealSituation];
        let records = harness
            .app
            .generate_studio(studio_request(&server, views.clone()))
            .await
            .unwrap();

        let returned: Vec<_> = records.iter().map(|r| r.output_type.as_str()).collect();
        assert_eq!(returned, vec!["front", "back", "real_situation"]);

        // Sanity-check the staggered delays actually reordered completion.
        let completed = harness.provider.get_completed_views();
        assert_eq!(completed.len(), 3);
        assert_ne!(completed, views);
    }

    #[tokio::test]
    async fn test_upload_failure_falls_back_to_data_uri() {
        let server = reference_server().await;
        let harness = build_app(
            MockImageGenerationClient::new().with_image_response(vec![0x01, 0x02]),
            MockMediaHost::new().with_failure(true),
        );

        let records = harness
            .app
            .generate_studio(studio_request(&server, vec![OutputView::Front]))
            .await
            .unwrap();

        use base64::Engine as _;
        let expected = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode([0x01, 0x02])
        );
        assert_eq!(records[0].generated_url, expected);

        // Degraded result is still recorded.
        assert_eq!(harness.generations.get_insert_count(), 1);
    }

    #[tokio::test]
    async fn test_persist_failure_still_returns_records() {
        let server = reference_server().await;
        let provider = MockImageGenerationClient::new();
        let media = MockMediaHost::new();
        let generations = MockGenerationStore::new().with_failure(true);

        let app = App::with_services(
            AppServices {
                provider: Arc::new(provider),
                media: Arc::new(media),
                generations: Arc::new(generations.clone()),
                resize: Arc::new(MockResizeService::new()),
            },
            TEST_MODEL.to_string(),
        );

        let records = app
            .generate_studio(studio_request(&server, vec![OutputView::Front, OutputView::Back]))
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(generations.get_insert_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_aborts_whole_request() {
        let server = reference_server().await;
        let harness = build_app(
            MockImageGenerationClient::new().with_failure(true),
            MockMediaHost::new(),
        );

        let err = harness
            .app
            .generate_studio(studio_request(&server, vec![OutputView::Front]))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Provider(_)));
        assert_eq!(harness.generations.get_insert_count(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_reference_fails_with_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let harness = build_app(MockImageGenerationClient::new(), MockMediaHost::new());

        let err = harness
            .app
            .generate_studio(StudioRequest {
                image_urls: vec![format!("{}/missing.jpg", server.uri())],
                output_types: vec![OutputView::Front],
                user_id: None,
                product_description: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::FetchFailed(_)));
        assert_eq!(harness.provider.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_reference_fetch_retries_once_on_transient_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky.jpg"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .mount(&server)
            .await;

        let harness = build_app(MockImageGenerationClient::new(), MockMediaHost::new());

        let records = harness
            .app
            .generate_studio(StudioRequest {
                image_urls: vec![format!("{}/flaky.jpg", server.uri())],
                output_types: vec![OutputView::Front],
                user_id: None,
                product_description: None,
            })
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_export_format_delegates_to_resize_service() {
        let harness = build_app(MockImageGenerationClient::new(), MockMediaHost::new());

        let result = harness
            .app
            .export_format("https://example.com/a.jpg", "amazon")
            .await
            .unwrap();

        assert!(!result.bytes.is_empty());
        assert_eq!(
            harness.resize.get_requests(),
            vec![("https://example.com/a.jpg".to_string(), "amazon".to_string())]
        );
    }
}
