//! Holara image generation client
//!
//! Implements the ImageGenPort trait against Holara's external generation API.
//! One request renders one image; the payload comes back base64-encoded.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::infrastructure::ports::{ImageGenError, ImageGenPort, ImageRequest, ImageResult};

/// Default Holara generation endpoint.
pub const DEFAULT_HOLARA_API_URL: &str =
    "https://holara.ai/holara/api/external/1.0/generate_image";

/// Rendering parameters sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct HolaraSettings {
    pub model: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub cfg_scale: f32,
}

impl Default for HolaraSettings {
    fn default() -> Self {
        Self {
            model: "Aika".to_string(),
            width: 512,
            height: 768,
            steps: 30,
            cfg_scale: 12.0,
        }
    }
}

/// Client for the Holara API
#[derive(Clone)]
pub struct HolaraClient {
    client: Client,
    url: String,
    api_key: String,
    settings: HolaraSettings,
}

impl HolaraClient {
    pub fn new(url: &str, api_key: &str, settings: HolaraSettings) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(300)) // 5 minute timeout for generation
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            url: url.to_string(),
            api_key: api_key.to_string(),
            settings,
        }
    }

    fn build_form(&self, request: &ImageRequest) -> Vec<(&'static str, String)> {
        vec![
            ("api_key", self.api_key.clone()),
            ("model", self.settings.model.clone()),
            ("num_images", "1".to_string()),
            ("prompt", request.prompt.clone()),
            ("negative_prompt", request.negative_prompt.clone()),
            ("width", self.settings.width.to_string()),
            ("height", self.settings.height.to_string()),
            ("steps", self.settings.steps.to_string()),
            ("cfg_scale", self.settings.cfg_scale.to_string()),
        ]
    }
}

#[async_trait]
impl ImageGenPort for HolaraClient {
    async fn generate(&self, request: ImageRequest) -> Result<ImageResult, ImageGenError> {
        let response = self
            .client
            .post(&self.url)
            .form(&self.build_form(&request))
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ImageGenError::Unavailable
                } else {
                    ImageGenError::GenerationFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ImageGenError::GenerationFailed(format!(
                "{}: {}",
                status, error_text
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ImageGenError::GenerationFailed(e.to_string()))?;

        let result = convert_response(body)?;

        tracing::info!(
            execution_time_secs = result.execution_time_secs,
            cost = result.cost,
            remaining_credits = result.remaining_credits,
            prompt = %truncate(&request.prompt, 100),
            "Image generated"
        );

        Ok(result)
    }
}

fn convert_response(body: GenerateResponse) -> Result<ImageResult, ImageGenError> {
    let image_base64 = body
        .images
        .into_iter()
        .next()
        .ok_or_else(|| ImageGenError::GenerationFailed("No images in response".to_string()))?;

    Ok(ImageResult {
        image_base64,
        execution_time_secs: body.execution_time,
        cost: body.generation_cost,
        remaining_credits: body.hologems_remaining,
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

// =============================================================================
// Holara API types
// =============================================================================

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[allow(dead_code)]
    #[serde(default)]
    status: Option<String>,
    images: Vec<String>,
    execution_time: f64,
    generation_cost: f64,
    hologems_remaining: f64,
}
