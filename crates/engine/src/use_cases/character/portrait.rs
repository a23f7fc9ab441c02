//! Character portrait rendering.

use std::sync::Arc;

use crate::infrastructure::ports::{ImageGenPort, ImageRequest, ImageResult};

pub struct RenderPortrait {
    image_gen: Arc<dyn ImageGenPort>,
}

impl RenderPortrait {
    pub fn new(image_gen: Arc<dyn ImageGenPort>) -> Self {
        Self { image_gen }
    }

    /// Render one portrait. Failures are logged and yield `None`; nothing is retried.
    pub async fn execute(&self, prompt: &str, negative_prompt: &str) -> Option<ImageResult> {
        if prompt.trim().is_empty() {
            tracing::warn!("Portrait requested without a prompt");
            return None;
        }

        let request = ImageRequest::new(prompt.trim()).with_negative_prompt(negative_prompt.trim());
        match self.image_gen.generate(request).await {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!(error = %e, "Portrait generation failed");
                None
            }
        }
    }
}
