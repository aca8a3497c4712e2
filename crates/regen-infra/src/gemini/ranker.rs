//! GeminiRanker -- [`ImageRanker`] over a small text model.

use std::sync::Arc;

use regen_core::provider::ImageRanker;
use regen_types::error::ImageError;

use super::client::GeminiClient;
use super::types::GenerateContentRequest;

/// Default ranking model.
pub const DEFAULT_RANKING_MODEL: &str = "gemini-2.0-flash";

/// Pool ranker backed by Gemini `generateContent`.
pub struct GeminiRanker {
    client: Arc<GeminiClient>,
    model: String,
}

impl GeminiRanker {
    pub fn new(client: Arc<GeminiClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

impl ImageRanker for GeminiRanker {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn choose(&self, prompt: &str, candidate_count: usize) -> Result<String, ImageError> {
        let body = GenerateContentRequest::text(ranking_prompt(prompt, candidate_count));
        let response = self.client.generate_content(&self.model, &body).await?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(ImageError::EmptyPayload);
        }
        Ok(text.trim().to_string())
    }
}

/// Instruction asking the model for a bare index.
pub fn ranking_prompt(prompt: &str, candidate_count: usize) -> String {
    format!(
        "You are an image selector for a climate app. Given this description, reply with ONLY a single number from 0 to {} to choose an image variant. No other text.\n\nDescription: {prompt}",
        candidate_count.saturating_sub(1)
    )
}
