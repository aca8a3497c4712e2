//! GeminiImageGenerator -- [`ImageGenerator`] over an image-capable model.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use regen_core::provider::{DEFAULT_IMAGE_MIME, GeneratedImage, ImageGenerator};
use regen_types::error::ImageError;

use super::client::GeminiClient;
use super::types::{GenerateContentRequest, GenerateContentResponse};

/// Default image synthesis model.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Image generator backed by Gemini `generateContent`.
pub struct GeminiImageGenerator {
    client: Arc<GeminiClient>,
    model: String,
}

impl GeminiImageGenerator {
    pub fn new(client: Arc<GeminiClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ImageGenerator for GeminiImageGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ImageError> {
        let body = GenerateContentRequest::text(prompt).with_modalities(&["TEXT", "IMAGE"]);
        let response = self.client.generate_content(&self.model, &body).await?;
        decode_image(&response)
    }
}

/// Decode the first inline image of `response`.
fn decode_image(response: &GenerateContentResponse) -> Result<GeneratedImage, ImageError> {
    let inline = response.first_inline_data().ok_or(ImageError::EmptyPayload)?;
    let data = inline.data.as_deref().ok_or(ImageError::EmptyPayload)?;

    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|e| ImageError::Deserialization(format!("invalid base64 image: {e}")))?;

    let mime_type = inline
        .mime_type
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(DEFAULT_IMAGE_MIME)
        .to_string();

    Ok(GeneratedImage { mime_type, bytes })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::gemini::client::tests::{mock_endpoint, test_client};

    #[test]
    fn test_decode_defaults_mime() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"inlineData": {"data": "aGVsbG8="}}]}}]
        }))
        .unwrap();

        let image = decode_image(&response).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes, b"hello");
    }

    #[test]
    fn test_decode_text_only_is_empty_payload() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "I cannot draw that"}]}}]
        }))
        .unwrap();
        assert!(matches!(decode_image(&response), Err(ImageError::EmptyPayload)));
    }

    #[test]
    fn test_decode_bad_base64() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"inlineData": {"data": "@@@"}}]}}]
        }))
        .unwrap();
        assert!(matches!(
            decode_image(&response),
            Err(ImageError::Deserialization(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_against_mock_endpoint() {
        let base = mock_endpoint(
            StatusCode::OK,
            serde_json::json!({
                "candidates": [{"content": {"parts": [
                    {"text": "ok"},
                    {"inlineData": {"mimeType": "image/jpeg", "data": "/9j/"}}
                ]}}]
            }),
        )
        .await;

        let generator = GeminiImageGenerator::new(Arc::new(test_client(&base)), DEFAULT_IMAGE_MODEL);
        let image = generator.generate("snow soft winter sky").await.unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert!(image.to_data_uri().starts_with("data:image/jpeg;base64,/9j/"));
    }
}
