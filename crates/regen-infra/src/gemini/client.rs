//! GeminiClient -- authenticated transport for `generateContent`.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when building the request header. It never appears in logs.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use regen_types::error::ImageError;

use super::types::{GenerateContentRequest, GenerateContentResponse};

/// Default public endpoint of the generative API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Shared HTTP transport for the Gemini adapters.
///
/// Intentionally does not derive Debug.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl GeminiClient {
    /// Create a client with the given transport timeout.
    pub fn new(api_key: SecretString, timeout: Duration) -> Result<Self, ImageError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ImageError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    /// POST one `generateContent` request for `model`.
    pub async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ImageError> {
        let response = self
            .client
            .post(self.url(model))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| ImageError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::debug!(model, status = status.as_u16(), "generateContent rejected");
            return Err(match status.as_u16() {
                401 | 403 => ImageError::AuthenticationFailed,
                429 => ImageError::RateLimited,
                _ => ImageError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        response
            .json()
            .await
            .map_err(|e| ImageError::Deserialization(format!("failed to parse response: {e}")))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use axum::Json;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;

    use super::*;

    /// Serve `reply` with `status` for every generateContent call, echoing
    /// the API key check the real endpoint performs.
    pub(crate) async fn mock_endpoint(status: StatusCode, reply: serde_json::Value) -> String {
        let app = Router::new().route(
            "/v1beta/models/{call}",
            post(move |headers: HeaderMap| {
                let reply = reply.clone();
                async move {
                    if headers.get("x-goog-api-key").is_none() {
                        return (StatusCode::UNAUTHORIZED, Json(serde_json::json!({})));
                    }
                    (status, Json(reply))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    pub(crate) fn test_client(base_url: &str) -> GeminiClient {
        GeminiClient::new(SecretString::from("test-key"), Duration::from_secs(5))
            .unwrap()
            .with_base_url(base_url)
    }

    #[test]
    fn test_url_includes_model() {
        let client = test_client("http://localhost:9/");
        assert_eq!(
            client.url("gemini-2.0-flash"),
            "http://localhost:9/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let body = GenerateContentRequest::text("x");

        let base = mock_endpoint(StatusCode::UNAUTHORIZED, serde_json::json!({})).await;
        assert!(matches!(
            test_client(&base).generate_content("m", &body).await,
            Err(ImageError::AuthenticationFailed)
        ));

        let base = mock_endpoint(StatusCode::TOO_MANY_REQUESTS, serde_json::json!({})).await;
        assert!(matches!(
            test_client(&base).generate_content("m", &body).await,
            Err(ImageError::RateLimited)
        ));

        let base = mock_endpoint(StatusCode::INTERNAL_SERVER_ERROR, serde_json::json!({})).await;
        assert!(matches!(
            test_client(&base).generate_content("m", &body).await,
            Err(ImageError::Provider { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_provider_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = test_client(&format!("http://{addr}"))
            .generate_content("m", &GenerateContentRequest::text("x"))
            .await;
        assert!(matches!(result, Err(ImageError::Provider { .. })));
    }
}
