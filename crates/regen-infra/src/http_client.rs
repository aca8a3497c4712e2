//! HttpResolutionClient -- [`ResolutionClient`] over `POST /resolve-image`.

use std::time::Duration;

use regen_core::orchestrator::ResolutionClient;
use regen_types::error::ResolveError;
use regen_types::image::{ResolveImageRequest, ResolveImageResponse};

/// Talks to a running resolution server.
pub struct HttpResolutionClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpResolutionClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ResolveError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self) -> String {
        format!("{}/resolve-image", self.base_url)
    }
}

impl ResolutionClient for HttpResolutionClient {
    async fn request_resolution(
        &self,
        request: &ResolveImageRequest,
    ) -> Result<ResolveImageResponse, ResolveError> {
        let response = self
            .client
            .post(self.url())
            .json(request)
            .send()
            .await
            .map_err(|e| ResolveError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| ResolveError::Decode(e.to_string()))
    }
}
