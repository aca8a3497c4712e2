//! Request orchestration: exclusion list in, recorded identifier out.
//!
//! [`ImageRequestOrchestrator::request_image`] snapshots the shared
//! [`UsedImageStore`], sends one resolution request through a
//! [`ResolutionClient`], retries failures with the same inputs, and records
//! whatever identifier comes back. It returns `None` once the retry budget is
//! exhausted; callers substitute their own default image.

use std::sync::Arc;

use regen_types::error::ResolveError;
use regen_types::image::{ImageRequestContext, ResolveImageRequest, ResolveImageResponse};

use crate::provider::{ImageGenerator, ImageRanker};
use crate::resolver::ImageResolver;
use crate::retry::RetryPolicy;
use crate::storage::kv_store::KvStore;
use crate::storage::used_images::UsedImageStore;

/// Transport that turns a resolution request into a response.
///
/// The HTTP implementation lives in regen-infra; an [`ImageResolver`] is also
/// a client, for in-process use.
pub trait ResolutionClient: Send + Sync {
    fn request_resolution(
        &self,
        request: &ResolveImageRequest,
    ) -> impl std::future::Future<Output = Result<ResolveImageResponse, ResolveError>> + Send;
}

impl<G: ImageGenerator, R: ImageRanker> ResolutionClient for ImageResolver<G, R> {
    async fn request_resolution(
        &self,
        request: &ResolveImageRequest,
    ) -> Result<ResolveImageResponse, ResolveError> {
        let resolved = self.resolve(&request.context(), &request.exclude_urls).await;
        Ok(ResolveImageResponse {
            image_url: resolved.identifier,
            error: None,
        })
    }
}

impl<C: ResolutionClient> ResolutionClient for Arc<C> {
    async fn request_resolution(
        &self,
        request: &ResolveImageRequest,
    ) -> Result<ResolveImageResponse, ResolveError> {
        self.as_ref().request_resolution(request).await
    }
}

/// Drives one image request end to end.
pub struct ImageRequestOrchestrator<C, S> {
    client: C,
    store: Arc<UsedImageStore<S>>,
    retry: RetryPolicy,
    gate: Option<tokio::sync::Mutex<()>>,
}

impl<C: ResolutionClient, S: KvStore> ImageRequestOrchestrator<C, S> {
    pub fn new(client: C, store: Arc<UsedImageStore<S>>) -> Self {
        Self {
            client,
            store,
            retry: RetryPolicy::default(),
            gate: None,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Serialize whole requests (read, resolve, record) so concurrent calls
    /// always see each other's results.
    pub fn serialized(mut self, enabled: bool) -> Self {
        self.gate = enabled.then(|| tokio::sync::Mutex::new(()));
        self
    }

    pub fn store(&self) -> &Arc<UsedImageStore<S>> {
        &self.store
    }

    /// Request one image for `context`.
    ///
    /// The exclusion list is read once; every retry resends the same body.
    #[tracing::instrument(
        name = "request_image",
        skip(self, context),
        fields(usage = %context.usage, max_attempts = self.retry.max_attempts())
    )]
    pub async fn request_image(&self, context: &ImageRequestContext) -> Option<String> {
        let _serial = match &self.gate {
            Some(gate) => Some(gate.lock().await),
            None => None,
        };

        let request = ResolveImageRequest::from_context(context, self.store.snapshot());
        let mut attempt = 1;

        loop {
            match self.attempt(&request).await {
                Ok(identifier) => {
                    self.store.add(&identifier).await;
                    tracing::info!(attempt, "Image request resolved");
                    return Some(identifier);
                }
                Err(e) if self.retry.should_retry(attempt) => {
                    tracing::debug!(attempt, error = %e, "Image request failed, retrying");
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Image request failed, giving up");
                    return None;
                }
            }
        }
    }

    async fn attempt(&self, request: &ResolveImageRequest) -> Result<String, ResolveError> {
        let response = self.client.request_resolution(request).await?;
        if let Some(error) = &response.error {
            tracing::debug!(%error, "Resolver reported a fallback");
        }
        if response.image_url.trim().is_empty() {
            return Err(ResolveError::EmptyIdentifier);
        }
        Ok(response.image_url)
    }
}
