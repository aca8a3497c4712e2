//! Image resolution: generation first, pool selection as the fallback.
//!
//! [`ImageResolver::resolve`] never fails. Generation errors are logged and
//! swallowed, and pool selection always has at least one candidate because
//! an exhausted exclusion list falls back to the full pool.

use tracing::Instrument;

use regen_types::image::{ExclusionSet, ImagePool, ImageRequestContext, ResolvedImage};

use crate::pool::PoolSelector;
use crate::prompt::build_prompt;
use crate::provider::{ImageGenerator, ImageRanker};

/// Turns a request context plus an exclusion list into one image identifier.
pub struct ImageResolver<G, R> {
    generator: Option<G>,
    generation_enabled: bool,
    selector: PoolSelector<R>,
    pool: ImagePool,
}

impl<G: ImageGenerator, R: ImageRanker> ImageResolver<G, R> {
    /// Create a resolver over `pool`.
    ///
    /// A missing generator (no credential configured) means pool selection
    /// only; a missing ranker means hash-based selection.
    pub fn new(pool: ImagePool, generator: Option<G>, ranker: Option<R>) -> Self {
        Self {
            generator,
            generation_enabled: true,
            selector: PoolSelector::new(ranker),
            pool,
        }
    }

    /// Toggle generation without dropping the configured generator.
    pub fn with_generation_enabled(mut self, enabled: bool) -> Self {
        self.generation_enabled = enabled;
        self
    }

    pub fn pool(&self) -> &ImagePool {
        &self.pool
    }

    /// Whether a resolution will attempt generation before the pool.
    pub fn generation_active(&self) -> bool {
        self.generation_enabled && self.generator.is_some()
    }

    pub fn ranking_active(&self) -> bool {
        self.selector.has_ranker()
    }

    /// Resolve one image for `context`, avoiding `excluded` where the pool allows.
    #[tracing::instrument(
        name = "resolve_image",
        skip(self, context, excluded),
        fields(usage = %context.usage, excluded = excluded.len())
    )]
    pub async fn resolve(&self, context: &ImageRequestContext, excluded: &[String]) -> ResolvedImage {
        let prompt = build_prompt(context);

        if let Some(identifier) = self.try_generate(&prompt).await {
            return ResolvedImage::generated(identifier);
        }

        let candidates = self.pool.available(excluded);
        let identifier = self
            .selector
            .select(&prompt, &candidates)
            .await
            .unwrap_or_else(|| self.pool.primary().to_string());

        tracing::debug!(%identifier, candidates = candidates.len(), "Selected pool image");
        ResolvedImage::pool_selected(identifier)
    }

    /// Resolve an identifier that is not already in `used`.
    ///
    /// Each collision is added to the exclusion list for the next round.
    /// After `max_rounds` collisions the pool is exhausted, so one last
    /// resolution runs without exclusions and its result is returned as-is.
    pub async fn resolve_unique(
        &self,
        context: &ImageRequestContext,
        used: &ExclusionSet,
        max_rounds: u32,
    ) -> ResolvedImage {
        let mut exclude = used.to_vec();
        for round in 0..max_rounds {
            let resolved = self.resolve(context, &exclude).await;
            if !used.contains(&resolved.identifier) {
                return resolved;
            }
            tracing::debug!(round, identifier = %resolved.identifier, "Resolved image already used");
            exclude.push(resolved.identifier);
        }
        self.resolve(context, &[]).await
    }

    /// One generation attempt. `None` on any failure or when generation is off.
    async fn try_generate(&self, prompt: &str) -> Option<String> {
        if !self.generation_enabled {
            return None;
        }
        let generator = self.generator.as_ref()?;

        let span = tracing::info_span!("generate_image", generator = generator.name());
        match generator.generate(prompt).instrument(span).await {
            Ok(image) if !image.bytes.is_empty() => {
                tracing::info!(
                    generator = generator.name(),
                    mime = %image.mime_type,
                    bytes = image.bytes.len(),
                    "Generated image"
                );
                Some(image.to_data_uri())
            }
            Ok(_) => {
                tracing::warn!(generator = generator.name(), "Generator returned an empty image");
                None
            }
            Err(e) => {
                tracing::warn!(
                    generator = generator.name(),
                    error = %e,
                    "Image generation failed, falling back to pool"
                );
                None
            }
        }
    }
}
