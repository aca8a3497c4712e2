//! Application state wiring all services together.
//!
//! AppState holds the concrete instances used by both CLI and HTTP server.
//! Core types are generic over collaborator/storage traits; AppState pins
//! them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use regen_core::background::BackgroundCatalog;
use regen_core::resolver::ImageResolver;
use regen_core::storage::box_kv::BoxKvStore;
use regen_core::storage::used_images::UsedImageStore;
use regen_infra::config::load_config;
use regen_infra::filesystem::resolve_data_dir;
use regen_infra::gemini::client::GeminiClient;
use regen_infra::gemini::image::GeminiImageGenerator;
use regen_infra::gemini::ranker::GeminiRanker;
use regen_infra::kv::open_kv_store;
use regen_infra::secret::env::EnvSecretProvider;
use regen_types::config::{ImageConfig, RegenConfig};

/// Resolver pinned to the Gemini adapters.
pub type ConcreteResolver = ImageResolver<GeminiImageGenerator, GeminiRanker>;

/// Shared application state.
///
/// The used image store is constructed once here and handed out by `Arc`,
/// so every consumer in the process shares one exclusion list.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RegenConfig>,
    pub resolver: Arc<ConcreteResolver>,
    pub used_images: Arc<UsedImageStore<BoxKvStore>>,
    pub backgrounds: Arc<BackgroundCatalog>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize from the data directory, `config.toml`, and the environment.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_config(&data_dir).await;
        let api_key = EnvSecretProvider::new().gemini_api_key();
        Self::from_config(config, data_dir, api_key).await
    }

    /// Wire services from an explicit configuration.
    pub async fn from_config(
        config: RegenConfig,
        data_dir: PathBuf,
        api_key: Option<SecretString>,
    ) -> anyhow::Result<Self> {
        config.validate()?;

        let resolver = build_resolver(&config.image, api_key)?;
        tracing::info!(
            generation = resolver.generation_active(),
            ranking = resolver.ranking_active(),
            pool = resolver.pool().len(),
            "Image resolver ready"
        );

        let kv = open_kv_store(&config.store, &data_dir).await?;
        let used_images =
            UsedImageStore::open(kv, config.store.key.clone(), config.store.capacity).await;

        Ok(Self {
            config: Arc::new(config),
            resolver: Arc::new(resolver),
            used_images: Arc::new(used_images),
            backgrounds: Arc::new(BackgroundCatalog::new()),
            data_dir,
        })
    }
}

/// Build the resolver. Without a credential both collaborators are absent:
/// pool selection falls back to hashing and generation is skipped.
fn build_resolver(
    config: &ImageConfig,
    api_key: Option<SecretString>,
) -> anyhow::Result<ConcreteResolver> {
    let pool = config.pool()?;

    let Some(api_key) = api_key else {
        return Ok(ImageResolver::new(pool, None, None));
    };

    let client = Arc::new(
        GeminiClient::new(api_key, Duration::from_secs(config.request_timeout_secs))?
            .with_base_url(&config.api_base_url),
    );
    let generator = GeminiImageGenerator::new(client.clone(), &config.generation_model);
    let ranker = GeminiRanker::new(client, &config.ranking_model);

    Ok(ImageResolver::new(pool, Some(generator), Some(ranker))
        .with_generation_enabled(config.enable_generation))
}
