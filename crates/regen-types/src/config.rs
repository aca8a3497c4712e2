//! Configuration types for Regen.
//!
//! `RegenConfig` represents the top-level `config.toml` that controls image
//! generation, the fallback pool, exclusion persistence, and request retries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::image::{DEFAULT_EXCLUSION_CAPACITY, DEFAULT_POOL, ImagePool};

/// Namespaced key under which the used-image list is persisted.
pub const USED_IMAGES_KEY: &str = "regen_used_image_urls";

/// Top-level configuration for Regen.
///
/// Loaded from `~/.regen/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegenConfig {
    #[serde(default)]
    pub image: ImageConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl RegenConfig {
    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.image.pool()?;
        if self.store.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.orchestrator.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        Ok(())
    }
}

/// `[image]` -- generation and fallback selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Attempt real image generation before falling back to the pool.
    #[serde(default = "default_true")]
    pub enable_generation: bool,

    /// Fallback pool, in order. The first entry doubles as the last-resort default.
    #[serde(default = "default_pool")]
    pub pool: Vec<String>,

    /// Model used for image synthesis.
    #[serde(default = "default_generation_model")]
    pub generation_model: String,

    /// Model used to rank pool candidates.
    #[serde(default = "default_ranking_model")]
    pub ranking_model: String,

    /// Base URL of the generative API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Transport timeout for generation and ranking calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ImageConfig {
    pub fn pool(&self) -> Result<ImagePool, ConfigError> {
        ImagePool::new(&self.pool)
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enable_generation: true,
            pool: default_pool(),
            generation_model: default_generation_model(),
            ranking_model: default_ranking_model(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Persistence backend for the used-image list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process lifetime only.
    Memory,
    /// JSON document in the data directory.
    #[default]
    File,
    /// SQLite database in the data directory.
    Sqlite,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::File => write!(f, "file"),
            StoreBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "file" => Ok(StoreBackend::File),
            "sqlite" => Ok(StoreBackend::Sqlite),
            other => Err(format!("invalid store backend: '{other}'")),
        }
    }
}

/// `[store]` -- where and how many used identifiers are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default = "default_capacity")]
    pub capacity: usize,

    #[serde(default = "default_store_key")]
    pub key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            capacity: default_capacity(),
            key: default_store_key(),
        }
    }
}

/// `[orchestrator]` -- client-side request behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Total attempts per request, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Hold a lock across read-resolve-record so concurrent requests never
    /// observe the same exclusion snapshot.
    #[serde(default)]
    pub serialize_requests: bool,

    /// Base URL of the resolution server.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            serialize_requests: false,
            endpoint: default_endpoint(),
        }
    }
}

/// `[server]` -- HTTP listener defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_pool() -> Vec<String> {
    DEFAULT_POOL.iter().map(|s| s.to_string()).collect()
}

fn default_generation_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

fn default_ranking_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_capacity() -> usize {
    DEFAULT_EXCLUSION_CAPACITY
}

fn default_store_key() -> String {
    USED_IMAGES_KEY.to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_endpoint() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}
