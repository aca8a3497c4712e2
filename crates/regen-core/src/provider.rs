//! Generative collaborator traits.
//!
//! The resolver talks to two optional, best-effort collaborators: an image
//! generator and a pool ranker. Both use native async fn in traits (RPITIT,
//! Rust 2024 edition). Implementations live in regen-infra.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use regen_types::error::ImageError;

/// Mime type assumed when a provider does not report one.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Raw image returned by a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl GeneratedImage {
    /// Encode the image as a `data:` URI, the identifier used for generated images.
    pub fn to_data_uri(&self) -> String {
        let mime = if self.mime_type.trim().is_empty() {
            DEFAULT_IMAGE_MIME
        } else {
            self.mime_type.trim()
        };
        format!("data:{mime};base64,{}", STANDARD.encode(&self.bytes))
    }
}

/// Trait for image synthesis backends.
pub trait ImageGenerator: Send + Sync {
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Synthesize one image for `prompt`.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<GeneratedImage, ImageError>> + Send;
}

/// Trait for backends that pick one of `candidate_count` pool variants.
pub trait ImageRanker: Send + Sync {
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Ask for an index in `0..candidate_count`.
    ///
    /// Returns the raw reply text; interpretation (parsing, clamping) is the
    /// caller's job because remote models do not always answer with a bare
    /// number.
    fn choose(
        &self,
        prompt: &str,
        candidate_count: usize,
    ) -> impl std::future::Future<Output = Result<String, ImageError>> + Send;
}
