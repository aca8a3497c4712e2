//! Gemini `generateContent` adapters.
//!
//! One shared [`client::GeminiClient`] carries the HTTP client and API key;
//! [`image::GeminiImageGenerator`] and [`ranker::GeminiRanker`] build their
//! own request bodies on top of it.

pub mod client;
pub mod image;
pub mod ranker;
pub mod types;
