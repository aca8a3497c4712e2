//! HTTP layer for Regen.
//!
//! Axum-based JSON API: image resolution, static weather backgrounds, and a
//! health probe, with CORS and request tracing.

pub mod handlers;
pub mod router;
