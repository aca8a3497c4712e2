//! Shared domain types for Regen.
//!
//! This crate contains the data shapes used across the image sourcing
//! service: request contexts, resolved images, the exclusion set, the
//! fallback pool, wire DTOs, configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, serde_json, thiserror.

pub mod config;
pub mod error;
pub mod image;
