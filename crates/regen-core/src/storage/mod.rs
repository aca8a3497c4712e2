//! Storage abstractions for Regen.
//!
//! Defines the pluggable key-value persistence trait, its type-erased
//! wrapper, and the used-image store built on top of it.
//! Backend implementations live in regen-infra.

pub mod box_kv;
pub mod kv_store;
pub mod used_images;
