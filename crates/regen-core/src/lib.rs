//! Business logic and port trait definitions for Regen.
//!
//! This crate defines the "ports" (collaborator and storage traits) that the
//! infrastructure layer implements. It depends only on `regen-types` --
//! never on `regen-infra` or any network/database crate.

pub mod background;
pub mod orchestrator;
pub mod pool;
pub mod prompt;
pub mod provider;
pub mod resolver;
pub mod retry;
pub mod storage;

#[cfg(test)]
mod testing;
