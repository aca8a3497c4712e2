//! Infrastructure layer for Regen.
//!
//! Contains implementations of the port traits defined in `regen-core`:
//! the Gemini image generator and ranker, key-value backends (memory, JSON
//! file, SQLite), the HTTP resolution client, and configuration loading.

pub mod config;
pub mod filesystem;
pub mod gemini;
pub mod http_client;
pub mod kv;
pub mod secret;
pub mod sqlite;
