//! SQLite storage layer.
//!
//! Key-value backend over SQLite with WAL mode and split read/write
//! connection pools.

pub mod kv;
pub mod pool;
