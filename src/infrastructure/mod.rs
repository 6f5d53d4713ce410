//! Infrastructure Layer
//!
//! Cross-cutting components used by the application layer.

pub mod handle_pool;

pub use handle_pool::{HandlePool, PoolConfig, PoolStats};
