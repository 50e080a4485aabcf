//! # marketlens-cache
//!
//! Read-through cache for MarketLens. Two backends:
//!
//! - **redis**: networked store using the [redis](https://crates.io/crates/redis) crate
//! - **memory**: process-local map with lazy expiry, always available
//!
//! [`CacheManager`] starts on Redis when a connection string is configured and
//! falls back to memory, permanently, the first time Redis misbehaves.

pub mod keys;
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use memory::MemoryCacheBackend;
pub use provider::{BackendKind, CacheManager, CacheRead, CacheWrite};
