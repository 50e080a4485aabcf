//! In-process cache backend.

pub mod store;

pub use store::MemoryCacheBackend;
