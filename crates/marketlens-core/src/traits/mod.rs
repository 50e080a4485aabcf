//! Core trait definitions for MarketLens.

pub mod cache;
pub mod clock;

pub use cache::CacheBackend;
pub use clock::{Clock, ManualClock, SystemClock};
