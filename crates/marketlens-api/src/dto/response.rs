//! Response DTOs.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` once the networked cache has been abandoned or
    /// stops answering.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Seconds since start.
    pub uptime_seconds: u64,
    /// Cache state.
    pub cache: CacheHealth,
}

/// Cache section of the health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheHealth {
    /// `networked` or `local`.
    pub backend: String,
    /// Whether a networked failure forced the in-process fallback.
    pub degraded: bool,
    /// Whether the active backend answered a probe.
    pub healthy: bool,
}
