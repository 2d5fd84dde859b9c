use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level coordination engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordConfig {
    pub cache: CacheConfig,
    pub invitations: InvitationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum age of a cached result before it is treated as absent.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvitationConfig {
    /// Minimum gap between invites to the same brawler, tracked in memory
    /// only (reset on restart).
    pub cooldown_ms: u64,
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self { cooldown_ms: 3000 }
    }
}

impl InvitationConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}
