//! Reservation lease configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lease lifetime and commit bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseConfig {
    /// How long an unconfirmed hold lives before it is released.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Upper bound on the durable write performed by a commit.
    #[serde(default = "default_persist_timeout")]
    pub persist_timeout_seconds: u64,
}

impl LeaseConfig {
    /// Lease TTL as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Persistence bound as a [`Duration`].
    pub fn persist_timeout(&self) -> Duration {
        Duration::from_secs(self.persist_timeout_seconds)
    }
}

impl Default for LeaseConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            persist_timeout_seconds: default_persist_timeout(),
        }
    }
}

fn default_ttl() -> u64 {
    10
}

fn default_persist_timeout() -> u64 {
    5
}
