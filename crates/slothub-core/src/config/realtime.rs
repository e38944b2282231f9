//! Event broadcast configuration.

use serde::{Deserialize, Serialize};

/// Real-time fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Per-subscriber buffer. Events beyond it are dropped for that
    /// subscriber only.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}
