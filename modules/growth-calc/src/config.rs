//! Module configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the growth calculation module.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthCalcConfig {
    /// Minimum spacing between streamed step events, in milliseconds.
    pub step_interval_ms: u64,
    /// Capacity of the engine-to-client event channel.
    pub stream_buffer: usize,
    /// Default `limit` for `GET /api/calculations`.
    pub recent_calculations_limit: u64,
    /// Default `limit` for `GET /api/events`.
    pub recent_events_limit: u64,
}

impl Default for GrowthCalcConfig {
    fn default() -> Self {
        Self {
            step_interval_ms: 1_000,
            stream_buffer: 16,
            recent_calculations_limit: 10,
            recent_events_limit: 50,
        }
    }
}

impl GrowthCalcConfig {
    #[must_use]
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }
}
