//! Core configuration for carbonviz-engine-core.

use serde::{Deserialize, Serialize};

use crate::transition::Timing;

/// Configuration for scheduler sizing and default timings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Timing used when a chart does not pick one per change.
    pub default_timing: Timing,

    /// Initial capacity hint for handle and element maps.
    pub expected_elements: usize,

    /// Soft cap on events per update. Only the oldest `Started` events are dropped to
    /// meet it; lifecycle events are always kept.
    pub max_events_per_tick: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_timing: Timing::new(500.0, 0.0),
            expected_elements: 64,
            max_events_per_tick: 1024,
        }
    }
}
