//! Delivery rate for video frame subscriptions

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delivery rate for video frame subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpdateRate {
    /// Every frame as soon as it completes
    #[default]
    Native,

    /// At most this many frames per second, latest frame wins.
    /// `Max(0)` is treated as `Native`.
    Max(u32),
}

impl UpdateRate {
    /// Interval between deliveries, or `None` when no throttling applies
    pub fn throttle_interval(self) -> Option<Duration> {
        match self {
            UpdateRate::Native | UpdateRate::Max(0) => None,
            UpdateRate::Max(hz) => Some(Duration::from_secs_f64(1.0 / hz as f64)),
        }
    }
}
