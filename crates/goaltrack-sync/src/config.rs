//! Client configuration

use goaltrack_model::Limits;
use serde::{Deserialize, Serialize};

/// Optimistic client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Input limits checked before any write
    #[serde(flatten)]
    pub limits: Limits,
    /// Refresh the mutated collection once a mutation settles
    pub refresh_after_settle: bool,
    /// Days loaded when the daily-log window is first requested
    pub log_window_days: u32,
}

impl SyncConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With input limits
    #[inline]
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// With or without the post-settle refresh
    #[inline]
    #[must_use]
    pub fn with_refresh_after_settle(mut self, enabled: bool) -> Self {
        self.refresh_after_settle = enabled;
        self
    }

    /// With daily-log window size
    #[inline]
    #[must_use]
    pub fn with_log_window_days(mut self, days: u32) -> Self {
        self.log_window_days = days.max(1);
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            refresh_after_settle: true,
            log_window_days: 7,
        }
    }
}
