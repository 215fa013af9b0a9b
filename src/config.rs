//! Tunable constants for dispatch pacing and status polling.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Schedule for one message's status-polling task.
pub struct StatusCheckConfig {
    /// Wait before the first check, giving the provider time to ingest the
    /// message.
    pub initial_delay: Duration,
    /// Interval between checks after the first.
    pub check_interval: Duration,
    /// Checks performed before giving up and applying the timeout policy.
    pub max_attempts: u32,
}

impl Default for StatusCheckConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(5000),
            check_interval: Duration::from_millis(10000),
            max_attempts: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Batch-dispatch configuration.
pub struct DispatchConfig {
    /// Country prefix every recipient must carry.
    pub country_prefix: String,
    /// Upper bound on recipients per batch.
    pub max_numbers_per_batch: usize,
    /// Pause between consecutive sends, pacing against provider rate limits.
    pub delay_between_requests: Duration,
    /// Characters per message segment.
    pub max_segment_length: usize,
    /// Segment count above which dispatch asks for cost confirmation.
    pub segment_confirmation_threshold: usize,
    /// Polling schedule for successfully sent messages.
    pub status_check: StatusCheckConfig,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            country_prefix: "+502".to_owned(),
            max_numbers_per_batch: 50,
            delay_between_requests: Duration::from_millis(500),
            max_segment_length: 160,
            segment_confirmation_threshold: 3,
            status_check: StatusCheckConfig::default(),
        }
    }
}
