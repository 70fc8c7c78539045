//! Batching configuration
//!
//! `max_batch_size` is both the flush threshold and the capacity of the
//! request queue, so a full queue always holds exactly one flushable batch.

use std::time::Duration;
use tracing::warn;

/// Default number of transfers per ledger call
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1024;

/// Largest accepted `max_batch_size`; larger requests are clamped to it
pub const MAX_BATCH_SIZE_CEILING: usize = 1 << 16;

/// Default quiet period after the last arrival before a partial batch flushes
pub const DEFAULT_MAX_BATCH_DELAY: Duration = Duration::from_millis(30);

/// Whole milliseconds in `duration`, saturating at `u64::MAX`
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Configuration for the batching engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Upper bound on items per dispatch, and the queue capacity
    pub max_batch_size: usize,

    /// Upper bound on how long an item waits for a time-triggered flush
    pub max_batch_delay: Duration,

    /// Upper bound on a single ledger call; `None` waits indefinitely
    pub ledger_timeout: Option<Duration>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_batch_delay: DEFAULT_MAX_BATCH_DELAY,
            ledger_timeout: None,
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values are not meaningful for either knob; they are replaced with
    /// the defaults and a warning is logged. A size above
    /// `MAX_BATCH_SIZE_CEILING` is clamped to it, also with a warning.
    pub fn new(max_batch_size: usize, max_batch_delay: Duration) -> Self {
        let default = Self::default();

        let max_batch_size = if max_batch_size == 0 {
            warn!(
                requested = max_batch_size,
                fallback = default.max_batch_size,
                "Invalid max_batch_size, using default"
            );
            default.max_batch_size
        } else if max_batch_size > MAX_BATCH_SIZE_CEILING {
            warn!(
                requested = max_batch_size,
                ceiling = MAX_BATCH_SIZE_CEILING,
                "max_batch_size above ceiling, clamping"
            );
            MAX_BATCH_SIZE_CEILING
        } else {
            max_batch_size
        };

        let max_batch_delay = if max_batch_delay.is_zero() {
            warn!(
                fallback_ms = millis(default.max_batch_delay),
                "Invalid max_batch_delay (0), using default"
            );
            default.max_batch_delay
        } else {
            max_batch_delay
        };

        Self {
            max_batch_size,
            max_batch_delay,
            ledger_timeout: None,
        }
    }

    /// Bound every ledger call by `timeout`
    pub fn with_ledger_timeout(mut self, timeout: Duration) -> Self {
        self.ledger_timeout = Some(timeout);
        self
    }
}
