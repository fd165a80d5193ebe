// Session metrics
//
// Lightweight counters for what a session did, logged on shutdown

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Per-session operation counters
///
/// Uses atomic operations so a shared reference is enough to record.
#[derive(Debug)]
pub struct Metrics {
    /// Increments applied to any channel
    pub increments: AtomicU64,

    /// Resets applied to any channel
    pub resets: AtomicU64,

    /// Increments that moved a channel into qf
    pub targets_reached: AtomicU64,

    /// Successful saves of the record
    pub saves: AtomicU64,

    /// Failed saves of the record
    pub save_failures: AtomicU64,

    /// Operations rejected for naming an unknown channel
    pub invalid_channel_requests: AtomicU64,

    /// Session start time
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            increments: AtomicU64::new(0),
            resets: AtomicU64::new(0),
            targets_reached: AtomicU64::new(0),
            saves: AtomicU64::new(0),
            save_failures: AtomicU64::new(0),
            invalid_channel_requests: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_increment(&self, reached_target: bool) {
        self.increments.fetch_add(1, Ordering::Relaxed);
        if reached_target {
            self.targets_reached.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_reset(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_save(&self) {
        self.saves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_save_failure(&self) {
        self.save_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid_channel(&self) {
        self.invalid_channel_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments plus resets applied so far
    pub fn mutations(&self) -> u64 {
        self.increments.load(Ordering::Relaxed) + self.resets.load(Ordering::Relaxed)
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Session Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Channels: {} increments, {} resets, {} targets reached",
            self.increments.load(Ordering::Relaxed),
            self.resets.load(Ordering::Relaxed),
            self.targets_reached.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Saves: {} ok, {} failed; invalid channel requests: {}",
            self.saves.load(Ordering::Relaxed),
            self.save_failures.load(Ordering::Relaxed),
            self.invalid_channel_requests.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
