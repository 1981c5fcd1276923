//! Stats Module - Collection Accounting
//!
//! Per-runtime counters for collection cycles: how many ran, why, how long
//! they paused the mutator, and how much storage they reclaimed. The runtime
//! is single-threaded, so the counters are plain fields updated between
//! mutator operations.

use std::time::Duration;

/// Statistics collector for a runtime instance
#[derive(Debug, Default)]
pub struct GcStats {
    /// Total collection cycles
    total_cycles: u64,
    /// Cycles triggered by an exhausted heap
    exhaustion_cycles: u64,
    /// Cycles requested explicitly
    explicit_cycles: u64,
    /// Bytes reclaimed across all cycles
    total_reclaimed_bytes: u64,
    /// Total time spent inside the collector
    total_pause: Duration,
    /// Longest single cycle
    max_pause: Duration,
    /// Surviving bytes after the most recent cycle
    last_live_bytes: usize,
}

impl GcStats {
    /// Create new stats collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished collection cycle
    pub fn record_collection(
        &mut self,
        explicit: bool,
        duration: Duration,
        reclaimed_bytes: usize,
        live_bytes: usize,
    ) {
        self.total_cycles += 1;
        if explicit {
            self.explicit_cycles += 1;
        } else {
            self.exhaustion_cycles += 1;
        }
        self.total_reclaimed_bytes += reclaimed_bytes as u64;
        self.total_pause += duration;
        if duration > self.max_pause {
            self.max_pause = duration;
        }
        self.last_live_bytes = live_bytes;
    }

    /// Total collection cycles
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Cycles triggered by heap exhaustion
    pub fn exhaustion_cycles(&self) -> u64 {
        self.exhaustion_cycles
    }

    /// Cycles requested explicitly
    pub fn explicit_cycles(&self) -> u64 {
        self.explicit_cycles
    }

    /// Bytes reclaimed across all cycles
    pub fn total_reclaimed_bytes(&self) -> u64 {
        self.total_reclaimed_bytes
    }

    /// Total time spent collecting
    pub fn total_pause(&self) -> Duration {
        self.total_pause
    }

    /// Longest single pause
    pub fn max_pause(&self) -> Duration {
        self.max_pause
    }

    /// Surviving bytes after the most recent cycle
    pub fn last_live_bytes(&self) -> usize {
        self.last_live_bytes
    }
}

/// Timer for measuring collection phases
pub struct GcTimer {
    start: std::time::Instant,
}

impl GcTimer {
    /// Start a new timer
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Elapsed time since the timer started
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed milliseconds as a float
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for GcTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collections_accumulate() {
        let mut stats = GcStats::new();
        stats.record_collection(false, Duration::from_micros(50), 128, 64);
        stats.record_collection(true, Duration::from_micros(150), 0, 64);

        assert_eq!(stats.total_cycles(), 2);
        assert_eq!(stats.exhaustion_cycles(), 1);
        assert_eq!(stats.explicit_cycles(), 1);
        assert_eq!(stats.total_reclaimed_bytes(), 128);
        assert_eq!(stats.max_pause(), Duration::from_micros(150));
        assert_eq!(stats.last_live_bytes(), 64);
    }
}
