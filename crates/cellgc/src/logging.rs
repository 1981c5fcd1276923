//! GC Logging
//!
//! Structured logging for collection cycles, useful for:
//! - Watching the heap breathe under churn
//! - Debugging sizing policy decisions
//! - Driving diagnostics from a host program
//!
//! The cycle-end event carries the line a driver typically wants after every
//! collection: surviving bytes and the heap capacity they now live in.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

/// Log level for GC events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Info = 1,
    Debug = 2,
}

/// GC event types
#[derive(Debug, Clone)]
pub enum GcEvent {
    /// Collection cycle started
    CycleStart { cycle: u64, reason: &'static str },

    /// Collection cycle completed
    CycleEnd {
        cycle: u64,
        duration_ms: f64,
        live_bytes: usize,
        heap_bytes: usize,
        reclaimed_bytes: usize,
    },

    /// Heap region replaced during a cycle
    HeapResize {
        cycle: u64,
        old_capacity: usize,
        new_capacity: usize,
        moved: bool,
    },

    /// Allocation failed even after a collection
    AllocationFailure { requested: usize, available: usize },
}

/// GC logger configuration
#[derive(Debug, Clone)]
pub struct GcLoggerConfig {
    /// Minimum log level
    pub level: LogLevel,

    /// Enable console output
    pub console: bool,

    /// Emit events as JSON lines instead of human-readable text
    pub json: bool,

    /// Prefix console output with timestamps
    pub timestamps: bool,
}

impl Default for GcLoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            console: true,
            json: false,
            timestamps: false,
        }
    }
}

/// Centralized logger for GC events
pub struct GcLogger {
    config: GcLoggerConfig,
    events: Mutex<Vec<(Instant, GcEvent)>>,
    enabled: AtomicBool,
}

impl GcLogger {
    /// Create new logger
    pub fn new(config: GcLoggerConfig) -> Self {
        Self {
            config,
            events: Mutex::new(Vec::new()),
            enabled: AtomicBool::new(true),
        }
    }

    /// Enable logging
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    /// Disable logging
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Log a GC event
    pub fn log(&self, event: GcEvent) {
        if !self.is_enabled() {
            return;
        }

        if self.event_level(&event) > self.config.level {
            return;
        }

        self.events.lock().push((Instant::now(), event.clone()));

        if self.config.console {
            self.output_console(&event);
        }
    }

    fn event_level(&self, event: &GcEvent) -> LogLevel {
        match event {
            GcEvent::AllocationFailure { .. } => LogLevel::Error,
            GcEvent::CycleEnd { .. } => LogLevel::Info,
            GcEvent::CycleStart { .. } | GcEvent::HeapResize { .. } => LogLevel::Debug,
        }
    }

    fn output_console(&self, event: &GcEvent) {
        if self.config.timestamps {
            let now = chrono::Local::now();
            print!("[{}] ", now.format("%Y-%m-%d %H:%M:%S%.3f"));
        }

        if self.config.json {
            self.output_json(event);
        } else {
            self.output_human(event);
        }
    }

    fn output_human(&self, event: &GcEvent) {
        match event {
            GcEvent::CycleStart { cycle, reason } => {
                println!("[GC] cycle {} started ({})", cycle, reason);
            }
            GcEvent::CycleEnd {
                cycle,
                duration_ms,
                live_bytes,
                heap_bytes,
                reclaimed_bytes,
            } => {
                println!(
                    "[GC] cycle {}: {} bytes live, heap {} bytes, reclaimed {} ({:.2}ms)",
                    cycle, live_bytes, heap_bytes, reclaimed_bytes, duration_ms
                );
            }
            GcEvent::HeapResize {
                cycle,
                old_capacity,
                new_capacity,
                moved,
            } => {
                println!(
                    "[GC] cycle {}: heap resized {} -> {} bytes (moved: {})",
                    cycle, old_capacity, new_capacity, moved
                );
            }
            GcEvent::AllocationFailure {
                requested,
                available,
            } => {
                eprintln!(
                    "[GC] allocation failure: {} bytes requested, {} available",
                    requested, available
                );
            }
        }
    }

    fn output_json(&self, event: &GcEvent) {
        let json = match event {
            GcEvent::CycleStart { cycle, reason } => serde_json::json!({
                "type": "cycle_start",
                "cycle": cycle,
                "reason": reason,
            }),
            GcEvent::CycleEnd {
                cycle,
                duration_ms,
                live_bytes,
                heap_bytes,
                reclaimed_bytes,
            } => serde_json::json!({
                "type": "cycle_end",
                "cycle": cycle,
                "duration_ms": duration_ms,
                "live_bytes": live_bytes,
                "heap_bytes": heap_bytes,
                "reclaimed_bytes": reclaimed_bytes,
            }),
            GcEvent::HeapResize {
                cycle,
                old_capacity,
                new_capacity,
                moved,
            } => serde_json::json!({
                "type": "heap_resize",
                "cycle": cycle,
                "old_capacity": old_capacity,
                "new_capacity": new_capacity,
                "moved": moved,
            }),
            GcEvent::AllocationFailure {
                requested,
                available,
            } => serde_json::json!({
                "type": "allocation_failure",
                "requested": requested,
                "available": available,
            }),
        };

        if let Ok(line) = serde_json::to_string(&json) {
            println!("{}", line);
        }
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }

    /// Clear recorded events
    pub fn clear_events(&self) {
        self.events.lock().clear();
    }
}

impl Default for GcLogger {
    fn default() -> Self {
        Self::new(GcLoggerConfig::default())
    }
}

lazy_static::lazy_static! {
    static ref GLOBAL_LOGGER: Mutex<GcLogger> = Mutex::new(GcLogger::default());
}

/// Log a GC event to the global logger
pub fn log_event(event: GcEvent) {
    GLOBAL_LOGGER.lock().log(event);
}

/// Replace the global logger configuration
pub fn configure_logger(config: GcLoggerConfig) {
    *GLOBAL_LOGGER.lock() = GcLogger::new(config);
}

/// Get global logger event count
pub fn get_event_count() -> usize {
    GLOBAL_LOGGER.lock().event_count()
}
