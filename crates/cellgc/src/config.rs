//! Configuration Module - Runtime Tuning Parameters
//!
//! Manages all configuration parameters for the runtime: heap variant and
//! sizing, root stack capacity, and diagnostics. Most parameters have
//! sensible defaults; `validate()` rejects combinations the collector cannot
//! operate under.

use crate::object::CELL_SIZE;

/// Maximum number of references the root stack can hold
pub const STACK_MAX: usize = 256;

/// Smallest heap capacity the adaptive variant will shrink to.
///
/// One cell: the minimum must always hold at least one allocation.
pub const HEAP_MIN: usize = CELL_SIZE;

/// Headroom factor applied to the surviving bytes when the adaptive variant
/// resizes the heap after a collection
pub const HEAP_HEADROOM: f64 = 1.5;

/// Capacity of the fixed variant's heap
pub const FIXED_HEAP_SIZE: usize = 1024 * 1024;

/// Heap sizing variant
///
/// The two variants share every phase of the collector except resizing:
/// the adaptive variant replaces (and thereby relocates) the whole heap
/// region between address planning and the slide, while the fixed variant
/// keeps the region where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapVariant {
    /// Heap stays at `fixed_heap_size` for the lifetime of the runtime
    Fixed,
    /// Heap is reallocated after every collection to
    /// `live_bytes * heap_headroom + additional`, floored at `heap_min`
    Adaptive,
}

/// Main configuration for the cell runtime
///
/// # Examples
///
/// ```rust
/// use cellgc::{GcConfig, HeapVariant};
///
/// // Default: adaptive heap starting at the minimum capacity
/// let config = GcConfig::default();
/// assert_eq!(config.variant, HeapVariant::Adaptive);
///
/// // Fixed 1 MiB heap
/// let config = GcConfig::fixed();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct GcConfig {
    /// Heap sizing variant
    pub variant: HeapVariant,

    /// Heap capacity in bytes for the fixed variant
    ///
    /// Ignored by the adaptive variant. Default: 1 MiB.
    pub fixed_heap_size: usize,

    /// Lower bound for the adaptive variant's capacity
    ///
    /// The heap never shrinks below this, and the initial heap is exactly
    /// this size. Must hold at least one cell. Default: one cell.
    pub heap_min: usize,

    /// Headroom factor for the adaptive variant
    ///
    /// After a collection the heap is sized to
    /// `live_bytes * heap_headroom + additional`. Must be >= 1.0.
    /// Default: 1.5.
    pub heap_headroom: f64,

    /// Root stack capacity in slots. Default: 256.
    pub stack_max: usize,

    /// Emit a log line after every collection with the surviving bytes and
    /// the heap capacity. Default: false.
    pub verbose: bool,

    /// Record per-cycle statistics. Default: true.
    pub stats_enabled: bool,
}

impl Default for GcConfig {
    fn default() -> Self {
        GcConfig {
            variant: HeapVariant::Adaptive,
            fixed_heap_size: FIXED_HEAP_SIZE,
            heap_min: HEAP_MIN,
            heap_headroom: HEAP_HEADROOM,
            stack_max: STACK_MAX,
            verbose: false,
            stats_enabled: true,
        }
    }
}

impl GcConfig {
    /// Configuration for the fixed-heap variant
    pub fn fixed() -> Self {
        GcConfig {
            variant: HeapVariant::Fixed,
            ..Default::default()
        }
    }

    /// Validate configuration
    ///
    /// Checks that every value is in a range the collector can operate
    /// under.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cellgc::GcConfig;
    ///
    /// let config = GcConfig {
    ///     stack_max: 0, // invalid
    ///     ..Default::default()
    /// };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fixed_heap_size < CELL_SIZE {
            return Err(ConfigError::InvalidHeapSize(format!(
                "fixed_heap_size must hold at least one {}-byte cell",
                CELL_SIZE
            )));
        }

        if self.heap_min < CELL_SIZE {
            return Err(ConfigError::InvalidHeapSize(format!(
                "heap_min must hold at least one {}-byte cell",
                CELL_SIZE
            )));
        }

        if !self.heap_headroom.is_finite() || self.heap_headroom < 1.0 {
            return Err(ConfigError::InvalidHeadroom(
                "heap_headroom must be a finite factor >= 1.0".to_string(),
            ));
        }

        if self.stack_max == 0 {
            return Err(ConfigError::InvalidStackSize(
                "stack_max must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Build configuration from environment variables
    ///
    /// Overrides defaults with environment variables:
    /// - CELLGC_VARIANT (`fixed` or `adaptive`)
    /// - CELLGC_HEAP_SIZE (fixed variant capacity, bytes)
    /// - CELLGC_HEAP_MIN
    /// - CELLGC_HEADROOM
    /// - CELLGC_STACK_MAX
    /// - CELLGC_VERBOSE
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CELLGC_VARIANT") {
            if val.eq_ignore_ascii_case("fixed") {
                config.variant = HeapVariant::Fixed;
            } else if val.eq_ignore_ascii_case("adaptive") {
                config.variant = HeapVariant::Adaptive;
            }
        }

        if let Ok(val) = std::env::var("CELLGC_HEAP_SIZE") {
            if let Ok(size) = val.parse::<usize>() {
                config.fixed_heap_size = size;
            }
        }

        if let Ok(val) = std::env::var("CELLGC_HEAP_MIN") {
            if let Ok(size) = val.parse::<usize>() {
                config.heap_min = size;
            }
        }

        if let Ok(val) = std::env::var("CELLGC_HEADROOM") {
            if let Ok(factor) = val.parse::<f64>() {
                config.heap_headroom = factor;
            }
        }

        if let Ok(val) = std::env::var("CELLGC_STACK_MAX") {
            if let Ok(slots) = val.parse::<usize>() {
                config.stack_max = slots;
            }
        }

        if let Ok(val) = std::env::var("CELLGC_VERBOSE") {
            config.verbose = val == "1" || val.eq_ignore_ascii_case("true");
        }

        config
    }

    /// Capacity the heap starts out with under this configuration
    pub fn initial_capacity(&self) -> usize {
        match self.variant {
            HeapVariant::Fixed => self.fixed_heap_size,
            HeapVariant::Adaptive => self.heap_min,
        }
    }
}

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid heap size: {0}")]
    InvalidHeapSize(String),

    #[error("invalid headroom: {0}")]
    InvalidHeadroom(String),

    #[error("invalid stack size: {0}")]
    InvalidStackSize(String),
}
