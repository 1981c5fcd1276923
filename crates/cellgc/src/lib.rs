//! # cellgc - Sliding Mark-Compact Collection over a Cell Heap
//!
//! `cellgc` is a small single-threaded runtime built around one idea: a
//! contiguous heap of fixed-size cells, compacted in place by a sliding
//! mark-compact collector. The object model is deliberately minimal - boxed
//! integers and pairs - because the interesting machinery is the collector,
//! not the objects.
//!
//! ## Collection cycle
//!
//! A collection is a stop-the-world transaction in four phases:
//!
//! 1. **Mark** - walk the graph from the root stack, stamping reachable
//!    cells through their forwarding words.
//! 2. **Plan** - sweep the heap once, assigning every survivor the address
//!    it will occupy after compaction.
//! 3. **Resize** (adaptive variant) - replace the heap region with one
//!    sized to the survivors plus headroom. The region moves in memory;
//!    every planned address and root reference is now meaningful only as an
//!    offset from the old base.
//! 4. **Fix up and slide** - rewrite pair fields and root slots through the
//!    forwarding words (rebasing against the moved region), then slide the
//!    survivors down into a contiguous prefix.
//!
//! The fixed variant skips phase 3 and collects within a region of constant
//! capacity; both variants share everything else.
//!
//! ## Quick start
//!
//! ```rust
//! let mut rt = cellgc::init()?;
//!
//! rt.push_int(1)?;
//! rt.push_int(2)?;
//! rt.push_pair()?;
//!
//! rt.gc(0)?;
//! assert_eq!(rt.live_count(), 3); // the pair and both integers survive
//!
//! rt.pop()?;
//! rt.gc(0)?;
//! assert_eq!(rt.live_count(), 0);
//! # Ok::<(), cellgc::GcError>(())
//! ```
//!
//! ## Modules
//!
//! - [`config`]: runtime configuration and tuning constants
//! - [`error`]: error types for all runtime operations
//! - [`heap`]: the contiguous cell region and bump frontier
//! - [`logging`]: structured logging of collection cycles
//! - [`memory`]: low-level memory operations
//! - [`object`]: cell encoding and forwarding-word access
//! - [`roots`]: the bounded root stack
//! - [`runtime`]: the mutator surface
//! - [`stats`]: collection statistics
//!
//! ## Limitations
//!
//! - One mutator, one collector: nothing here is thread-safe, and a
//!   collection runs to completion before the mutator continues.
//! - No generations, no increments, no weak references or finalizers.

pub mod config;
pub mod error;
pub mod heap;
pub mod logging;
pub mod memory;
pub mod object;
pub mod roots;
pub mod runtime;
pub mod stats;
pub mod util;

mod collector;

pub use config::{GcConfig, HeapVariant, FIXED_HEAP_SIZE, HEAP_HEADROOM, HEAP_MIN, STACK_MAX};
pub use error::{GcError, Result};
pub use object::{Cell, CellKind, CELL_SIZE};
pub use roots::RootStack;
pub use runtime::Runtime;
pub use stats::GcStats;

/// Crate version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Create a runtime with the default (adaptive-heap) configuration
///
/// # Examples
///
/// ```rust
/// let mut rt = cellgc::init()?;
/// rt.push_int(42)?;
/// assert_eq!(rt.live_count(), 1);
/// # Ok::<(), cellgc::GcError>(())
/// ```
pub fn init() -> Result<Runtime> {
    Runtime::new(GcConfig::default())
}

/// Create a runtime with a custom configuration
///
/// # Examples
///
/// ```rust
/// use cellgc::GcConfig;
///
/// let rt = cellgc::init_with_config(GcConfig::fixed())?;
/// assert_eq!(rt.heap_capacity(), cellgc::FIXED_HEAP_SIZE);
/// # Ok::<(), cellgc::GcError>(())
/// ```
pub fn init_with_config(config: GcConfig) -> Result<Runtime> {
    Runtime::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_builds_an_adaptive_runtime() {
        let rt = init().unwrap();
        assert_eq!(rt.heap_capacity(), HEAP_MIN);
        assert_eq!(rt.live_count(), 0);
    }

    #[test]
    fn version_not_empty() {
        assert!(!VERSION.is_empty());
    }
}
