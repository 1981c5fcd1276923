//! Collector Module - Sliding Mark-Compact Cycle
//!
//! One collection is a stop-the-world transaction over four phases:
//!
//! 1. **Mark** - walk the object graph from the root stack, stamping every
//!    reachable cell's forwarding word ([`mark`]).
//! 2. **Plan** - sweep the heap once, replacing each mark with the address
//!    the cell will occupy after compaction ([`relocate::plan_addresses`]).
//! 3. **Resize** - adaptive variant only: replace the heap region with one
//!    sized to the survivors plus headroom. The region moves; every address
//!    recorded so far keeps its meaning only as an offset from the old base.
//! 4. **Fix up and slide** - rewrite every reference (pair fields and root
//!    slots) through the forwarding words, then slide the survivors down
//!    into a contiguous prefix and clear their forwarding words
//!    ([`relocate::update_references`], [`relocate::slide`]).
//!
//! Reference rewriting must complete before the slide: the slide consumes
//! the same forwarding words the fix-up reads, clearing them as it goes.

mod mark;
mod relocate;

use crate::config::{GcConfig, HeapVariant};
use crate::error::Result;
use crate::heap::Heap;
use crate::logging::{self, GcEvent};
use crate::object::CELL_SIZE;
use crate::roots::RootStack;
use crate::stats::GcTimer;

/// Why a collection cycle was entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcReason {
    /// Allocation found the heap exhausted
    Exhausted,
    /// The host requested a collection
    Explicit,
}

impl GcReason {
    pub fn as_str(self) -> &'static str {
        match self {
            GcReason::Exhausted => "heap exhausted",
            GcReason::Explicit => "explicit request",
        }
    }
}

/// What a finished cycle left behind
#[derive(Debug, Clone, Copy)]
pub(crate) struct CollectionOutcome {
    /// Bytes occupied by survivors, now a contiguous prefix of the heap
    pub live_bytes: usize,
    /// Bytes of garbage reclaimed this cycle
    pub reclaimed_bytes: usize,
}

/// One collection cycle over a runtime's heap and root stack.
///
/// Borrows the runtime's parts for the duration of the cycle; the mutator
/// cannot run until `run` returns.
pub(crate) struct Collector<'rt> {
    heap: &'rt mut Heap,
    roots: &'rt mut RootStack,
    config: &'rt GcConfig,
    cycle: u64,
}

impl<'rt> Collector<'rt> {
    pub(crate) fn new(
        heap: &'rt mut Heap,
        roots: &'rt mut RootStack,
        config: &'rt GcConfig,
        cycle: u64,
    ) -> Self {
        Self {
            heap,
            roots,
            config,
            cycle,
        }
    }

    /// Run the cycle to completion.
    ///
    /// `additional_bytes` is the headroom the triggering allocation needs;
    /// the adaptive variant folds it into the new capacity so the retry can
    /// succeed. Fails only if the adaptive resize cannot map a new region,
    /// in which case the heap is left in its pre-resize state.
    pub(crate) fn run(
        &mut self,
        additional_bytes: usize,
        reason: GcReason,
    ) -> Result<CollectionOutcome> {
        let timer = GcTimer::new();
        let used_before = self.heap.live_bytes();

        if self.config.verbose {
            logging::log_event(GcEvent::CycleStart {
                cycle: self.cycle,
                reason: reason.as_str(),
            });
        }

        let marked = mark::mark_from_roots(self.roots);
        log::debug!("cycle {}: marked {} cells", self.cycle, marked);

        let plan = relocate::plan_addresses(self.heap);
        debug_assert_eq!(plan.live_bytes, marked * CELL_SIZE);

        // Addresses in forwarding words and root slots are relative to this
        // base from here on, whether or not the region moves.
        let old_base = self.heap.base();

        if self.config.variant == HeapVariant::Adaptive {
            self.resize(&plan, additional_bytes)?;
        }

        relocate::update_references(self.heap, self.roots, old_base);
        relocate::slide(self.heap, old_base);
        self.heap.set_live_bytes(plan.live_bytes);

        let reclaimed_bytes = used_before - plan.live_bytes;
        log::debug!(
            "cycle {}: {} bytes live, {} reclaimed",
            self.cycle,
            plan.live_bytes,
            reclaimed_bytes
        );

        if self.config.verbose {
            logging::log_event(GcEvent::CycleEnd {
                cycle: self.cycle,
                duration_ms: timer.elapsed_ms(),
                live_bytes: plan.live_bytes,
                heap_bytes: self.heap.capacity(),
                reclaimed_bytes,
            });
        }

        Ok(CollectionOutcome {
            live_bytes: plan.live_bytes,
            reclaimed_bytes,
        })
    }

    /// Phase 3: replace the heap region with one sized to the survivors.
    ///
    /// Capacity policy: `live_bytes * headroom + additional`, floored at the
    /// configured minimum. The capacity is additionally floored at the end
    /// of the highest live cell: reallocation only preserves a prefix of the
    /// old region, and the survivors have not slid down yet.
    fn resize(&mut self, plan: &relocate::RelocationPlan, additional_bytes: usize) -> Result<()> {
        let target = (plan.live_bytes as f64 * self.config.heap_headroom).round() as usize
            + additional_bytes;
        let new_capacity = target.max(self.config.heap_min).max(plan.preserved_bytes);

        let old_capacity = self.heap.capacity();
        let old_base = self.heap.base();
        self.heap.reallocate(new_capacity)?;
        let moved = self.heap.base() != old_base;

        log::debug!(
            "cycle {}: heap {} -> {} bytes (moved: {})",
            self.cycle,
            old_capacity,
            new_capacity,
            moved
        );

        if self.config.verbose {
            logging::log_event(GcEvent::HeapResize {
                cycle: self.cycle,
                old_capacity,
                new_capacity,
                moved,
            });
        }

        Ok(())
    }
}
