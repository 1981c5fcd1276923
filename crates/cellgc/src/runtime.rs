//! Runtime - Mutator Surface over Heap, Roots, and Collector
//!
//! A `Runtime` owns one heap, one root stack, and the statistics for the
//! collections that ran over them. The mutator builds graphs through the
//! stack: `push_int` boxes an integer, `push_pair` links the two top values
//! into a fresh pair, and `set_head`/`set_tail` rewire existing pairs (which
//! is how cyclic graphs are made).
//!
//! Allocation triggers a collection when the heap is exhausted and retries
//! once; only if the retry still finds no room does it report `OutOfMemory`.
//! Dropping the runtime releases the heap region and then the instance.

use std::collections::HashMap;
use std::fmt::Write as _;

use indexmap::IndexMap;

use crate::collector::{Collector, GcReason};
use crate::config::GcConfig;
use crate::error::{GcError, Result};
use crate::heap::Heap;
use crate::logging::{self, GcEvent};
use crate::object::{Cell, CellKind, CELL_SIZE, FORWARDING_NONE};
use crate::roots::RootStack;
use crate::stats::{GcStats, GcTimer};
use crate::util;

/// A single-threaded cell runtime with a compacting collector
pub struct Runtime {
    // Field order is drop order: the heap region goes first.
    heap: Heap,
    roots: RootStack,
    config: GcConfig,
    stats: GcStats,
    cycles: u64,
}

impl Runtime {
    /// Create a runtime with the given configuration
    ///
    /// The heap starts empty at the configuration's initial capacity; the
    /// root stack starts empty.
    pub fn new(config: GcConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| GcError::Configuration(e.to_string()))?;

        let heap = Heap::new(config.initial_capacity())?;
        let roots = RootStack::new(config.stack_max);

        Ok(Self {
            heap,
            roots,
            config,
            stats: GcStats::new(),
            cycles: 0,
        })
    }

    /// Box `value` as an integer cell and push it onto the root stack
    pub fn push_int(&mut self, value: i64) -> Result<usize> {
        let addr = self.allocate(CellKind::Int(value))?;
        self.roots.push(addr)?;
        Ok(addr)
    }

    /// Pop tail then head off the root stack, link them into a fresh pair,
    /// and push the pair.
    ///
    /// The pair is allocated *before* the pops. That order is a correctness
    /// contract, not a style choice: if the allocation triggers a
    /// collection, both children are still on the root stack and survive it.
    pub fn push_pair(&mut self) -> Result<usize> {
        // Placeholder fields; overwritten below before any collection can run.
        let pair = self.allocate(CellKind::Pair { head: 0, tail: 0 })?;
        let tail = self.roots.pop()?;
        let head = self.roots.pop()?;
        unsafe {
            Cell::write(pair, Cell::new_pair(head, tail));
        }
        self.roots.push(pair)?;
        Ok(pair)
    }

    /// Remove and return the top of the root stack
    pub fn pop(&mut self) -> Result<usize> {
        self.roots.pop()
    }

    /// Top of the root stack without removing it
    pub fn peek(&self) -> Option<usize> {
        self.roots.peek()
    }

    /// Force a collection, requesting `additional_bytes` of headroom for
    /// the next allocation
    pub fn gc(&mut self, additional_bytes: usize) -> Result<()> {
        self.collect(additional_bytes, GcReason::Explicit)
    }

    /// Number of allocated cells (`live_bytes / CELL_SIZE`).
    ///
    /// Immediately after a collection this is the survivor count; between
    /// collections it also counts garbage not yet reclaimed.
    pub fn live_count(&self) -> usize {
        self.heap.live_bytes() / CELL_SIZE
    }

    /// Bytes between the heap base and the frontier
    pub fn live_bytes(&self) -> usize {
        self.heap.live_bytes()
    }

    /// Current heap capacity in bytes
    pub fn heap_capacity(&self) -> usize {
        self.heap.capacity()
    }

    /// Whether `addr` falls inside the current heap region
    pub fn contains(&self, addr: usize) -> bool {
        self.heap.contains(addr)
    }

    /// The root stack, for inspection
    pub fn stack(&self) -> &RootStack {
        &self.roots
    }

    /// Collections run so far
    pub fn cycle_count(&self) -> u64 {
        self.cycles
    }

    /// Collection statistics
    pub fn stats(&self) -> &GcStats {
        &self.stats
    }

    /// Integer payload of the cell at `addr`, if it is an integer
    pub fn int_value(&self, addr: usize) -> Option<i64> {
        self.check_cell(addr);
        match unsafe { Cell::read(addr) }.kind {
            CellKind::Int(v) => Some(v),
            CellKind::Pair { .. } => None,
        }
    }

    /// Head and tail of the cell at `addr`, if it is a pair
    pub fn pair_fields(&self, addr: usize) -> Option<(usize, usize)> {
        self.check_cell(addr);
        match unsafe { Cell::read(addr) }.kind {
            CellKind::Int(_) => None,
            CellKind::Pair { head, tail } => Some((head, tail)),
        }
    }

    /// Point `pair`'s head at `value`
    ///
    /// Panics if `pair` is not a pair cell; rewiring is how the mutator
    /// builds shared and cyclic structure.
    pub fn set_head(&mut self, pair: usize, value: usize) {
        self.set_pair_field(pair, value, true);
    }

    /// Point `pair`'s tail at `value`
    pub fn set_tail(&mut self, pair: usize, value: usize) {
        self.set_pair_field(pair, value, false);
    }

    fn set_pair_field(&mut self, pair: usize, value: usize, head_side: bool) {
        self.check_cell(pair);
        self.check_cell(value);

        let cell = unsafe { Cell::read(pair) };
        let (head, tail) = match cell.kind {
            CellKind::Pair { head, tail } => (head, tail),
            CellKind::Int(_) => panic!("cell at {} is not a pair", util::format_address(pair)),
        };
        let kind = if head_side {
            CellKind::Pair { head: value, tail }
        } else {
            CellKind::Pair { head, tail: value }
        };
        unsafe {
            Cell::write(
                pair,
                Cell {
                    forwarding: cell.forwarding,
                    kind,
                },
            );
        }
    }

    /// Render the value rooted at `addr` as text.
    ///
    /// Integers print as themselves, pairs as `(head . tail)`, and a pair
    /// seen before prints as `#n` where `n` is its first-visit index. The
    /// rendering depends only on graph shape, never on addresses, so it is
    /// stable across collections and heap moves.
    pub fn format_value(&self, addr: usize) -> String {
        let mut seen = HashMap::new();
        let mut out = String::new();
        self.format_cell(addr, &mut seen, &mut out);
        out
    }

    /// Render every root, bottom of the stack first, one value per line.
    ///
    /// Structure shared between roots keeps its back-reference labels, so
    /// the output captures sharing as well as shape.
    pub fn format_roots(&self) -> String {
        let mut seen = HashMap::new();
        let mut out = String::new();
        for (i, addr) in self.roots.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            self.format_cell(addr, &mut seen, &mut out);
        }
        out
    }

    fn format_cell(&self, addr: usize, seen: &mut HashMap<usize, usize>, out: &mut String) {
        self.check_cell(addr);
        match unsafe { Cell::read(addr) }.kind {
            CellKind::Int(v) => {
                let _ = write!(out, "{}", v);
            }
            CellKind::Pair { head, tail } => {
                if let Some(&label) = seen.get(&addr) {
                    let _ = write!(out, "#{}", label);
                    return;
                }
                seen.insert(addr, seen.len());
                out.push('(');
                self.format_cell(head, seen, out);
                out.push_str(" . ");
                self.format_cell(tail, seen, out);
                out.push(')');
            }
        }
    }

    /// Detailed diagnostic information
    pub fn diagnostics(&self) -> IndexMap<String, String> {
        let mut diagnostics = IndexMap::new();

        diagnostics.insert(
            "variant".to_string(),
            format!("{:?}", self.config.variant),
        );
        diagnostics.insert("cycles".to_string(), self.cycles.to_string());
        diagnostics.insert(
            "heap_base".to_string(),
            util::format_address(self.heap.base()),
        );
        diagnostics.insert(
            "heap_capacity".to_string(),
            self.heap.capacity().to_string(),
        );
        diagnostics.insert("live_bytes".to_string(), self.live_bytes().to_string());
        diagnostics.insert("live_count".to_string(), self.live_count().to_string());
        diagnostics.insert("stack_len".to_string(), self.roots.len().to_string());
        diagnostics.insert(
            "stack_capacity".to_string(),
            self.roots.capacity().to_string(),
        );

        diagnostics
    }

    /// Allocate one cell, collecting and retrying on exhaustion
    fn allocate(&mut self, kind: CellKind) -> Result<usize> {
        if let Some(addr) = self.heap.allocate_cell() {
            unsafe {
                Cell::write(
                    addr,
                    Cell {
                        forwarding: FORWARDING_NONE,
                        kind,
                    },
                );
            }
            return Ok(addr);
        }

        self.collect(CELL_SIZE, GcReason::Exhausted)?;

        match self.heap.allocate_cell() {
            Some(addr) => {
                unsafe {
                    Cell::write(
                        addr,
                        Cell {
                            forwarding: FORWARDING_NONE,
                            kind,
                        },
                    );
                }
                Ok(addr)
            }
            None => {
                let available = self.heap.free_bytes();
                logging::log_event(GcEvent::AllocationFailure {
                    requested: CELL_SIZE,
                    available,
                });
                Err(GcError::OutOfMemory {
                    requested: CELL_SIZE,
                    available,
                })
            }
        }
    }

    fn collect(&mut self, additional_bytes: usize, reason: GcReason) -> Result<()> {
        let timer = GcTimer::new();
        let outcome = Collector::new(&mut self.heap, &mut self.roots, &self.config, self.cycles)
            .run(additional_bytes, reason)?;
        self.cycles += 1;

        if self.config.stats_enabled {
            self.stats.record_collection(
                reason == GcReason::Explicit,
                timer.elapsed(),
                outcome.reclaimed_bytes,
                outcome.live_bytes,
            );
        }

        Ok(())
    }

    fn check_cell(&self, addr: usize) {
        assert!(
            self.heap.contains(addr),
            "address {} is outside the heap",
            util::format_address(addr)
        );
        debug_assert_eq!((addr - self.heap.base()) % CELL_SIZE, 0);
    }
}
