//! Shared fixtures and helpers for the integration suite
//!
//! Every test file builds runtimes through these constructors so heap and
//! stack sizing stays consistent across the suite.

#![allow(dead_code)]

use std::collections::HashSet;

use cellgc::{GcConfig, HeapVariant, Runtime, CELL_SIZE};

/// Test fixture wrapping a runtime and the configuration it was built from
pub struct RuntimeFixture {
    pub rt: Runtime,
    pub config: GcConfig,
}

impl RuntimeFixture {
    /// Adaptive-heap runtime starting at the minimum capacity
    pub fn adaptive() -> Self {
        let config = GcConfig::default();
        let rt = Runtime::new(config.clone()).expect("runtime creation should succeed");
        Self { rt, config }
    }

    /// Fixed-heap runtime with room for exactly `cells` cells
    pub fn fixed_with_cells(cells: usize) -> Self {
        let config = GcConfig {
            variant: HeapVariant::Fixed,
            fixed_heap_size: cells * CELL_SIZE,
            ..Default::default()
        };
        let rt = Runtime::new(config.clone()).expect("runtime creation should succeed");
        Self { rt, config }
    }

    /// Adaptive runtime with a custom root stack capacity
    pub fn with_stack_capacity(slots: usize) -> Self {
        let config = GcConfig {
            stack_max: slots,
            ..Default::default()
        };
        let rt = Runtime::new(config.clone()).expect("runtime creation should succeed");
        Self { rt, config }
    }

    /// Push a sequence of integers, returning their addresses
    pub fn push_ints(&mut self, values: &[i64]) -> Vec<usize> {
        values
            .iter()
            .map(|&v| self.rt.push_int(v).expect("push_int should succeed"))
            .collect()
    }

    /// Push two integers and link them into a pair
    pub fn build_pair(&mut self, head: i64, tail: i64) -> usize {
        self.rt.push_int(head).expect("push_int should succeed");
        self.rt.push_int(tail).expect("push_int should succeed");
        self.rt.push_pair().expect("push_pair should succeed")
    }

    /// Addresses currently on the root stack, bottom to top
    pub fn stack_slots(&self) -> Vec<usize> {
        self.rt.stack().iter().collect()
    }

    /// Count the distinct cells reachable from the root stack
    ///
    /// Computed by walking the live graph through the public accessors, so
    /// it is independent of the collector's own accounting.
    pub fn reachable_count(&self) -> usize {
        let mut seen = HashSet::new();
        let mut work: Vec<usize> = self.rt.stack().iter().collect();
        while let Some(addr) = work.pop() {
            if !seen.insert(addr) {
                continue;
            }
            if let Some((head, tail)) = self.rt.pair_fields(addr) {
                work.push(head);
                work.push(tail);
            }
        }
        seen.len()
    }

    /// Assert that every cell reachable from the roots is a well-formed
    /// survivor: inside the heap, forwarding word absent, pair fields
    /// pointing back into the heap.
    pub fn assert_graph_well_formed(&self) {
        let mut seen = HashSet::new();
        let mut work: Vec<usize> = self.rt.stack().iter().collect();
        while let Some(addr) = work.pop() {
            if !seen.insert(addr) {
                continue;
            }
            assert!(
                self.rt.contains(addr),
                "reachable cell {:#x} is outside the heap",
                addr
            );
            let cell = unsafe { cellgc::Cell::read(addr) };
            assert_eq!(
                cell.forwarding,
                cellgc::object::FORWARDING_NONE,
                "surviving cell {:#x} still carries a forwarding word",
                addr
            );
            if let Some((head, tail)) = self.rt.pair_fields(addr) {
                work.push(head);
                work.push(tail);
            }
        }
    }
}
