//! Heap Management - Contiguous Cell Region with Bump Frontier
//!
//! The heap is one anonymous memory mapping holding a densely packed array
//! of fixed-size cells. A bump frontier separates allocated cells from free
//! space:
//!
//! ```text
//! base                    frontier              end
//! ├── allocated cells ────┼──── free space ─────┤
//! ```
//!
//! Allocation is a frontier bump and nothing else; exhaustion handling
//! (triggering a collection, retrying) belongs to the caller. Reallocation
//! replaces the whole region with a fresh mapping of the requested capacity,
//! preserving the allocated prefix; the region moves in memory, and the
//! caller is handed the old base so it can rebase any addresses it kept.

use memmap2::{MmapMut, MmapOptions};

use crate::error::{GcError, Result};
use crate::object::CELL_SIZE;
use crate::{memory, util};

/// Contiguous cell heap backed by an anonymous mapping
pub struct Heap {
    /// Backing mapping; its length is the capacity rounded up to a page
    mapping: MmapMut,
    /// Base address of the mapping, captured from its writable pointer
    base: usize,
    /// Usable capacity in bytes (base..base+capacity)
    capacity: usize,
    /// Bytes allocated so far, as an offset from base
    frontier: usize,
}

impl Heap {
    /// Create a heap with the given capacity in bytes
    ///
    /// The frontier starts at the base; no cells are allocated. Fails with
    /// `AllocationFailed` if the mapping cannot be created.
    pub fn new(capacity: usize) -> Result<Self> {
        let mut mapping = Self::map_region(capacity)?;
        let base = mapping.as_mut_ptr() as usize;
        Ok(Self {
            mapping,
            base,
            capacity,
            frontier: 0,
        })
    }

    fn map_region(capacity: usize) -> Result<MmapMut> {
        let len = util::align_up(capacity.max(1), page_size::get());
        MmapOptions::new()
            .len(len)
            .map_anon()
            .map_err(|e| GcError::AllocationFailed {
                requested: capacity,
                reason: e.to_string(),
            })
    }

    /// Base address of the region
    #[inline]
    pub fn base(&self) -> usize {
        self.base
    }

    /// One past the last usable byte of the region
    #[inline]
    pub fn end(&self) -> usize {
        self.base() + self.capacity
    }

    /// Address of the next allocation site
    #[inline]
    pub fn frontier(&self) -> usize {
        self.base() + self.frontier
    }

    /// Usable capacity in bytes
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes actually reserved from the OS (capacity rounded to a page)
    pub fn mapped_bytes(&self) -> usize {
        self.mapping.len()
    }

    /// Bytes currently allocated (frontier - base)
    #[inline]
    pub fn live_bytes(&self) -> usize {
        self.frontier
    }

    /// Bytes still free beyond the frontier
    #[inline]
    pub fn free_bytes(&self) -> usize {
        self.capacity - self.frontier
    }

    /// Whether `addr` falls inside the current region
    #[inline]
    pub fn contains(&self, addr: usize) -> bool {
        addr >= self.base() && addr < self.end()
    }

    /// Allocate one cell at the frontier
    ///
    /// Returns the address of the new cell, or `None` when fewer than
    /// `CELL_SIZE` bytes remain. The cell's memory is not initialized; the
    /// caller writes the cell immediately.
    #[inline]
    pub fn allocate_cell(&mut self) -> Option<usize> {
        if self.free_bytes() < CELL_SIZE {
            return None;
        }
        let addr = self.frontier();
        self.frontier += CELL_SIZE;
        debug_assert!(util::is_aligned(addr, std::mem::align_of::<usize>()));
        Some(addr)
    }

    /// Replace the region with one of `new_capacity` bytes
    ///
    /// Preserves the allocated prefix, up to `min(live_bytes, new_capacity)`
    /// bytes; if the new region is smaller than the allocated prefix the
    /// frontier is clamped to the new end. The region moves: addresses into
    /// the old region stay meaningful only as offsets from the returned old
    /// base.
    ///
    /// On failure the old region is left untouched (the new mapping is
    /// created before the old one is released) and `AllocationFailed` is
    /// returned.
    pub fn reallocate(&mut self, new_capacity: usize) -> Result<usize> {
        let mut new_mapping = Self::map_region(new_capacity)?;
        let new_base = new_mapping.as_mut_ptr() as usize;
        let old_base = self.base;
        let preserved = self.frontier.min(new_capacity);

        unsafe {
            // Distinct mappings never overlap.
            memory::copy_memory(old_base, new_base, preserved);
        }

        self.mapping = new_mapping;
        self.base = new_base;
        self.capacity = new_capacity;
        self.frontier = preserved;
        Ok(old_base)
    }

    /// Reset the frontier to `live_bytes` bytes past the base
    ///
    /// Used by the collector once the slide has packed the survivors into
    /// the low end of the region.
    pub fn set_live_bytes(&mut self, live_bytes: usize) {
        debug_assert!(live_bytes <= self.capacity);
        debug_assert_eq!(live_bytes % CELL_SIZE, 0);
        self.frontier = live_bytes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_bumps_the_frontier() {
        let mut heap = Heap::new(4 * CELL_SIZE).unwrap();
        assert_eq!(heap.live_bytes(), 0);
        assert!(heap.mapped_bytes() >= heap.capacity());

        let first = heap.allocate_cell().unwrap();
        let second = heap.allocate_cell().unwrap();
        assert_eq!(first, heap.base());
        assert_eq!(second, first + CELL_SIZE);
        assert_eq!(heap.live_bytes(), 2 * CELL_SIZE);
    }

    #[test]
    fn exhausted_heap_refuses_allocation() {
        let mut heap = Heap::new(2 * CELL_SIZE).unwrap();
        assert!(heap.allocate_cell().is_some());
        assert!(heap.allocate_cell().is_some());
        assert!(heap.allocate_cell().is_none());
        // A failed allocation does not advance the frontier.
        assert_eq!(heap.live_bytes(), 2 * CELL_SIZE);
    }

    #[test]
    fn reallocation_preserves_the_allocated_prefix() {
        let mut heap = Heap::new(2 * CELL_SIZE).unwrap();
        let addr = heap.allocate_cell().unwrap();
        unsafe {
            std::ptr::write(addr as *mut u64, 0xdead_beef);
        }

        let old_base = heap.reallocate(8 * CELL_SIZE).unwrap();
        assert_eq!(old_base, addr);
        assert_eq!(heap.capacity(), 8 * CELL_SIZE);
        assert_eq!(heap.live_bytes(), CELL_SIZE);

        let moved = heap.base() + (addr - old_base);
        let value = unsafe { std::ptr::read(moved as *const u64) };
        assert_eq!(value, 0xdead_beef);
    }

    #[test]
    fn shrinking_reallocation_clamps_the_frontier() {
        let mut heap = Heap::new(4 * CELL_SIZE).unwrap();
        for _ in 0..4 {
            heap.allocate_cell().unwrap();
        }

        heap.reallocate(2 * CELL_SIZE).unwrap();
        assert_eq!(heap.capacity(), 2 * CELL_SIZE);
        assert_eq!(heap.live_bytes(), 2 * CELL_SIZE);
        assert!(heap.allocate_cell().is_none());
    }
}
