//! Relocation Phases - Address Planning, Reference Fix-up, Slide
//!
//! The forwarding word doubles as the relocation table: after planning, a
//! live cell's word holds the address it will occupy once survivors are
//! packed into the low end of the heap. Planned addresses are expressed
//! against the heap base current at planning time; if the region is replaced
//! before the slide, both the planned addresses and every reference in the
//! graph are rebased with `new_base + (value - old_base)`.
//!
//! Destinations never exceed sources (survivors only ever move down), so
//! the slide copies forward over the region it is consuming.

use crate::heap::Heap;
use crate::memory;
use crate::object::{self, Cell, CellKind, CELL_SIZE, FORWARDING_NONE};
use crate::roots::RootStack;

/// Result of the address-planning sweep
pub(super) struct RelocationPlan {
    /// Bytes the survivors will occupy after the slide
    pub live_bytes: usize,
    /// Offset one past the highest live cell, before the slide.
    ///
    /// A replacement region must preserve at least this much of the old
    /// region's prefix or the slide would read cells that no longer exist.
    pub preserved_bytes: usize,
}

/// Phase 2: assign every marked cell its post-compaction address.
///
/// Sweeps the allocated prefix once, advancing a destination cursor past
/// each live cell. Dead cells are skipped and their storage is abandoned.
pub(super) fn plan_addresses(heap: &mut Heap) -> RelocationPlan {
    let base = heap.base();
    let frontier = heap.frontier();

    let mut to = base;
    let mut preserved_bytes = 0usize;

    let mut from = base;
    while from < frontier {
        unsafe {
            if object::forwarding_of(from) != FORWARDING_NONE {
                object::set_forwarding_of(from, to);
                to += CELL_SIZE;
                preserved_bytes = (from - base) + CELL_SIZE;
            }
        }
        from += CELL_SIZE;
    }

    RelocationPlan {
        live_bytes: to - base,
        preserved_bytes,
    }
}

/// Phase 4a: rewrite every live reference to its post-compaction address.
///
/// Covers the two places references live: pair fields of surviving cells,
/// and the root stack. Each held address still points at a cell's pre-slide
/// location (as an offset from `old_base`); that cell's forwarding word
/// gives the destination, again as an offset from `old_base`.
pub(super) fn update_references(heap: &mut Heap, roots: &mut RootStack, old_base: usize) {
    let new_base = heap.base();
    let frontier = heap.frontier();

    let mut addr = new_base;
    while addr < frontier {
        unsafe {
            if object::forwarding_of(addr) != FORWARDING_NONE {
                let cell = Cell::read(addr);
                if let CellKind::Pair { head, tail } = cell.kind {
                    Cell::write(
                        addr,
                        Cell {
                            forwarding: cell.forwarding,
                            kind: CellKind::Pair {
                                head: forward(head, old_base, new_base),
                                tail: forward(tail, old_base, new_base),
                            },
                        },
                    );
                }
            }
        }
        addr += CELL_SIZE;
    }

    for slot in roots.slots_mut() {
        *slot = unsafe { forward(*slot, old_base, new_base) };
    }
}

/// Translate one pre-collection reference into its final address.
///
/// `p` addresses a cell's old location relative to `old_base`; the cell's
/// current bytes sit at the same offset from `new_base`. Its forwarding
/// word holds the planned destination, also relative to `old_base`. When
/// the region did not move the two bases coincide and this collapses to a
/// plain forwarding-word read.
unsafe fn forward(p: usize, old_base: usize, new_base: usize) -> usize {
    let current = new_base + (p - old_base);
    let dst = object::forwarding_of(current);
    debug_assert_ne!(dst, FORWARDING_NONE);
    new_base + (dst - old_base)
}

/// Phase 4b: pack the survivors into the low end of the heap.
///
/// Walks the allocated prefix in address order, moving each live cell to
/// its planned destination and clearing the forwarding word at the new
/// location. Must run after every reference has been rewritten: this is
/// the step that destroys the forwarding information.
pub(super) fn slide(heap: &mut Heap, old_base: usize) {
    let new_base = heap.base();
    let frontier = heap.frontier();

    let mut from = new_base;
    while from < frontier {
        unsafe {
            let fwd = object::forwarding_of(from);
            if fwd != FORWARDING_NONE {
                let dst = new_base + (fwd - old_base);
                debug_assert!(dst <= from);
                if dst != from {
                    memory::copy_memory_overlapping(from, dst, CELL_SIZE);
                }
                object::set_forwarding_of(dst, FORWARDING_NONE);
            }
        }
        from += CELL_SIZE;
    }
}
