//! Mark Phase - Reachability from the Root Stack
//!
//! Walks the object graph from every root slot, stamping each reachable
//! cell's forwarding word with its own address. A stamped cell is never
//! visited twice, so cyclic graphs terminate; the stamp itself is interim
//! state that address planning overwrites with the cell's destination.
//!
//! The traversal uses an explicit work list rather than recursion: a long
//! chain of pairs is bounded only by the heap, not by the host call stack.

use crate::object::{self, Cell, CellKind, FORWARDING_NONE};
use crate::roots::RootStack;

/// Mark every cell reachable from the root stack.
///
/// Returns the number of cells marked.
pub(super) fn mark_from_roots(roots: &RootStack) -> usize {
    let mut work: Vec<usize> = roots.iter().collect();
    let mut marked = 0usize;

    while let Some(addr) = work.pop() {
        unsafe {
            if object::forwarding_of(addr) != FORWARDING_NONE {
                continue;
            }
            object::set_forwarding_of(addr, addr);
            marked += 1;

            if let CellKind::Pair { head, tail } = Cell::read(addr).kind {
                // Tail below head so the head side is walked first.
                work.push(tail);
                work.push(head);
            }
        }
    }

    marked
}
