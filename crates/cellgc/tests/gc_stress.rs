//! Stress - Churn, Growth, Deep Graphs, Randomized Mutation
//!
//! Long-running sequences that bang on the allocate/collect/retry path,
//! grow the heap from its minimum, and verify collector accounting against
//! an independent reachability walk under randomized mutator activity.

mod common;

use cellgc::CELL_SIZE;
use common::RuntimeFixture;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Allocation churn with no retention: runs to completion, ends empty.
#[test]
fn churn_without_retention() {
    const ITERATIONS: usize = 100_000;
    const BATCH: usize = 20;

    let mut f = RuntimeFixture::adaptive();
    for i in 0..ITERATIONS {
        for j in 0..BATCH {
            f.rt.push_int((i * BATCH + j) as i64).unwrap();
        }
        for _ in 0..BATCH {
            f.rt.pop().unwrap();
        }
    }

    f.rt.gc(0).unwrap();
    assert_eq!(f.rt.live_count(), 0);
}

/// Growing from the minimum heap while everything stays rooted: every
/// collection along the way must grow the heap and keep all survivors.
#[test]
fn growth_preserves_all_rooted_values() {
    const COUNT: i64 = 100;

    let mut f = RuntimeFixture::adaptive();
    assert_eq!(f.rt.heap_capacity(), cellgc::HEAP_MIN);

    for i in 0..COUNT {
        f.rt.push_int(i).unwrap();
    }

    // The heap had to grow well past one cell, through several cycles.
    assert!(f.rt.cycle_count() > 0);
    assert!(f.rt.heap_capacity() >= COUNT as usize * CELL_SIZE);

    f.rt.gc(0).unwrap();
    assert_eq!(f.rt.live_count(), COUNT as usize);

    let slots = f.stack_slots();
    for (i, addr) in slots.iter().enumerate() {
        assert_eq!(f.rt.int_value(*addr), Some(i as i64));
    }
}

/// A list deep enough to break a recursive marker: the work-list traversal
/// must handle it within the host stack.
#[test]
fn deep_list_marks_without_host_stack_overflow() {
    const LINKS: usize = 100_000;

    let mut f = RuntimeFixture::adaptive();
    f.rt.push_int(0).unwrap();
    f.rt.push_int(0).unwrap();
    f.rt.push_pair().unwrap();
    for i in 0..LINKS {
        f.rt.push_int(i as i64).unwrap();
        // Pops the integer as tail and the chain as head: the chain deepens
        // by one pair per iteration while the stack stays one slot tall.
        f.rt.push_pair().unwrap();
    }

    f.rt.gc(0).unwrap();
    assert_eq!(f.rt.live_count(), 3 + 2 * LINKS);
}

/// Randomized mutator sequences: after every collection the survivor count
/// must equal an independent count of the cells reachable from the roots,
/// and the rendered graph must be unchanged.
#[test]
fn randomized_mutation_keeps_accounting_exact() {
    const STEPS: usize = 5_000;

    let mut rng = StdRng::seed_from_u64(0xce11);
    let mut f = RuntimeFixture::adaptive();

    for _ in 0..STEPS {
        match rng.gen_range(0..100) {
            // Push an integer (when there is room on the stack).
            0..=44 => {
                if f.rt.stack().len() < f.config.stack_max {
                    f.rt.push_int(rng.gen_range(-1000..1000)).unwrap();
                }
            }
            // Pop.
            45..=69 => {
                if !f.rt.stack().is_empty() {
                    f.rt.pop().unwrap();
                }
            }
            // Link the two top values into a pair.
            70..=89 => {
                if f.rt.stack().len() >= 2 {
                    f.rt.push_pair().unwrap();
                }
            }
            // Rewire a random rooted pair at a random rooted value,
            // occasionally closing a cycle.
            90..=94 => {
                let slots = f.stack_slots();
                if !slots.is_empty() {
                    let target = slots[rng.gen_range(0..slots.len())];
                    let value = slots[rng.gen_range(0..slots.len())];
                    if f.rt.pair_fields(target).is_some() {
                        if rng.gen_bool(0.5) {
                            f.rt.set_head(target, value);
                        } else {
                            f.rt.set_tail(target, value);
                        }
                    }
                }
            }
            // Collect, then audit the collector against a reachability walk.
            _ => {
                let expected = f.reachable_count();
                let rendered = f.rt.format_roots();

                f.rt.gc(0).unwrap();

                assert_eq!(f.rt.live_count(), expected);
                assert_eq!(f.rt.format_roots(), rendered);
                f.assert_graph_well_formed();
            }
        }
    }

    // Final audit.
    let expected = f.reachable_count();
    f.rt.gc(0).unwrap();
    assert_eq!(f.rt.live_count(), expected);
    f.assert_graph_well_formed();
}

/// Alternating growth and shrink: retention spikes grow the heap, then the
/// following empty collections shrink it back to the minimum.
#[test]
fn heap_breathes_with_retention() {
    let mut f = RuntimeFixture::adaptive();

    for round in 0..10 {
        for i in 0..50 {
            f.rt.push_int(round * 100 + i).unwrap();
        }
        f.rt.gc(0).unwrap();
        assert_eq!(f.rt.live_count(), 50);

        for _ in 0..50 {
            f.rt.pop().unwrap();
        }
        f.rt.gc(0).unwrap();
        assert_eq!(f.rt.live_count(), 0);
        assert_eq!(f.rt.heap_capacity(), cellgc::HEAP_MIN);
    }
}
