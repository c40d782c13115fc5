use std::num::NonZeroUsize;
use std::thread;

use crate::addressing::{reference_block, Addressing, Position};
use crate::block::Block;
use crate::memory::{Memory, SharedMemory};
use crate::params::{Layout, Params, Version, SYNC_POINTS};

/// Computes every non-seeded block of `memory` for all passes.
pub(crate) fn fill_memory(memory: &mut Memory, params: &Params, layout: &Layout) {
    fill_memory_with_workers(memory, params, layout, worker_count(layout.lanes));
}

fn worker_count(lanes: u32) -> u32 {
    let available = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);

    lanes.min(u32::try_from(available).unwrap_or(u32::MAX))
}

pub(crate) fn fill_memory_with_workers(
    memory: &mut Memory,
    params: &Params,
    layout: &Layout,
    workers: u32,
) {
    assert!((1..=layout.lanes).contains(&workers));

    for pass in 0..params.time_cost() {
        tracing::trace!(pass, workers, "filling memory");

        for slice in 0..SYNC_POINTS {
            let shared = memory.shared();

            if workers == 1 {
                for lane in 0..layout.lanes {
                    // SAFETY: segments run one at a time
                    unsafe { fill_segment(shared, params, layout, pass, slice, lane) };
                }
                continue;
            }

            // The scope joins every worker before returning, which is the barrier between
            // slices. A panicking worker propagates out of the scope.
            thread::scope(|scope| {
                for worker in 0..workers {
                    scope.spawn(move || {
                        for lane in (worker..layout.lanes).step_by(workers as usize) {
                            // SAFETY: each lane belongs to exactly one worker, and workers
                            // only read blocks of finished slices from other lanes
                            unsafe { fill_segment(shared, params, layout, pass, slice, lane) };
                        }
                    });
                }
            });
        }
    }
}

/// Positions of the blocks computed in one segment, in dependency order.
///
/// The first two columns of every lane are seeded before the first pass, so the segment of
/// the first slice of the first pass starts at index 2.
pub(crate) fn segment_positions(
    layout: &Layout,
    pass: u32,
    slice: u32,
    lane: u32,
) -> impl Iterator<Item = Position> {
    let start = if pass == 0 && slice == 0 { 2 } else { 0 };

    (start..layout.segment_len).map(move |index| Position {
        pass,
        slice,
        lane,
        index,
    })
}

/// # Safety
///
/// May only run concurrently with segments of other lanes within the same slice.
unsafe fn fill_segment(
    memory: SharedMemory<'_>,
    params: &Params,
    layout: &Layout,
    pass: u32,
    slice: u32,
    lane: u32,
) {
    let mut addressing = Addressing::for_segment(params, layout, pass, slice, lane);
    let overwrite = pass == 0 || params.version() == Version::V0x10;

    for position in segment_positions(layout, pass, slice, lane) {
        let prev = memory.block(lane, position.prev_column(layout));
        let pseudo_rand = addressing.pseudo_rand(position.index, prev);
        let (ref_lane, ref_column) = reference_block(layout, position, pseudo_rand);

        let next = Block::compress(prev, memory.block(ref_lane, ref_column));

        let current = memory.block_mut(lane, position.column(layout));
        if overwrite {
            *current = next;
        } else {
            current.xor_with(&next);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::addressing::{reference_window, skewed_column};
    use crate::params::Algorithm;

    fn setup(
        algorithm: Algorithm,
        version: Version,
        parallelism: u32,
        memory_cost_kib: u32,
        time_cost: u32,
    ) -> (Params, Layout) {
        let params = Params::new(
            algorithm,
            version,
            parallelism,
            memory_cost_kib,
            time_cost,
            32,
        )
        .unwrap();
        (params, Layout::new(&params))
    }

    fn seeded_memory(layout: &Layout) -> Memory {
        let mut memory = Memory::new(layout);
        for lane in 0..layout.lanes {
            for column in 0..2 {
                let block = memory.block_mut(lane, column);
                for i in 0..128 {
                    block.set_word(i, u64::from(lane * 1000 + column * 100) + i as u64 + 1);
                }
            }
        }
        memory
    }

    #[test]
    fn test_single_pass_covers_every_column_once() {
        let (params, layout) = setup(Algorithm::Argon2d, Version::V0x13, 2, 16, 1);
        let mut writes = HashMap::new();

        for pass in 0..params.time_cost() {
            for slice in 0..SYNC_POINTS {
                for lane in 0..layout.lanes {
                    for position in segment_positions(&layout, pass, slice, lane) {
                        *writes
                            .entry((position.lane, position.column(&layout)))
                            .or_insert(0) += 1;
                    }
                }
            }
        }

        assert_eq!(writes.len(), 2 * (8 - 2));
        for lane in 0..2 {
            assert!(!writes.contains_key(&(lane, 0)));
            assert!(!writes.contains_key(&(lane, 1)));
            for column in 2..8 {
                assert_eq!(writes[&(lane, column)], 1);
            }
        }
    }

    #[test]
    fn test_fill_writes_every_unseeded_block() {
        let (params, layout) = setup(Algorithm::Argon2id, Version::V0x13, 2, 16, 1);
        let mut memory = seeded_memory(&layout);

        fill_memory(&mut memory, &params, &layout);

        for lane in 0..layout.lanes {
            assert_eq!(memory.block(lane, 0).word(0), u64::from(lane * 1000) + 1);
            assert_eq!(memory.block(lane, 1).word(0), u64::from(lane * 1000 + 100) + 1);
            for column in 2..layout.lane_len {
                assert!((0..128).any(|i| memory.block(lane, column).word(i) != 0));
            }
        }
    }

    fn fill_sentinel(memory: &mut Memory, layout: &Layout, sentinel: u64) {
        for lane in 0..layout.lanes {
            for column in 2..layout.lane_len {
                let block = memory.block_mut(lane, column);
                for i in 0..128 {
                    block.set_word(i, sentinel);
                }
            }
        }
    }

    fn is_sentinel(block: &Block, sentinel: u64) -> bool {
        (0..128).all(|i| block.word(i) == sentinel)
    }

    #[test]
    fn test_single_pass_overwrites_every_unseeded_block() {
        let sentinel = 0x5a5a_5a5a_5a5a_5a5a;
        let (params, layout) = setup(Algorithm::Argon2d, Version::V0x10, 2, 16, 1);

        for workers in [1, 2] {
            let mut memory = seeded_memory(&layout);
            fill_sentinel(&mut memory, &layout, sentinel);
            let seeded = seeded_memory(&layout);

            fill_memory_with_workers(&mut memory, &params, &layout, workers);

            for lane in 0..layout.lanes {
                for column in 0..2 {
                    let a = memory.block(lane, column);
                    let b = seeded.block(lane, column);
                    assert!((0..128).all(|i| a.word(i) == b.word(i)));
                }
                for column in 2..layout.lane_len {
                    assert!(!is_sentinel(memory.block(lane, column), sentinel));
                }
            }
        }
    }

    /// Sequential fill with a caller-chosen reference for every block.
    fn fill_choosing_reference(
        memory: &mut Memory,
        params: &Params,
        layout: &Layout,
        choose: impl Fn(Position, u64) -> (u32, u32),
    ) {
        for pass in 0..params.time_cost() {
            for slice in 0..SYNC_POINTS {
                for lane in 0..layout.lanes {
                    let mut addressing = Addressing::for_segment(params, layout, pass, slice, lane);
                    for position in segment_positions(layout, pass, slice, lane) {
                        let prev_column = position.prev_column(layout);
                        let pseudo_rand =
                            addressing.pseudo_rand(position.index, memory.block(lane, prev_column));
                        let (ref_lane, ref_column) = choose(position, pseudo_rand);

                        let next = Block::compress(
                            memory.block(lane, prev_column),
                            memory.block(ref_lane, ref_column),
                        );
                        let current = memory.block_mut(lane, position.column(layout));
                        if pass == 0 {
                            *current = next;
                        } else {
                            current.xor_with(&next);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_reference_fill_matches_scheduler() {
        let (params, layout) = setup(Algorithm::Argon2id, Version::V0x13, 4, 64, 2);

        let mut scheduled = seeded_memory(&layout);
        fill_memory_with_workers(&mut scheduled, &params, &layout, 1);

        let mut chosen = seeded_memory(&layout);
        fill_choosing_reference(&mut chosen, &params, &layout, |position, pseudo_rand| {
            reference_block(&layout, position, pseudo_rand)
        });

        for lane in 0..layout.lanes {
            for column in 0..layout.lane_len {
                let a = scheduled.block(lane, column);
                let b = chosen.block(lane, column);
                assert!((0..128).all(|i| a.word(i) == b.word(i)));
            }
        }
    }

    #[test]
    fn test_forced_same_lane_run_matches_lane_local_run() {
        for algorithm in [Algorithm::Argon2d, Algorithm::Argon2i, Algorithm::Argon2id] {
            let (params, layout) = setup(algorithm, Version::V0x13, 4, 64, 2);

            // every J2 replaced by the current lane
            let mut forced = seeded_memory(&layout);
            fill_choosing_reference(&mut forced, &params, &layout, |position, pseudo_rand| {
                let forced = (u64::from(position.lane) << 32) | (pseudo_rand & 0xffff_ffff);
                reference_block(&layout, position, forced)
            });

            // cross-lane selection removed entirely
            let mut local = seeded_memory(&layout);
            fill_choosing_reference(&mut local, &params, &layout, |position, pseudo_rand| {
                let (start, size) = reference_window(&layout, position, true);
                (
                    position.lane,
                    skewed_column(&layout, start, size, pseudo_rand as u32),
                )
            });

            for lane in 0..layout.lanes {
                for column in 0..layout.lane_len {
                    let a = forced.block(lane, column);
                    let b = local.block(lane, column);
                    assert!((0..128).all(|i| a.word(i) == b.word(i)));
                }
            }
        }
    }

    #[test]
    fn test_threaded_fill_matches_sequential_fill() {
        for algorithm in [Algorithm::Argon2d, Algorithm::Argon2i, Algorithm::Argon2id] {
            let (params, layout) = setup(algorithm, Version::V0x13, 4, 64, 2);

            let mut sequential = seeded_memory(&layout);
            fill_memory_with_workers(&mut sequential, &params, &layout, 1);

            for workers in [2, 3, 4] {
                let mut threaded = seeded_memory(&layout);
                fill_memory_with_workers(&mut threaded, &params, &layout, workers);

                for lane in 0..layout.lanes {
                    for column in 0..layout.lane_len {
                        let a = sequential.block(lane, column);
                        let b = threaded.block(lane, column);
                        assert!((0..128).all(|i| a.word(i) == b.word(i)));
                    }
                }
            }
        }
    }

    #[test]
    fn test_versions_differ_only_after_first_pass() {
        let (params_10, layout) = setup(Algorithm::Argon2d, Version::V0x10, 1, 8, 1);
        let (params_13, _) = setup(Algorithm::Argon2d, Version::V0x13, 1, 8, 1);

        let mut old = seeded_memory(&layout);
        let mut new = seeded_memory(&layout);
        fill_memory(&mut old, &params_10, &layout);
        fill_memory(&mut new, &params_13, &layout);

        assert_eq!(old.last_column_xor().word(0), new.last_column_xor().word(0));

        let (params_10, _) = setup(Algorithm::Argon2d, Version::V0x10, 1, 8, 2);
        let (params_13, _) = setup(Algorithm::Argon2d, Version::V0x13, 1, 8, 2);

        let mut old = seeded_memory(&layout);
        let mut new = seeded_memory(&layout);
        fill_memory(&mut old, &params_10, &layout);
        fill_memory(&mut new, &params_13, &layout);

        assert_ne!(old.last_column_xor().word(0), new.last_column_xor().word(0));
    }
}
