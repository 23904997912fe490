/*!
Dirty tracker and recompute phase.

The commit phase records, per touched block, how many bits changed in each
of three buckets: selector bits, `dest1` pointer bits, `dest2` pointer
bits. Only presence matters; the counts exist because one commit batch can
touch several bits of the same field.

Recompute walks the dirty blocks and, for each:
1. evaluates the selector from the committed field values;
2. if selector bits were touched and the result differs from the block's
   latch, marks the block changed and buffers the latch update;
3. for each destination whose bucket is dirty (or if the block changed),
   decodes the pointer, skips the `(0,0)` sentinel, drops out-of-range
   targets with a diagnostic, and enqueues the new value for the next
   cycle only when the stored target bit differs.

Latch updates are buffered and applied as a barrier after every dirty
block has been processed, so each block's "changed" comparison sees the
pre-update latches of all other blocks. Together with the
differs-from-stored check on enqueue, this makes the phase a pure function
of (memory, latches) whose output does not depend on iteration order. The
map is a `BTreeMap` anyway, so queue contents are reproducible
byte-for-byte.
*/

use std::collections::BTreeMap;

use tracing::{trace, warn};

use crate::codec::{self, Dest};
use crate::config::{GridConfig, SELECTOR_BITS};
use crate::engine::memory::{Latches, Memory};
use crate::engine::queue::WriteQueue;

/// Per-block tally of committed bit changes, bucketed by field category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirtyCounts {
    pub selector: u32,
    pub dest1: u32,
    pub dest2: u32,
}

/// Blocks touched by the current commit phase, keyed by block index.
/// Cleared at the end of every recompute phase.
#[derive(Default)]
pub struct DirtyMap {
    blocks: BTreeMap<usize, DirtyCounts>,
}

impl DirtyMap {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    #[inline]
    pub fn counts(&self, index: usize) -> Option<DirtyCounts> {
        self.blocks.get(&index).copied()
    }

    /// Classify a committed bit by its field offset and bump the matching
    /// bucket for `index`.
    pub fn record(&mut self, cfg: &GridConfig, index: usize, offset: u32) {
        let counts = self.blocks.entry(index).or_default();
        if offset < SELECTOR_BITS {
            counts.selector += 1;
        } else if offset < codec::dest2_base(cfg) {
            counts.dest1 += 1;
        } else {
            counts.dest2 += 1;
        }
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }
}

/// Run one recompute phase over the dirty blocks, scheduling next-cycle
/// writes into `queue` and latch updates behind the barrier.
pub(crate) fn recompute(
    cfg: &GridConfig,
    memory: &Memory,
    latches: &mut Latches,
    dirty: &mut DirtyMap,
    queue: &mut WriteQueue,
) {
    trace!(dirty = dirty.blocks.len(), "recompute");

    // Latch updates deferred to the barrier at the end of the phase.
    let mut latched_next: Vec<(usize, bool)> = Vec::new();

    for (&index, counts) in &dirty.blocks {
        let next = memory.evaluate(index);

        let mut changed = false;
        if counts.selector > 0 && latches.get(index) != next {
            changed = true;
            latched_next.push((index, next));
        }

        let word = memory.word(index);
        if changed || counts.dest1 > 0 {
            propagate(cfg, memory, queue, codec::decode_dest1(cfg, word), next);
        }
        if changed || counts.dest2 > 0 {
            propagate(cfg, memory, queue, codec::decode_dest2(cfg, word), next);
        }
    }

    for (index, next) in latched_next {
        latches.set(index, next);
    }
    dirty.clear();
}

/// Schedule `next` at `dest` for the following cycle, if the pointer is
/// connected, in range, and the stored bit actually differs.
fn propagate(cfg: &GridConfig, memory: &Memory, queue: &mut WriteQueue, dest: Dest, next: bool) {
    if dest.is_sentinel() {
        return;
    }
    if dest.index >= memory.len() || dest.offset >= memory.block_width() {
        warn!(
            target_index = dest.index,
            target_offset = dest.offset,
            "dropping write to out-of-range destination"
        );
        queue.note_dropped();
        return;
    }
    if memory.bit(dest.index, dest.offset) != next {
        queue.enqueue(cfg, dest.index, dest.offset, next);
    }
}
