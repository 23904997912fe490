/*!
Write queue and commit phase.

All mutation of block memory funnels through here: external callers and the
recompute phase alike enqueue `(index, offset, value)` bit assignments, and
the commit phase at the start of the next tick applies the whole batch to
memory in FIFO order. A later write to the same address therefore
overwrites an earlier one within a batch; that is the defined tie-break.

`enqueue` range-checks the address. An out-of-range write is dropped with a
`tracing` diagnostic and counted, never applied; this is the recoverable
half of the error model (the fatal half lives in `config`).
*/

use tracing::{trace, warn};

use crate::config::GridConfig;
use crate::engine::dirty::DirtyMap;
use crate::engine::memory::Memory;

/// A scheduled bit assignment: queued during one cycle, applied at the
/// start of the next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingWrite {
    pub index: usize,
    pub offset: u32,
    pub value: bool,
}

/// FIFO multiset of pending bit writes.
#[derive(Default)]
pub struct WriteQueue {
    writes: Vec<PendingWrite>,
    dropped: u64,
}

impl WriteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Writes dropped by the range check since construction.
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Pending writes in application order, for snapshots and tests.
    #[inline]
    pub fn pending(&self) -> &[PendingWrite] {
        &self.writes
    }

    /// Count a write the recompute phase dropped at pointer-decode time.
    /// The diagnostic is raised at the decode site, where the target is
    /// known; the counter lives here with the enqueue-time drops.
    #[inline]
    pub(crate) fn note_dropped(&mut self) {
        self.dropped += 1;
    }

    /// Append a write if its address is in range; otherwise drop it and
    /// raise a diagnostic. Returns whether the write was accepted.
    pub fn enqueue(&mut self, cfg: &GridConfig, index: usize, offset: u32, value: bool) -> bool {
        if index >= cfg.block_count() || offset >= cfg.block_width() {
            warn!(index, offset, value, "dropping out-of-range write");
            self.dropped += 1;
            return false;
        }
        self.writes.push(PendingWrite {
            index,
            offset,
            value,
        });
        true
    }

    /// Apply every queued write to memory in FIFO order, recording a dirty
    /// tally for each touched block, then clear the queue. Addresses were
    /// vetted at enqueue time, so application is infallible.
    pub fn commit(&mut self, cfg: &GridConfig, memory: &mut Memory, dirty: &mut DirtyMap) {
        trace!(writes = self.writes.len(), "commit");
        for w in self.writes.drain(..) {
            memory.set_field(w.index, w.offset, w.value);
            dirty.record(cfg, w.index, w.offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::WriteQueue;
    use crate::config::GridConfig;
    use crate::engine::dirty::DirtyMap;
    use crate::engine::memory::Memory;

    fn parts() -> (GridConfig, Memory, DirtyMap) {
        let cfg = GridConfig::default();
        let mem = Memory::new(cfg.block_count(), cfg.block_width());
        (cfg, mem, DirtyMap::new())
    }

    #[test]
    fn fifo_tie_break_last_write_wins() {
        let (cfg, mut mem, mut dirty) = parts();
        let mut q = WriteQueue::new();
        assert!(q.enqueue(&cfg, 5, 0, false));
        assert!(q.enqueue(&cfg, 5, 0, true));
        q.commit(&cfg, &mut mem, &mut dirty);
        assert!(mem.bit(5, 0));
        assert!(q.is_empty());
    }

    #[test]
    fn out_of_range_is_dropped_not_applied() {
        let (cfg, mut mem, mut dirty) = parts();
        let mut q = WriteQueue::new();
        assert!(!q.enqueue(&cfg, cfg.block_count(), 0, true));
        assert!(!q.enqueue(&cfg, 0, cfg.block_width(), true));
        assert_eq!(q.dropped(), 2);
        assert!(q.is_empty());

        // A valid write after a drop still commits normally.
        assert!(q.enqueue(&cfg, 0, 2, true));
        q.commit(&cfg, &mut mem, &mut dirty);
        assert!(mem.bit(0, 2));
    }

    #[test]
    fn commit_clears_the_queue() {
        let (cfg, mut mem, mut dirty) = parts();
        let mut q = WriteQueue::new();
        q.enqueue(&cfg, 1, 3, true);
        q.enqueue(&cfg, 2, 4, true);
        assert_eq!(q.len(), 2);
        q.commit(&cfg, &mut mem, &mut dirty);
        assert!(q.is_empty());
        assert!(mem.bit(1, 3));
        assert!(mem.bit(2, 4));
    }
}
