/*!
Engine module: facade and focused submodules.

Overview
- `Engine` is the public facade owning all simulation state: the block
  arena, the latched register file, the pending-write queue, and the
  dirty-block map. External collaborators (circuit builders, input
  drivers, renderers, fuzzers) only ever call `program`, `write_bit`,
  `run`, and the snapshot accessors; there is no privileged bypass and
  no reference into the arena ever escapes.

Modules and responsibilities
- memory: packed block words and the latch file; the single `set_field`
  mutator used by the commit phase.
- queue: FIFO pending-write queue, range-checked `enqueue`, and the commit
  phase that applies a batch to memory while recording dirty tallies.
- dirty: per-block dirty buckets and the recompute phase (selector
  evaluation, latch barrier, next-cycle propagation).
- clock: the tick scheduler (`run`), bounded commit -> recompute loop.
- snapshot: decoded read-only per-block views and their `Display` rows.

One cycle is one commit plus one recompute, run to completion; external
writes may be interleaved between ticks but never land mid-tick (they sit
in the queue until the next commit).
*/

pub mod clock;
pub mod dirty;
pub mod memory;
pub mod queue;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use clock::{Outcome, RunSummary};
pub use dirty::{DirtyCounts, DirtyMap};
pub use memory::{Latches, Memory};
pub use queue::{PendingWrite, WriteQueue};
pub use snapshot::BlockView;

use crate::codec::Field;
use crate::config::{ConfigError, GridConfig};

/// The synchronous update engine: `2^index_bits` self-modifying mux blocks
/// plus the machinery that steps them.
pub struct Engine {
    pub(crate) config: GridConfig,
    pub(crate) memory: Memory,
    pub(crate) latches: Latches,
    pub(crate) queue: WriteQueue,
    pub(crate) dirty: DirtyMap,
    pub(crate) total_ticks: u64,
}

impl Engine {
    /// Construct an engine with all-zero memory. Fails (and allocates
    /// nothing) if the configuration violates the layout invariants.
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let block_count = config.block_count();
        Ok(Self {
            config,
            memory: Memory::new(block_count, config.block_width()),
            latches: Latches::new(block_count),
            queue: WriteQueue::new(),
            dirty: DirtyMap::new(),
            total_ticks: 0,
        })
    }

    /// The layout this engine was constructed with.
    #[inline]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Schedule a single bit write through the ordinary queue. The
    /// sanctioned path for external input signals; resolves the symbolic
    /// field name to an offset and enqueues for the next commit.
    pub fn write_bit(&mut self, index: usize, field: Field, value: bool) -> bool {
        let offset = field.offset(&self.config);
        self.queue.enqueue(&self.config, index, offset, value)
    }

    /// Execute up to `max_ticks` commit -> recompute cycles; see
    /// [`clock::run`].
    pub fn run(&mut self, max_ticks: u64) -> RunSummary {
        clock::run(self, max_ticks)
    }

    /// Number of writes waiting for the next commit.
    #[inline]
    pub fn pending_writes(&self) -> usize {
        self.queue.len()
    }

    /// Writes dropped so far by range checks (enqueue-time or pointer
    /// decode). Diagnostic only; drops never abort a phase.
    #[inline]
    pub fn dropped_writes(&self) -> u64 {
        self.queue.dropped()
    }

    /// Cumulative ticks executed since construction.
    #[inline]
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Read one stored bit of a block. Read-only; external input must go
    /// through [`Engine::write_bit`]. Panics if `index` is out of range;
    /// like [`Engine::block_view`], this accessor is for callers that
    /// already hold a valid index.
    #[inline]
    pub fn bit(&self, index: usize, field: Field) -> bool {
        self.memory.bit(index, field.offset(&self.config))
    }

    /// A block's latched output: the value downstream blocks currently
    /// react to. Panics if `index` is out of range, like
    /// [`Engine::block_view`].
    #[inline]
    pub fn latched(&self, index: usize) -> bool {
        self.latches.get(index)
    }
}
