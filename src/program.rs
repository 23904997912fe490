/*!
Program loader: turn a high-level block description into bit writes.

A `BlockProgram` names a selector truth table (usually one of the gate
presets below) and one or two fan-out destinations. Loading it diffs the
desired bit pattern against the block's currently stored bits and enqueues
only the bits that differ, through the same queue every other write takes.
Loading a program is therefore indistinguishable from any other write
source, and fully composable with self-modification: a block's own output
may later overwrite another block's (or its own) program through the
ordinary write path.

The presets are conventions over the 3-bit selector encoding, not opcodes.
With the block's latched input arriving on `select_if`:
- `NOT`:    `in ? 0 : 1`
- `FANOUT`: `in ? 1 : 0` (a delayed copy; also `OR` with a constant 0 arm)
- `AND`/`MUX`/`ADJUNCT`: all-zero tables whose `then`/`else` arms are
  wired at runtime by upstream blocks.
*/

use tracing::warn;

use crate::codec::{self, Dest, OFFSET_ELSE, OFFSET_IF, OFFSET_THEN};
use crate::config::GridConfig;
use crate::engine::Engine;

/// A selector truth table: the three bits loaded into `select_if`,
/// `select_then`, `select_else`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gate {
    pub select_if: bool,
    pub select_then: bool,
    pub select_else: bool,
}

pub const NOT: Gate = Gate {
    select_if: false,
    select_then: false,
    select_else: true,
};
pub const AND: Gate = Gate {
    select_if: false,
    select_then: false,
    select_else: false,
};
pub const OR: Gate = Gate {
    select_if: false,
    select_then: true,
    select_else: false,
};
pub const IMPLY: Gate = Gate {
    select_if: false,
    select_then: false,
    select_else: true,
};
pub const ADJUNCT: Gate = Gate {
    select_if: false,
    select_then: false,
    select_else: false,
};
pub const FANOUT: Gate = Gate {
    select_if: false,
    select_then: true,
    select_else: false,
};
pub const MUX: Gate = Gate {
    select_if: false,
    select_then: false,
    select_else: false,
};

/// Desired state for one block: a gate plus one or two destinations. A
/// missing second destination encodes as the all-zero sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockProgram {
    pub gate: Gate,
    pub dest1: Dest,
    pub dest2: Option<Dest>,
}

impl BlockProgram {
    pub fn new(gate: Gate, dest1: Dest) -> Self {
        Self {
            gate,
            dest1,
            dest2: None,
        }
    }

    pub fn with_dest2(mut self, dest2: Dest) -> Self {
        self.dest2 = Some(dest2);
        self
    }

    /// The full desired bit pattern for a block holding this program.
    /// Destination values are truncated to their field widths by the codec.
    pub fn to_word(&self, cfg: &GridConfig) -> u64 {
        let mut word = codec::encode_dests(cfg, self.dest1, self.dest2.unwrap_or_default());
        if self.gate.select_if {
            word |= 1 << OFFSET_IF;
        }
        if self.gate.select_then {
            word |= 1 << OFFSET_THEN;
        }
        if self.gate.select_else {
            word |= 1 << OFFSET_ELSE;
        }
        word
    }
}

impl Engine {
    /// Load `program` into block `index`: diff the desired pattern against
    /// the stored bits and enqueue only the bits that differ. Returns the
    /// number of writes enqueued (zero when the block already matches).
    ///
    /// An out-of-range `index` drops the whole program with one diagnostic.
    pub fn program(&mut self, index: usize, program: BlockProgram) -> usize {
        if index >= self.memory.len() {
            warn!(index, "dropping program for out-of-range block");
            self.queue.note_dropped();
            return 0;
        }
        let desired = program.to_word(&self.config);
        let stored = self.memory.word(index);
        let mut enqueued = 0;
        for offset in 0..self.config.block_width() {
            let want = (desired >> offset) & 1 != 0;
            let have = (stored >> offset) & 1 != 0;
            if have != want {
                self.queue.enqueue(&self.config, index, offset, want);
                enqueued += 1;
            }
        }
        enqueued
    }
}
