/*!
Read-only decoded views of memory, for rendering and debugging.

A `BlockView` is a decoded copy of one block: its three selector bits,
both destination pointers, and the latched output. Views are plain values
detached from the engine; nothing here can mutate simulation state.

`Display` renders the row shape used by memory dumps:
`[ 6] 0 ? 1 : 0 -> (7:0, 0:0) = 1`.
*/

use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::codec::{self, Dest, OFFSET_ELSE, OFFSET_IF, OFFSET_THEN};
use crate::engine::Engine;

/// Decoded, read-only copy of one block plus its latched output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BlockView {
    pub index: usize,
    pub select_if: bool,
    pub select_then: bool,
    pub select_else: bool,
    pub dest1: Dest,
    pub dest2: Dest,
    /// The latched register value: what downstream blocks currently see.
    pub latched: bool,
}

impl fmt::Display for BlockView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:2}] {} ? {} : {} -> ({}:{}, {}:{}) = {}",
            self.index,
            self.select_if as u8,
            self.select_then as u8,
            self.select_else as u8,
            self.dest1.index,
            self.dest1.offset,
            self.dest2.index,
            self.dest2.offset,
            self.latched as u8,
        )
    }
}

impl Engine {
    /// Decoded view of one block. Panics if `index` is out of range; this
    /// accessor is for callers that already hold a valid index (e.g. from
    /// iterating `snapshot`).
    pub fn block_view(&self, index: usize) -> BlockView {
        let word = self.memory.word(index);
        BlockView {
            index,
            select_if: self.memory.bit(index, OFFSET_IF),
            select_then: self.memory.bit(index, OFFSET_THEN),
            select_else: self.memory.bit(index, OFFSET_ELSE),
            dest1: codec::decode_dest1(&self.config, word),
            dest2: codec::decode_dest2(&self.config, word),
            latched: self.latches.get(index),
        }
    }

    /// Decoded views of every block, in index order.
    pub fn snapshot(&self) -> Vec<BlockView> {
        (0..self.memory.len()).map(|i| self.block_view(i)).collect()
    }
}
