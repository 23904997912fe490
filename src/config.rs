/*!
Grid configuration: the two width parameters that fix the block layout.

A block is `3 + 2 * (offset_bits + index_bits)` bits wide: three selector
bits followed by two destination pointers, each an `offset_bits`-wide field
offset plus an `index_bits`-wide block index. Total memory is
`2^index_bits` blocks.

Validation happens once, at engine construction; a configuration whose
offset field cannot name every bit in a block is rejected outright, before
any simulation state is allocated.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of selector bits at the head of every block (`if`, `then`, `else`).
pub const SELECTOR_BITS: u32 = 3;

/// Errors detected when validating a [`GridConfig`]. All are fatal: the
/// engine refuses to construct.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `2^offset_bits < block_width`: the offset field cannot address every
    /// bit in a block, so some selector/pointer bits would be unreachable.
    #[error("offset field of {offset_bits} bits cannot address all {block_width} bits of a block")]
    OffsetFieldTooNarrow { offset_bits: u32, block_width: u32 },
    /// Zero-width offset or index fields leave no addressable bits/blocks.
    #[error("offset_bits and index_bits must both be nonzero")]
    ZeroWidthField,
    /// Blocks are stored one per 64-bit word; wider layouts are unsupported.
    #[error("block width {block_width} exceeds the 64-bit word limit")]
    BlockTooWide { block_width: u32 },
}

/// Layout parameters for a mux grid.
///
/// `offset_bits` is the width of a destination pointer's bit-offset field;
/// `index_bits` is the width of its block-index field (and thus fixes the
/// memory size at `2^index_bits` blocks).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridConfig {
    pub offset_bits: u32,
    pub index_bits: u32,
}

impl Default for GridConfig {
    /// The 25-bit block / 64-block layout: 5 offset bits, 6 index bits.
    fn default() -> Self {
        Self {
            offset_bits: 5,
            index_bits: 6,
        }
    }
}

impl GridConfig {
    pub fn new(offset_bits: u32, index_bits: u32) -> Self {
        Self {
            offset_bits,
            index_bits,
        }
    }

    /// Total width of one block in bits.
    #[inline]
    pub fn block_width(&self) -> u32 {
        SELECTOR_BITS + 2 * (self.offset_bits + self.index_bits)
    }

    /// Number of blocks in memory (`2^index_bits`). Assumes a config that
    /// passes [`GridConfig::validate`]; the layout invariants bound
    /// `index_bits` far below the shift width.
    #[inline]
    pub fn block_count(&self) -> usize {
        debug_assert!(self.index_bits < usize::BITS);
        1usize << self.index_bits
    }

    /// Width of one destination pointer (offset field plus index field).
    #[inline]
    pub fn dest_width(&self) -> u32 {
        self.offset_bits + self.index_bits
    }

    /// Check the layout invariants. Called by the engine constructor; a
    /// failure here means no simulation state is ever allocated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.offset_bits == 0 || self.index_bits == 0 {
            return Err(ConfigError::ZeroWidthField);
        }
        let block_width = self.block_width();
        if block_width > 64 {
            return Err(ConfigError::BlockTooWide { block_width });
        }
        // block_width <= 64 bounds offset_bits well below 32, so the shift
        // cannot overflow here.
        if (1u32 << self.offset_bits) < block_width {
            return Err(ConfigError::OffsetFieldTooNarrow {
                offset_bits: self.offset_bits,
                block_width,
            });
        }
        Ok(())
    }
}
