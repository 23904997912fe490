/*!
Bit-field codec: pack and unpack the fixed block layout.

Block layout (bit 0 is the least-significant bit of the word):
- bit 0: `select_if`
- bit 1: `select_then`
- bit 2: `select_else`
- next `offset_bits`: `dest1.offset` (little-endian)
- next `index_bits`: `dest1.index`
- next `offset_bits`: `dest2.offset`
- next `index_bits`: `dest2.index`

All functions here are pure and total: decoding never fails for an in-range
block word, and encoding silently truncates a value to its field width.
Range validation of *decoded target addresses* is the recompute phase's
job, not the codec's.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{GridConfig, SELECTOR_BITS};

/// Field offset of `select_if` within a block.
pub const OFFSET_IF: u32 = 0;
/// Field offset of `select_then` within a block.
pub const OFFSET_THEN: u32 = 1;
/// Field offset of `select_else` within a block.
pub const OFFSET_ELSE: u32 = 2;

/// A decoded destination pointer: which bit (`offset`) of which block
/// (`index`) the owning block's output is copied to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dest {
    pub offset: u32,
    pub index: usize,
}

impl Dest {
    pub const fn new(offset: u32, index: usize) -> Self {
        Self { offset, index }
    }

    /// `(0, 0)` is reserved as "no destination"; the recompute phase never
    /// writes through it.
    #[inline]
    pub fn is_sentinel(&self) -> bool {
        self.offset == 0 && self.index == 0
    }
}

/// First bit of the `dest1` pointer field.
#[inline]
pub fn dest1_base(_cfg: &GridConfig) -> u32 {
    SELECTOR_BITS
}

/// First bit of the `dest2` pointer field.
#[inline]
pub fn dest2_base(cfg: &GridConfig) -> u32 {
    SELECTOR_BITS + cfg.dest_width()
}

/// Extract `width` bits of `word` starting at bit `lo`, little-endian.
#[inline]
fn extract(word: u64, lo: u32, width: u32) -> u64 {
    (word >> lo) & ((1u64 << width) - 1)
}

/// Encode `value` into `width` bits at bit `lo`, truncating to `width`.
#[inline]
fn insert(value: u64, lo: u32, width: u32) -> u64 {
    (value & ((1u64 << width) - 1)) << lo
}

/// Decode the first destination pointer of a block word.
#[inline]
pub fn decode_dest1(cfg: &GridConfig, word: u64) -> Dest {
    let base = dest1_base(cfg);
    Dest {
        offset: extract(word, base, cfg.offset_bits) as u32,
        index: extract(word, base + cfg.offset_bits, cfg.index_bits) as usize,
    }
}

/// Decode the second destination pointer of a block word.
#[inline]
pub fn decode_dest2(cfg: &GridConfig, word: u64) -> Dest {
    let base = dest2_base(cfg);
    Dest {
        offset: extract(word, base, cfg.offset_bits) as u32,
        index: extract(word, base + cfg.offset_bits, cfg.index_bits) as usize,
    }
}

/// Encode both destination pointers (selector bits left clear). Values are
/// truncated to their field widths.
pub fn encode_dests(cfg: &GridConfig, dest1: Dest, dest2: Dest) -> u64 {
    let b1 = dest1_base(cfg);
    let b2 = dest2_base(cfg);
    insert(dest1.offset as u64, b1, cfg.offset_bits)
        | insert(dest1.index as u64, b1 + cfg.offset_bits, cfg.index_bits)
        | insert(dest2.offset as u64, b2, cfg.offset_bits)
        | insert(dest2.index as u64, b2 + cfg.offset_bits, cfg.index_bits)
}

/// Symbolic name of a bit within a block, as used by external I/O. Resolves
/// to a concrete field offset via [`Field::offset`]; a pointer-bit name past
/// the pointer field's width resolves to an out-of-range offset and is
/// dropped by the queue's range check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    If,
    Then,
    Else,
    /// Bit `n` of the first destination pointer (offset bits first, then
    /// index bits, little-endian within each).
    Dest1Bit(u32),
    /// Bit `n` of the second destination pointer.
    Dest2Bit(u32),
}

impl Field {
    /// Resolve the symbolic name to a field offset within a block. The
    /// addition saturates, so an absurd pointer-bit name stays out of
    /// range rather than wrapping onto a selector bit.
    #[inline]
    pub fn offset(&self, cfg: &GridConfig) -> u32 {
        match *self {
            Field::If => OFFSET_IF,
            Field::Then => OFFSET_THEN,
            Field::Else => OFFSET_ELSE,
            Field::Dest1Bit(n) => dest1_base(cfg).saturating_add(n),
            Field::Dest2Bit(n) => dest2_base(cfg).saturating_add(n),
        }
    }
}
