/*!
Memory module: the block arena and the latched register file.

Each block is stored as one 64-bit word whose bit `i` is field offset `i`
of the block (see `codec` for the layout). The register file holds one
latched output bit per block: the value downstream blocks have already
reacted to, one cycle behind the combinational selector result.

Both structures are owned by the engine and mutated only through the
commit phase (`set_field`) and the recompute phase's barriered latch
updates. Callers are required to range-check `index`/`offset` before
invoking the mutators; a decoded target address must never reach this
module unvalidated.
*/

use crate::codec::{OFFSET_ELSE, OFFSET_IF, OFFSET_THEN};

/// The block arena: `block_count` packed words of `block_width` bits each.
pub struct Memory {
    words: Vec<u64>,
    block_width: u32,
}

impl Memory {
    /// Allocate `block_count` all-zero blocks of `block_width` bits.
    pub fn new(block_count: usize, block_width: u32) -> Self {
        Self {
            words: vec![0; block_count],
            block_width,
        }
    }

    /// Number of blocks.
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Width of one block in bits.
    #[inline]
    pub fn block_width(&self) -> u32 {
        self.block_width
    }

    /// The full packed word of a block. Used by the codec and snapshots.
    #[inline]
    pub fn word(&self, index: usize) -> u64 {
        self.words[index]
    }

    /// Read one bit of a block.
    #[inline]
    pub fn bit(&self, index: usize, offset: u32) -> bool {
        debug_assert!(offset < self.block_width);
        (self.words[index] >> offset) & 1 != 0
    }

    /// Write one bit of a block. The sole mutator; only the commit phase
    /// calls it, after the queue's range check has vetted the address.
    #[inline]
    pub fn set_field(&mut self, index: usize, offset: u32, value: bool) {
        debug_assert!(index < self.words.len());
        debug_assert!(offset < self.block_width);
        let mask = 1u64 << offset;
        if value {
            self.words[index] |= mask;
        } else {
            self.words[index] &= !mask;
        }
    }

    /// Evaluate a block's selector from its current, committed field
    /// values: `select_if ? select_then : select_else`.
    #[inline]
    pub fn evaluate(&self, index: usize) -> bool {
        if self.bit(index, OFFSET_IF) {
            self.bit(index, OFFSET_THEN)
        } else {
            self.bit(index, OFFSET_ELSE)
        }
    }
}

/// One latched output bit per block.
pub struct Latches {
    bits: Vec<bool>,
}

impl Latches {
    pub fn new(block_count: usize) -> Self {
        Self {
            bits: vec![false; block_count],
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> bool {
        self.bits[index]
    }

    /// Explicit assignment. The recompute phase buffers its updates and
    /// applies them through here as a barrier after all comparisons.
    #[inline]
    pub fn set(&mut self, index: usize, value: bool) {
        self.bits[index] = value;
    }

    /// Read-only view of all latches, for snapshots and tests.
    #[inline]
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }
}

#[cfg(test)]
mod tests {
    use super::{Latches, Memory};

    #[test]
    fn starts_all_zero() {
        let m = Memory::new(64, 25);
        assert_eq!(m.len(), 64);
        assert!((0..64).all(|i| m.word(i) == 0));
    }

    #[test]
    fn set_and_clear_bits() {
        let mut m = Memory::new(4, 25);
        m.set_field(2, 0, true);
        m.set_field(2, 24, true);
        assert!(m.bit(2, 0));
        assert!(m.bit(2, 24));
        assert_eq!(m.word(2), 1 | (1 << 24));

        m.set_field(2, 0, false);
        assert!(!m.bit(2, 0));
        assert!(m.bit(2, 24));

        // Writing the stored value again is a no-op.
        m.set_field(2, 24, true);
        assert_eq!(m.word(2), 1 << 24);
    }

    #[test]
    fn selector_evaluation() {
        let mut m = Memory::new(1, 25);
        // if=0 -> else
        m.set_field(0, 2, true);
        assert!(m.evaluate(0));
        // if=1 -> then (which is 0)
        m.set_field(0, 0, true);
        assert!(!m.evaluate(0));
        m.set_field(0, 1, true);
        assert!(m.evaluate(0));
    }

    #[test]
    fn latches_assign() {
        let mut l = Latches::new(3);
        l.set(1, true);
        assert!(!l.get(0));
        assert!(l.get(1));
        l.set(1, true);
        assert!(l.get(1));
        l.set(1, false);
        assert!(!l.get(1));
    }
}
