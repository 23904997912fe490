use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::codec::{Dest, Field};
use crate::config::GridConfig;
use crate::engine::{Engine, Outcome};
use crate::program::{BlockProgram, FANOUT, MUX, NOT};

/// Build the 2-input XOR circuit from the demo layout:
///
/// - block 1 fans input `a` out to blocks 4 and 5 (one tick delay)
/// - block 2 fans input `b` out to block 3
/// - block 3 re-fans `b` into the mux's `if` arm (two ticks total)
/// - block 4 copies `a` into the mux's `else` arm
/// - block 5 inverts `a` into the mux's `then` arm
/// - block 6 is the mux: `b ? !a : a` = `a XOR b`, fanned to block 7
/// - block 7 latches the result (write-only sink, sentinel destination)
///
/// Inputs land on block 1's and block 2's `select_if`; the result converges
/// on block 7's `select_if` after four ticks.
fn build_xor(engine: &mut Engine) {
    engine.program(
        1,
        BlockProgram::new(FANOUT, Dest::new(0, 4)).with_dest2(Dest::new(0, 5)),
    );
    engine.program(2, BlockProgram::new(FANOUT, Dest::new(0, 3)));
    engine.program(3, BlockProgram::new(FANOUT, Dest::new(0, 6)));
    engine.program(4, BlockProgram::new(FANOUT, Dest::new(2, 6)));
    engine.program(5, BlockProgram::new(NOT, Dest::new(1, 6)));
    engine.program(6, BlockProgram::new(MUX, Dest::new(0, 7)));
    engine.program(7, BlockProgram::new(FANOUT, Dest::new(0, 0)));

    // Propagate the programming writes until the circuit settles.
    let settle = engine.run(8);
    assert_eq!(settle.outcome, Outcome::Quiescent);
}

fn set_inputs(engine: &mut Engine, a: bool, b: bool) {
    engine.write_bit(1, Field::If, a);
    engine.write_bit(2, Field::If, b);
}

#[test]
fn xor_one_zero_converges_to_one_in_four_ticks() {
    let mut engine = Engine::new(GridConfig::default()).unwrap();
    build_xor(&mut engine);

    set_inputs(&mut engine, true, false);
    let summary = engine.run(4);
    assert_eq!(summary.ticks, 4);
    assert_eq!(summary.outcome, Outcome::Quiescent);
    assert!(engine.bit(7, Field::If));
}

#[test]
fn xor_one_one_converges_to_zero() {
    let mut engine = Engine::new(GridConfig::default()).unwrap();
    build_xor(&mut engine);

    set_inputs(&mut engine, true, true);
    let summary = engine.run(4);
    assert_eq!(summary.outcome, Outcome::Quiescent);
    assert!(!engine.bit(7, Field::If));
}

#[test]
fn xor_tracks_an_input_sequence() {
    let mut engine = Engine::new(GridConfig::default()).unwrap();
    build_xor(&mut engine);

    for (a, b) in [
        (true, false),
        (false, false),
        (false, true),
        (true, true),
        (true, false),
    ] {
        set_inputs(&mut engine, a, b);
        engine.run(4);
        assert_eq!(engine.bit(7, Field::If), a ^ b, "inputs a={a} b={b}");
    }
}

#[test]
fn self_inverting_block_oscillates_forever() {
    let mut engine = Engine::new(GridConfig::default()).unwrap();
    // NOT gate whose sole destination is its own select_if.
    engine.program(8, BlockProgram::new(NOT, Dest::new(0, 8)));

    let summary = engine.run(1000);
    assert_eq!(summary.ticks, 1000);
    assert_eq!(summary.outcome, Outcome::BudgetExhausted);
    assert!(engine.pending_writes() > 0);

    // The input bit alternates every tick.
    let mut previous = engine.bit(8, Field::If);
    for _ in 0..16 {
        engine.run(1);
        let current = engine.bit(8, Field::If);
        assert_ne!(current, previous);
        previous = current;
    }
}

#[test]
fn out_of_range_destination_offset_is_dropped_during_run() {
    let mut engine = Engine::new(GridConfig::default()).unwrap();
    // Offset 30 fits the 5-bit offset field but is past the 25-bit block.
    engine.program(1, BlockProgram::new(FANOUT, Dest::new(30, 2)));
    engine.run(8);

    engine.write_bit(1, Field::If, true);
    let summary = engine.run(8);
    assert_eq!(summary.outcome, Outcome::Quiescent);
    assert!(engine.dropped_writes() > 0);
    // The would-be target block was never touched.
    assert_eq!(engine.block_view(2), Engine::new(GridConfig::default()).unwrap().block_view(2));
}

#[test]
fn destination_index_at_memory_size_truncates_harmlessly() {
    let mut engine = Engine::new(GridConfig::default()).unwrap();
    // Index 64 == block count; the 6-bit index field truncates it to 0,
    // which together with offset 0 is the sentinel. Nothing is written.
    engine.program(1, BlockProgram::new(FANOUT, Dest::new(0, 64)));
    engine.run(8);

    engine.write_bit(1, Field::If, true);
    engine.run(8);
    assert_eq!(engine.block_view(1).dest1, Dest::new(0, 0));
    assert!(!engine.bit(0, Field::If));
}

#[test]
fn sentinel_destinations_never_produce_writes() {
    let mut engine = Engine::new(GridConfig::default()).unwrap();
    // Both destinations left at (0,0); flip the selector bits around.
    for value in [true, false, true] {
        engine.write_bit(5, Field::If, value);
        engine.write_bit(5, Field::Else, !value);
        let summary = engine.run(8);
        // One commit for the inputs, then nothing follows.
        assert_eq!(summary.ticks, 1);
    }
    assert_eq!(engine.dropped_writes(), 0);
}

#[test]
fn external_writes_between_ticks_share_the_ordinary_path() {
    let mut engine = Engine::new(GridConfig::default()).unwrap();
    engine.write_bit(3, Field::Dest1Bit(0), true); // dest1.offset bit 0
    engine.write_bit(3, Field::Dest1Bit(5), true); // dest1.index bit 0
    assert_eq!(engine.pending_writes(), 2);
    engine.run(8);
    assert_eq!(engine.block_view(3).dest1, Dest::new(1, 1));
}

#[test]
fn pointer_bit_name_past_the_block_is_dropped() {
    let mut engine = Engine::new(GridConfig::default()).unwrap();
    assert!(!engine.write_bit(3, Field::Dest2Bit(11), true));
    assert_eq!(engine.dropped_writes(), 1);
    assert_eq!(engine.pending_writes(), 0);

    // Offset resolution must not wrap an absurd bit name back into the
    // block: the write is dropped, and no stored bit changes.
    assert!(!engine.write_bit(3, Field::Dest1Bit(u32::MAX), true));
    assert!(!engine.write_bit(3, Field::Dest2Bit(u32::MAX - 10), true));
    assert_eq!(engine.dropped_writes(), 3);
    assert_eq!(engine.pending_writes(), 0);
    assert!(!engine.bit(3, Field::Else));
}

/// A block reprogramming another block's pointer through its own output:
/// self-modification goes through the same queue as everything else.
#[test]
fn block_output_can_rewrite_another_blocks_pointer() {
    let mut engine = Engine::new(GridConfig::default()).unwrap();
    // Block 1 fans its input into bit 0 of block 2's dest1 offset field.
    engine.program(1, BlockProgram::new(FANOUT, Dest::new(3, 2)));
    // Block 2 starts pointing at block 9's select_if.
    engine.program(2, BlockProgram::new(FANOUT, Dest::new(0, 9)));
    engine.run(8);

    engine.write_bit(1, Field::If, true);
    engine.run(8);
    // Block 2's dest1 offset gained its low bit: now select_then of 9.
    assert_eq!(engine.block_view(2).dest1, Dest::new(1, 9));
}

#[test]
fn random_write_storm_survives_bounded_run() {
    let mut engine = Engine::new(GridConfig::default()).unwrap();
    build_xor(&mut engine);
    engine.program(8, BlockProgram::new(NOT, Dest::new(0, 8)));

    // Splatter random values across every bit of every block, then run a
    // long bounded batch. Whatever circuit emerges must neither panic nor
    // escape the arena.
    let mut rng = StdRng::seed_from_u64(0x1f7e15e);
    let cfg = *engine.config();
    for index in 0..cfg.block_count() {
        for offset in 0..cfg.block_width() {
            let field = offset_to_field(&cfg, offset);
            engine.write_bit(index, field, rng.r#gen());
        }
    }
    engine.run(4000);
    assert_eq!(engine.snapshot().len(), cfg.block_count());
}

fn offset_to_field(cfg: &GridConfig, offset: u32) -> Field {
    match offset {
        0 => Field::If,
        1 => Field::Then,
        2 => Field::Else,
        o if o < 3 + cfg.dest_width() => Field::Dest1Bit(o - 3),
        o => Field::Dest2Bit(o - 3 - cfg.dest_width()),
    }
}

/// One externally driven step: a batch of bit writes followed by a bounded
/// run.
#[derive(Clone, Debug)]
struct Step {
    writes: Vec<(usize, u32, bool)>,
    ticks: u64,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    let write = (0usize..64, 0u32..25, any::<bool>());
    (proptest::collection::vec(write, 0..8), 0u64..6).prop_map(|(writes, ticks)| Step { writes, ticks })
}

proptest! {
    /// Two independent engines fed the same external write/tick sequence
    /// end with identical memory, latches, and queue lengths.
    #[test]
    fn identical_runs_are_deterministic(steps in proptest::collection::vec(step_strategy(), 0..12)) {
        let cfg = GridConfig::default();
        let mut left = Engine::new(cfg).unwrap();
        let mut right = Engine::new(cfg).unwrap();

        for step in &steps {
            for &(index, offset, value) in &step.writes {
                let field = offset_to_field(&cfg, offset);
                left.write_bit(index, field, value);
                right.write_bit(index, field, value);
            }
            left.run(step.ticks);
            right.run(step.ticks);
        }

        prop_assert_eq!(left.snapshot(), right.snapshot());
        prop_assert_eq!(left.pending_writes(), right.pending_writes());
        prop_assert_eq!(left.total_ticks(), right.total_ticks());
    }
}
