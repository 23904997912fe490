use muxgrid::{BlockProgram, Dest, Engine, Field, GridConfig};
use muxgrid::program::{FANOUT, MUX, NOT};

/// Lay out the demo circuit: a 2-input XOR pipeline on blocks 1-7 plus a
/// free-running inverter on block 8.
///
/// Stage by stage (one tick of delay per hop):
/// - 1: fan `a` out to 4 and 5
/// - 2: fan `b` out to 3
/// - 3: re-fan `b` into the mux's `if` arm
/// - 4: copy `a` into the mux's `else` arm
/// - 5: invert `a` into the mux's `then` arm
/// - 6: mux `b ? !a : a`, i.e. `a XOR b`, into block 7
/// - 7: write-only sink holding the result on its `if` bit
/// - 8: NOT feeding its own `if` bit: a clock generator, never quiescent
fn build_circuit(engine: &mut Engine) {
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
    engine.program(8, BlockProgram::new(NOT, Dest::new(0, 8)));
}

fn dump(engine: &Engine, rows: usize) {
    for view in engine.snapshot().into_iter().take(rows) {
        println!("{view}");
    }
}

fn main() {
    tracing_subscriber::fmt().init();

    let mut engine = Engine::new(GridConfig::default()).expect("default layout is valid");

    build_circuit(&mut engine);
    engine.run(4);

    // Drive the XOR inputs through the one sanctioned external path.
    for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
        engine.write_bit(1, Field::If, a);
        engine.write_bit(2, Field::If, b);
        engine.run(4);
        println!(
            "a={} b={} -> xor={}  (oscillator={})",
            a as u8,
            b as u8,
            engine.bit(7, Field::If) as u8,
            engine.bit(8, Field::If) as u8,
        );
    }

    println!();
    dump(&engine, 10);
    println!(
        "ran {} ticks total, {} writes pending, {} dropped",
        engine.total_ticks(),
        engine.pending_writes(),
        engine.dropped_writes(),
    );
}
