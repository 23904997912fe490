#![doc = r#"
Muxgrid library crate.

A minimal, self-modifying, bit-addressable computing substrate: a fixed
array of uniform blocks, each a ternary selector (`if ? then : else`) with
up to two fan-out destinations that may target *any* bit in memory,
including other blocks' selector and pointer bits. Writing a pointer's bits
reprograms where a block's output goes; writing a selector's bits
reprograms what it computes. Any boolean circuit (and, with feedback, any
sequential machine) can be laid out as a graph of such blocks.

Modules:
- config: layout parameters (offset/index field widths) and fatal validation
- codec: little-endian bit-field pack/unpack for the block layout
- engine: the synchronous update engine (facade + memory/queue/dirty/clock/snapshot)
- program: gate presets and the diff-driven block loader

All mutation goes through the engine's write queue: `program` and
`write_bit` enqueue, `run` commits and recomputes in lock-step ticks, and
snapshots are the only way back out.
"#]

pub mod codec;
pub mod config;
pub mod engine;
pub mod program;

// Re-export commonly used types at the crate root for convenience.
pub use codec::{Dest, Field};
pub use config::{ConfigError, GridConfig};
pub use engine::{BlockView, Engine, Outcome, RunSummary};
pub use program::{BlockProgram, Gate};
