/*!
Tick scheduler: drives repeated commit -> recompute cycles.

One tick is one commit phase followed by one recompute phase, run to
completion before the next begins. A tick is only started while the write
queue is non-empty, so stopping between ticks never leaves in-flight state
behind.

Quiescence is not guaranteed: a block wired back into its own selector is
a perfectly valid clock generator and toggles forever. Running out of
budget is therefore an expected outcome, not an error; callers needing
bounded execution pass a finite `max_ticks`.
*/

use tracing::trace;

use crate::engine::Engine;

/// Why a `run` call returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The write queue drained; the simulation has stabilized.
    Quiescent,
    /// `max_ticks` elapsed with writes still pending.
    BudgetExhausted,
}

/// Result of a `run` call: how many ticks actually executed and whether
/// the grid settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub outcome: Outcome,
}

/// Execute up to `max_ticks` commit -> recompute cycles, stopping early if
/// the queue drains. Delegated to by [`Engine::run`].
pub fn run(engine: &mut Engine, max_ticks: u64) -> RunSummary {
    let mut ticks = 0;
    while ticks < max_ticks && !engine.queue.is_empty() {
        engine
            .queue
            .commit(&engine.config, &mut engine.memory, &mut engine.dirty);
        crate::engine::dirty::recompute(
            &engine.config,
            &engine.memory,
            &mut engine.latches,
            &mut engine.dirty,
            &mut engine.queue,
        );
        ticks += 1;
        engine.total_ticks += 1;
    }
    let outcome = if engine.queue.is_empty() {
        Outcome::Quiescent
    } else {
        Outcome::BudgetExhausted
    };
    trace!(ticks, ?outcome, "run finished");
    RunSummary { ticks, outcome }
}
