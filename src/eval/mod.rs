//! # Evaluation Module
//!
//! Converts a `Board` into a single integer score from Max's perspective
//! (positive = Max advantage). Two heuristics exist and a run uses exactly one:
//!
//! 1. **Dynamic**: weighted parity, mobility and stability signals.
//! 2. **Static**: a fixed per-cell weight table dotted with the board.
//!
//! Both give a terminal position (no moves for either side) the same
//! finality-biased score so that a proven result always outranks an estimate.

pub mod heuristic;
pub mod weights;

pub use heuristic::{evaluate, stable_disc_count, DynamicEvaluator};
pub use weights::{evaluate_static, partial_sum, StaticEvaluator, WeightTable};

use crate::core::Board;
use crate::logic::disc_count;
use std::time::Duration;

/// Offset added to the disc differential of a finished game. Every
/// non-terminal score stays well inside this bound.
pub const FINAL_SCORE_OFFSET: i32 = 30000;

/// Common interface for the evaluation strategies.
pub trait Evaluator: Send {
    /// Score `board` from Max's perspective.
    fn evaluate(&mut self, board: &Board) -> i32;

    /// Evaluator name for logs.
    fn name(&self) -> &str;

    /// Communication/compute time spent so far, for evaluators that talk to
    /// other participants. Resets the counters.
    fn take_timing(&mut self) -> Option<EvalTiming> {
        None
    }

    /// Release whatever the evaluator holds on to and report errors it
    /// swallowed while evaluating.
    fn shutdown(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Time split of a cooperative evaluator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalTiming {
    pub evaluations: u64,
    pub comm_time: Duration,
    pub comp_time: Duration,
}

/// Score of a finished game: disc differential pushed out by
/// `FINAL_SCORE_OFFSET` in the direction of the winner, 0 on a draw.
pub fn final_score(board: &Board) -> i32 {
    let (max, min) = disc_count(board);
    finalize_differential(max - min)
}

pub fn finalize_differential(diff: i32) -> i32 {
    diff + diff.signum() * FINAL_SCORE_OFFSET
}
