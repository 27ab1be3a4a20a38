use super::error::ClusterError;
use super::pool::WorkerPool;
use super::protocol::{WorkerRequest, WorkerResponse};
use crate::config::EvalParams;
use crate::core::Board;
use crate::eval::{
    evaluate_static, finalize_differential, partial_sum, EvalTiming, Evaluator, WeightTable,
};
use crate::logic::is_terminal;
use crate::search::CancellationToken;
use crate::stats::WorkerSummary;
use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Contiguous cell ranges for `participants` participants. The first
/// `cells % participants` ranges are one cell longer.
pub fn split_cells(cells: usize, participants: usize) -> Vec<Range<usize>> {
    let participants = participants.max(1);
    let base = cells / participants;
    let extra = cells % participants;
    let mut start = 0;
    (0..participants)
        .map(|p| {
            let len = base + usize::from(p < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

/// Static evaluation scattered over the coordinator (participant 0) and a
/// pool of workers, then reduced by summing the partial sums.
///
/// If the pool breaks the evaluator keeps answering locally and reports the
/// error from `shutdown`.
pub struct ParallelStaticEvaluator {
    pool: WorkerPool,
    table: Arc<WeightTable>,
    timing: EvalTiming,
    failure: Option<ClusterError>,
}

impl ParallelStaticEvaluator {
    pub fn new(params: Arc<EvalParams>, width: usize, height: usize, workers: usize) -> Self {
        let table = Arc::new(WeightTable::new(&params, width, height));
        let pool = WorkerPool::spawn(workers, params, width, height, CancellationToken::new());
        Self {
            pool,
            table,
            timing: EvalTiming::default(),
            failure: None,
        }
    }

    pub fn workers(&self) -> usize {
        self.pool.len()
    }

    pub fn try_evaluate(&mut self, board: &Board) -> Result<i32, ClusterError> {
        let started = Instant::now();
        let cells = board.cells();
        let weights = self.table.weights();
        let is_final = is_terminal(board);
        let parts = split_cells(cells.len(), self.pool.len() + 1);

        for (worker, range) in parts[1..].iter().enumerate() {
            self.pool.send(
                worker,
                WorkerRequest::Evaluate {
                    cells: cells[range.clone()].to_vec(),
                    offset: range.start,
                    is_final,
                },
            )?;
        }

        let own = Instant::now();
        let mut total = partial_sum(&cells[parts[0].clone()], weights, parts[0].start, is_final);
        let mut compute = own.elapsed();

        let mut slowest = Duration::ZERO;
        for _ in 1..parts.len() {
            match self.pool.recv()? {
                WorkerResponse::Partial {
                    sum, compute_time, ..
                } => {
                    total += sum;
                    slowest = slowest.max(compute_time);
                }
                other => {
                    return Err(ClusterError::UnexpectedMessage {
                        worker: other.worker(),
                        got: other.kind(),
                    })
                }
            }
        }
        compute = compute.max(slowest);

        if is_final {
            total = finalize_differential(total);
        }

        let elapsed = started.elapsed();
        self.timing.evaluations += 1;
        self.timing.comp_time += compute;
        self.timing.comm_time += elapsed.saturating_sub(compute);
        Ok(total)
    }

    /// Stop the workers. Returns the first protocol error seen, if any.
    pub fn finish(&mut self) -> Result<Vec<WorkerSummary>, ClusterError> {
        if let Some(e) = self.failure.take() {
            return Err(e);
        }
        self.pool.finish()
    }
}

impl Evaluator for ParallelStaticEvaluator {
    fn evaluate(&mut self, board: &Board) -> i32 {
        if self.failure.is_none() {
            match self.try_evaluate(board) {
                Ok(score) => return score,
                Err(e) => {
                    log::warn!("parallel evaluation failed, continuing locally: {}", e);
                    self.pool.cancel_token().cancel();
                    self.failure = Some(e);
                }
            }
        }
        evaluate_static(board, &self.table)
    }

    fn name(&self) -> &str {
        "parallel static"
    }

    fn take_timing(&mut self) -> Option<EvalTiming> {
        Some(std::mem::take(&mut self.timing))
    }

    fn shutdown(&mut self) -> anyhow::Result<()> {
        self.finish()?;
        Ok(())
    }
}
