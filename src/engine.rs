use crate::cluster::{run_distributed_search, ParallelStaticEvaluator};
use crate::config::EvalParams;
use crate::core::{Board, Move, ScoredMove};
use crate::search::{CancellationToken, SearchContext, SearchStats, Searcher};
use crate::stats::{self, StaticEvalStats};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How a search is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One thread, one searcher.
    Sequential,
    /// Tree split into jobs for the worker pool.
    Distributed,
    /// One searcher whose static evaluations are scattered over the pool.
    ParallelStatic,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Sequential => "sequential",
            Mode::Distributed => "distributed",
            Mode::ParallelStatic => "parallel static evaluation",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best: Option<Move>,
    /// Root moves, best first.
    pub ranked: Vec<ScoredMove>,
    pub stats: SearchStats,
    pub elapsed: Duration,
    pub mode: Mode,
}

/// Entry point: picks the execution mode from the parameters and the worker
/// count.
pub struct Engine {
    params: Arc<EvalParams>,
    workers: usize,
}

impl Engine {
    pub fn new(params: EvalParams, workers: usize) -> Self {
        Self {
            params: Arc::new(params),
            workers,
        }
    }

    pub fn params(&self) -> &EvalParams {
        &self.params
    }

    pub fn mode(&self) -> Mode {
        if self.workers == 0 {
            Mode::Sequential
        } else if self.params.parallel_search {
            Mode::Distributed
        } else if self.params.use_static_evaluation {
            Mode::ParallelStatic
        } else {
            Mode::Sequential
        }
    }

    /// Best move for Max, `None` when Max has to pass.
    pub fn best_move(&self, board: &Board) -> anyhow::Result<SearchOutcome> {
        let mode = self.mode();
        log::info!(
            "searching {}x{} board, depth {}, {} workers, {} mode",
            board.width,
            board.height,
            self.params.max_depth,
            self.workers,
            mode
        );
        match mode {
            Mode::Sequential => {
                let searcher = Searcher::for_board(Arc::clone(&self.params), board);
                Ok(self.sequential(searcher, board, mode).0)
            }
            Mode::ParallelStatic => self.parallel_static(board),
            Mode::Distributed => self.distributed(board),
        }
    }

    fn sequential(
        &self,
        mut searcher: Searcher,
        board: &Board,
        mode: Mode,
    ) -> (SearchOutcome, Searcher) {
        let started = Instant::now();
        let mut ctx = SearchContext::new(self.params.timeout(), CancellationToken::new());
        let ranked = searcher.search_ranked(board, &mut ctx);
        let outcome = SearchOutcome {
            best: ranked.first().map(|s| s.mv),
            ranked,
            stats: ctx.stats,
            elapsed: started.elapsed(),
            mode,
        };
        log::info!(
            "{} boards evaluated in {:?}, depth {}{}",
            outcome.stats.boards_evaluated,
            outcome.elapsed,
            outcome.stats.max_depth_reached,
            if outcome.stats.entire_space_covered { ", exact" } else { "" }
        );
        (outcome, searcher)
    }

    fn parallel_static(&self, board: &Board) -> anyhow::Result<SearchOutcome> {
        let evaluator = ParallelStaticEvaluator::new(
            Arc::clone(&self.params),
            board.width,
            board.height,
            self.workers,
        );
        let worker_count = evaluator.workers();
        let searcher = Searcher::new(Arc::clone(&self.params), Box::new(evaluator));

        let (outcome, mut searcher) = self.sequential(searcher, board, Mode::ParallelStatic);
        let timing = searcher.evaluator_mut().take_timing().unwrap_or_default();
        searcher.evaluator_mut().shutdown()?;

        let row = StaticEvalStats {
            board_size: board.cell_count(),
            worker_count,
            evaluations: timing.evaluations,
            total_time: outcome.elapsed,
            comm_time: timing.comm_time,
            comp_time: timing.comp_time,
            search: outcome.stats,
        };
        log::debug!(
            "{} scattered evaluations: comm {:?}, comp {:?}",
            row.evaluations,
            row.comm_time,
            row.comp_time
        );
        stats::record_static(&self.params.stats, &row);
        Ok(outcome)
    }

    fn distributed(&self, board: &Board) -> anyhow::Result<SearchOutcome> {
        let out = run_distributed_search(board, Arc::clone(&self.params), self.workers)?;
        stats::record_run(&self.params.stats, &out.run, &out.jobs);
        Ok(SearchOutcome {
            best: out.best,
            ranked: out.ranked,
            stats: out.run.search,
            elapsed: out.run.total_time,
            mode: Mode::Distributed,
        })
    }
}
