use crate::core::{Board, Cell, Side};
use crate::search::SearchStats;
use crate::stats::WorkerSummary;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One subtree to search. The id is the node's index in the coordinator's
/// arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: usize,
    pub board: Board,
    /// Side to move at the subtree root.
    pub side: Side,
    /// Side the whole search is run for.
    pub root_side: Side,
    /// Plies between the game root and this subtree root.
    pub depth_offset: u32,
}

/// Subtree value seen from the root side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    pub id: usize,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkerRequest {
    Search(Job),
    /// One contiguous slice of a board for a scattered static evaluation.
    Evaluate {
        cells: Vec<Cell>,
        offset: usize,
        is_final: bool,
    },
    /// No more work: answer with a summary and exit.
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkerResponse {
    SearchDone {
        worker: usize,
        result: JobResult,
        stats: SearchStats,
        job_time: Duration,
    },
    Partial {
        worker: usize,
        sum: i32,
        compute_time: Duration,
    },
    Failed {
        worker: usize,
        reason: String,
    },
    Final(WorkerSummary),
}

impl WorkerResponse {
    pub fn worker(&self) -> usize {
        match self {
            WorkerResponse::SearchDone { worker, .. }
            | WorkerResponse::Partial { worker, .. }
            | WorkerResponse::Failed { worker, .. } => *worker,
            WorkerResponse::Final(summary) => summary.worker,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WorkerResponse::SearchDone { .. } => "search result",
            WorkerResponse::Partial { .. } => "partial sum",
            WorkerResponse::Failed { .. } => "failure",
            WorkerResponse::Final(_) => "final summary",
        }
    }
}
