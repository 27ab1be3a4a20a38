use super::protocol::{Job, JobResult, WorkerRequest, WorkerResponse};
use crate::config::EvalParams;
use crate::core::Cell;
use crate::eval::{partial_sum, WeightTable};
use crate::search::{CancellationToken, SearchContext, Searcher};
use crate::stats::WorkerSummary;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::time::Instant;

/// Worker side of the protocol. Handles one request at a time until told to
/// shut down.
pub struct Worker {
    id: usize,
    params: Arc<EvalParams>,
    table: Arc<WeightTable>,
    requests: Receiver<WorkerRequest>,
    responses: Sender<WorkerResponse>,
    ctx: SearchContext,
    searcher: Option<Searcher>,
    summary: WorkerSummary,
}

impl Worker {
    pub fn new(
        id: usize,
        params: Arc<EvalParams>,
        table: Arc<WeightTable>,
        requests: Receiver<WorkerRequest>,
        responses: Sender<WorkerResponse>,
        cancel: CancellationToken,
    ) -> Self {
        let ctx = SearchContext::new(params.timeout(), cancel);
        Self {
            id,
            params,
            table,
            requests,
            responses,
            ctx,
            searcher: None,
            summary: WorkerSummary {
                worker: id,
                ..WorkerSummary::default()
            },
        }
    }

    pub fn run(mut self) {
        log::debug!("worker {} started", self.id);
        while let Ok(request) = self.requests.recv() {
            let response = match request {
                WorkerRequest::Search(job) => self.search(job),
                WorkerRequest::Evaluate {
                    cells,
                    offset,
                    is_final,
                } => self.evaluate(&cells, offset, is_final),
                WorkerRequest::Shutdown => {
                    log::debug!(
                        "worker {} done: {} jobs, {} boards",
                        self.id,
                        self.summary.jobs,
                        self.summary.boards_evaluated
                    );
                    let _ = self.responses.send(WorkerResponse::Final(self.summary));
                    return;
                }
            };
            if self.responses.send(response).is_err() {
                log::debug!("worker {}: coordinator hung up", self.id);
                return;
            }
        }
    }

    fn search(&mut self, job: Job) -> WorkerResponse {
        let started = Instant::now();
        let depth = self.params.max_depth.saturating_sub(job.depth_offset);

        let params = &self.params;
        let searcher = self
            .searcher
            .get_or_insert_with(|| Searcher::for_board(Arc::clone(params), &job.board));
        let value =
            searcher.search_subtree(&job.board, depth, job.depth_offset, job.side, &mut self.ctx);

        let score = if job.side == job.root_side { value } else { -value };
        let job_time = started.elapsed();
        let stats = self.ctx.stats;

        self.summary.jobs += 1;
        self.summary.busy_time += job_time;
        self.summary.boards_evaluated += stats.boards_evaluated;

        log::trace!("worker {} job {} -> {}", self.id, job.id, score);
        WorkerResponse::SearchDone {
            worker: self.id,
            result: JobResult { id: job.id, score },
            stats,
            job_time,
        }
    }

    fn evaluate(&mut self, cells: &[Cell], offset: usize, is_final: bool) -> WorkerResponse {
        let started = Instant::now();
        let weights = self.table.weights();
        if offset.saturating_add(cells.len()) > weights.len() {
            return WorkerResponse::Failed {
                worker: self.id,
                reason: format!(
                    "slice {}..{} outside a board of {} cells",
                    offset,
                    offset.saturating_add(cells.len()),
                    weights.len()
                ),
            };
        }
        let sum = partial_sum(cells, weights, offset, is_final);
        let compute_time = started.elapsed();
        self.summary.busy_time += compute_time;
        WorkerResponse::Partial {
            worker: self.id,
            sum,
            compute_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{standard_setup, Side};
    use std::sync::mpsc;
    use std::time::Duration;

    type Handles = (
        Sender<WorkerRequest>,
        Receiver<WorkerResponse>,
        std::thread::JoinHandle<()>,
    );

    fn spawn() -> Handles {
        let params = Arc::new(EvalParams {
            max_depth: 2,
            ..EvalParams::default()
        });
        let table = Arc::new(WeightTable::new(&params, 4, 4));
        let (req_tx, req_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let worker = Worker::new(3, params, table, req_rx, resp_tx, CancellationToken::new());
        let handle = std::thread::spawn(move || worker.run());
        (req_tx, resp_rx, handle)
    }

    #[test]
    fn test_search_then_shutdown() {
        let (tx, rx, handle) = spawn();
        let job = Job {
            id: 7,
            board: standard_setup(4, 4),
            side: Side::Min,
            root_side: Side::Max,
            depth_offset: 1,
        };
        tx.send(WorkerRequest::Search(job)).unwrap();
        match rx.recv().unwrap() {
            WorkerResponse::SearchDone { worker, result, stats, .. } => {
                assert_eq!(worker, 3);
                assert_eq!(result.id, 7);
                assert!(stats.boards_evaluated > 0);
                assert_eq!(stats.max_depth_reached, 2);
            }
            other => panic!("unexpected {:?}", other),
        }

        tx.send(WorkerRequest::Shutdown).unwrap();
        match rx.recv().unwrap() {
            WorkerResponse::Final(summary) => {
                assert_eq!(summary.worker, 3);
                assert_eq!(summary.jobs, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
        handle.join().unwrap();
    }

    #[test]
    fn test_evaluate_slice() {
        let (tx, rx, handle) = spawn();
        // Corner, C square, C square, corner of the top row of a 4x4 board.
        tx.send(WorkerRequest::Evaluate {
            cells: vec![Cell::Max, Cell::Min, Cell::Empty, Cell::Max],
            offset: 0,
            is_final: false,
        })
        .unwrap();
        match rx.recv().unwrap() {
            WorkerResponse::Partial { sum, .. } => assert_eq!(sum, 10 + 4 + 10),
            other => panic!("unexpected {:?}", other),
        }

        tx.send(WorkerRequest::Evaluate {
            cells: vec![Cell::Max; 3],
            offset: 15,
            is_final: false,
        })
        .unwrap();
        assert!(matches!(rx.recv().unwrap(), WorkerResponse::Failed { worker: 3, .. }));

        drop(tx);
        handle.join().unwrap();
    }

    #[test]
    fn test_idle_shutdown_reports_empty_summary() {
        let (tx, rx, handle) = spawn();
        tx.send(WorkerRequest::Shutdown).unwrap();
        match rx.recv().unwrap() {
            WorkerResponse::Final(summary) => {
                assert_eq!(summary.jobs, 0);
                assert_eq!(summary.busy_time, Duration::ZERO);
            }
            other => panic!("unexpected {:?}", other),
        }
        handle.join().unwrap();
    }
}
