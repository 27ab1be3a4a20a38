use super::error::ClusterError;
use super::pool::WorkerPool;
use super::protocol::{Job, WorkerRequest, WorkerResponse};
use super::tree::SearchTree;
use crate::config::EvalParams;
use crate::core::{Board, Move, ScoredMove, Side};
use crate::search::CancellationToken;
use crate::stats::{RunStats, WorkerStats};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of one distributed search.
#[derive(Debug, Clone)]
pub struct DistributedOutcome {
    pub best: Option<Move>,
    pub ranked: Vec<ScoredMove>,
    pub run: RunStats,
    pub jobs: Vec<WorkerStats>,
}

struct Dispatch {
    worker: usize,
    sent: Duration,
}

/// Single owner of the tree and the job queue for one run.
struct Coordinator {
    params: Arc<EvalParams>,
    tree: SearchTree,
    queue: VecDeque<Job>,
    outstanding: HashMap<usize, Dispatch>,
    resolved: HashSet<usize>,
    jobs: Vec<WorkerStats>,
    started: Instant,
}

impl Coordinator {
    fn job(&self, id: usize, root_side: Side) -> Job {
        let node = &self.tree.nodes()[id];
        Job {
            id,
            board: node.board.clone(),
            side: node.side,
            root_side,
            depth_offset: node.depth,
        }
    }

    fn dispatch_next(&mut self, pool: &mut WorkerPool, worker: usize) -> Result<(), ClusterError> {
        match self.queue.pop_front() {
            Some(job) => {
                let id = job.id;
                pool.send(worker, WorkerRequest::Search(job))?;
                self.outstanding.insert(
                    id,
                    Dispatch {
                        worker,
                        sent: self.started.elapsed(),
                    },
                );
                Ok(())
            }
            None => pool.retire(worker),
        }
    }

    fn run(&mut self, pool: &mut WorkerPool) -> Result<(), ClusterError> {
        let target = pool.len() * self.params.load_factor.max(1);
        let root_side = self.tree.nodes()[0].side;
        let frontier = self.tree.partition(target, self.params.max_depth);
        self.queue = frontier.iter().map(|&id| self.job(id, root_side)).collect();

        if self.queue.is_empty() {
            log::info!("no legal move at the root");
        }

        for worker in 0..pool.len() {
            self.dispatch_next(pool, worker)?;
        }

        while !self.outstanding.is_empty() {
            let response = pool.recv()?;
            let (worker, result, stats, job_time) = match response {
                WorkerResponse::SearchDone {
                    worker,
                    result,
                    stats,
                    job_time,
                } => (worker, result, stats, job_time),
                other => {
                    return Err(ClusterError::UnexpectedMessage {
                        worker: other.worker(),
                        got: other.kind(),
                    })
                }
            };

            let Some(dispatch) = self.outstanding.remove(&result.id) else {
                return Err(if self.resolved.contains(&result.id) {
                    ClusterError::AlreadyResolved {
                        worker,
                        job: result.id,
                    }
                } else {
                    ClusterError::UnknownJob {
                        worker,
                        job: result.id,
                    }
                });
            };
            if dispatch.worker != worker {
                log::warn!(
                    "job {} sent to worker {} came back from worker {}",
                    result.id,
                    dispatch.worker,
                    worker
                );
            }

            self.resolved.insert(result.id);
            self.tree.record(result.id, result.score);
            self.jobs.push(WorkerStats {
                worker,
                job_id: result.id,
                send_time: dispatch.sent,
                receive_time: self.started.elapsed(),
                job_time,
                search: stats,
            });

            self.dispatch_next(pool, worker)?;
        }
        Ok(())
    }
}

/// Best move for Max on `board`, with the tree split across `workers`
/// threads.
///
/// On a protocol error every worker is cancelled and shut down before the
/// error is returned.
pub fn run_distributed_search(
    board: &Board,
    params: Arc<EvalParams>,
    workers: usize,
) -> Result<DistributedOutcome, ClusterError> {
    if workers == 0 {
        return Err(ClusterError::NoWorkers);
    }
    let started = Instant::now();
    let pool = WorkerPool::spawn(
        workers,
        Arc::clone(&params),
        board.width,
        board.height,
        CancellationToken::new(),
    );
    search_with_pool(board, params, pool, started)
}

fn search_with_pool(
    board: &Board,
    params: Arc<EvalParams>,
    mut pool: WorkerPool,
    started: Instant,
) -> Result<DistributedOutcome, ClusterError> {
    if pool.is_empty() {
        return Err(ClusterError::NoWorkers);
    }

    let mut coordinator = Coordinator {
        params,
        tree: SearchTree::new(board.clone(), Side::Max),
        queue: VecDeque::new(),
        outstanding: HashMap::new(),
        resolved: HashSet::new(),
        jobs: Vec::new(),
        started,
    };

    if let Err(e) = coordinator.run(&mut pool) {
        log::warn!("distributed search aborted: {}", e);
        pool.cancel_token().cancel();
        drop(pool);
        return Err(e);
    }
    let summaries = pool.finish()?;

    coordinator.tree.propagate();
    let ranked = coordinator.tree.ranking();
    let total_time = started.elapsed();
    let run = RunStats::aggregate(
        board.cell_count(),
        summaries.len(),
        total_time,
        &coordinator.jobs,
        &summaries,
    );

    log::info!(
        "distributed search: {} jobs on {} workers in {:?}, {} boards",
        run.jobs,
        run.worker_count,
        total_time,
        run.search.boards_evaluated
    );

    Ok(DistributedOutcome {
        best: ranked.first().map(|s| s.mv),
        ranked,
        run,
        jobs: coordinator.jobs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::protocol::JobResult;
    use crate::core::{setup_from_strings, standard_setup};

    fn params(depth: u32) -> Arc<EvalParams> {
        Arc::new(EvalParams {
            max_depth: depth,
            load_factor: 2,
            timeout_secs: 3600.0,
            ..EvalParams::default()
        })
    }

    #[test]
    fn test_every_job_resolved_once() {
        let board = standard_setup(6, 6);
        let out = run_distributed_search(&board, params(3), 3).unwrap();
        let mut ids: Vec<usize> = out.jobs.iter().map(|j| j.job_id).collect();
        let n = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), n);
        assert!(n >= 6);
        assert_eq!(out.run.jobs, n);
        assert_eq!(out.run.worker_count, 3);
        assert_eq!(out.run.board_size, 36);
    }

    #[test]
    fn test_ranking_is_sorted() {
        let board = standard_setup(8, 8);
        let out = run_distributed_search(&board, params(3), 2).unwrap();
        assert_eq!(out.ranked.len(), 4);
        assert!(out.ranked.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(out.best, Some(out.ranked[0].mv));
    }

    #[test]
    fn test_no_move_reports_none() {
        let board = setup_from_strings(&["OX..", "....", "....", "...."]).unwrap();
        let out = run_distributed_search(&board, params(3), 4).unwrap();
        assert_eq!(out.best, None);
        assert!(out.ranked.is_empty());
        assert!(out.jobs.is_empty());
        assert_eq!(out.run.worker_count, 4);
    }

    #[test]
    fn test_zero_workers_is_an_error() {
        let board = standard_setup(8, 8);
        assert!(matches!(
            run_distributed_search(&board, params(3), 0),
            Err(ClusterError::NoWorkers)
        ));
    }

    #[test]
    fn test_max_depth_counts_from_game_root() {
        let board = standard_setup(6, 6);
        let out = run_distributed_search(&board, params(4), 2).unwrap();
        assert_eq!(out.run.search.max_depth_reached, 4);
        assert!(out.jobs.iter().all(|j| j.receive_time >= j.send_time));
    }

    fn tampered_search(
        workers: usize,
        f: impl FnMut(WorkerResponse) -> WorkerResponse + Send + 'static,
    ) -> (Result<DistributedOutcome, ClusterError>, CancellationToken) {
        let board = standard_setup(8, 8);
        let p = params(3);
        let token = CancellationToken::new();
        let mut pool = WorkerPool::spawn(workers, Arc::clone(&p), 8, 8, token.clone());
        pool.rewrite_responses(f);
        let result = search_with_pool(&board, p, pool, Instant::now());
        (result, token)
    }

    fn with_job_id(response: WorkerResponse, id: usize) -> WorkerResponse {
        match response {
            WorkerResponse::SearchDone {
                worker,
                result,
                stats,
                job_time,
            } => WorkerResponse::SearchDone {
                worker,
                result: JobResult { id, ..result },
                stats,
                job_time,
            },
            other => other,
        }
    }

    #[test]
    fn test_unknown_job_aborts_the_run() {
        let (result, token) = tampered_search(3, |r| with_job_id(r, 999));
        assert!(matches!(
            result,
            Err(ClusterError::UnknownJob { job: 999, .. })
        ));
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_second_result_for_a_job_aborts_the_run() {
        // One worker answers the jobs in order; the second answer is relabelled
        // as the first job.
        let mut first = None;
        let (result, token) = tampered_search(1, move |r| {
            let id = match &r {
                WorkerResponse::SearchDone { result, .. } => result.id,
                _ => return r,
            };
            match first {
                None => {
                    first = Some(id);
                    r
                }
                Some(first) => with_job_id(r, first),
            }
        });
        match result {
            Err(ClusterError::AlreadyResolved { worker, job }) => {
                assert_eq!(worker, 0);
                assert_eq!(job, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(token.is_cancelled());
    }
}
