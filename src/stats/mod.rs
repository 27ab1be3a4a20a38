//! Run statistics.
//!
//! Per-job numbers come back from the workers, get folded into a `RunStats`
//! summary at the end of a distributed run and are appended to CSV logs.
//! Static-evaluation runs produce a `StaticEvalStats` row instead.

mod log_file;

pub use log_file::{append_row, JOB_HEADER, RUN_HEADER, STATIC_HEADER};

use crate::config::StatsConfig;
use crate::search::SearchStats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Numbers of one completed job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStats {
    pub worker: usize,
    pub job_id: usize,
    /// When the coordinator sent the job, relative to the run start.
    pub send_time: Duration,
    /// When the coordinator got the answer, relative to the run start.
    pub receive_time: Duration,
    /// Time the worker spent searching.
    pub job_time: Duration,
    pub search: SearchStats,
}

/// Final snapshot a worker sends back on shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSummary {
    pub worker: usize,
    pub jobs: usize,
    pub busy_time: Duration,
    pub boards_evaluated: u64,
}

/// min / max / population standard deviation of a sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spread {
    pub min: u64,
    pub max: u64,
    pub std_dev: f64,
}

impl Spread {
    pub fn of(values: &[u64]) -> Spread {
        if values.is_empty() {
            return Spread::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
        let var = values
            .iter()
            .map(|&v| (v as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        Spread {
            min: values.iter().copied().min().unwrap_or(0),
            max: values.iter().copied().max().unwrap_or(0),
            std_dev: var.sqrt(),
        }
    }
}

/// Summary of one distributed search.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    pub board_size: usize,
    pub worker_count: usize,
    pub jobs: usize,
    pub total_time: Duration,
    pub search: SearchStats,
    /// Boards evaluated per worker.
    pub boards: Spread,
    /// Summed search time of each worker's jobs, in nanoseconds.
    pub job_time: Spread,
    /// Busy time per worker, in nanoseconds.
    pub worker_time: Spread,
}

impl RunStats {
    pub fn aggregate(
        board_size: usize,
        worker_count: usize,
        total_time: Duration,
        jobs: &[WorkerStats],
        workers: &[WorkerSummary],
    ) -> RunStats {
        let mut search = SearchStats::default();
        for job in jobs {
            search.merge(&job.search);
        }

        let boards: Vec<u64> = workers.iter().map(|w| w.boards_evaluated).collect();
        let mut per_worker: BTreeMap<usize, u64> =
            workers.iter().map(|w| (w.worker, 0)).collect();
        for job in jobs {
            let total = per_worker.entry(job.worker).or_insert(0);
            *total = total.saturating_add(nanos(job.job_time));
        }
        let job_time: Vec<u64> = per_worker.into_values().collect();
        let worker_time: Vec<u64> = workers.iter().map(|w| nanos(w.busy_time)).collect();

        RunStats {
            board_size,
            worker_count,
            jobs: jobs.len(),
            total_time,
            search,
            boards: Spread::of(&boards),
            job_time: Spread::of(&job_time),
            worker_time: Spread::of(&worker_time),
        }
    }
}

/// Summary of a sequential search whose evaluations were scattered.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticEvalStats {
    pub board_size: usize,
    pub worker_count: usize,
    pub evaluations: u64,
    pub total_time: Duration,
    pub comm_time: Duration,
    pub comp_time: Duration,
    pub search: SearchStats,
}

pub(crate) fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn flag(b: bool) -> u8 {
    u8::from(b)
}

pub fn job_row(board_size: usize, worker_count: usize, job: &WorkerStats) -> String {
    let s = &job.search;
    format!(
        "{},{},{},{},{},{},{},{},{},{},{},{},{}",
        timestamp(),
        board_size,
        worker_count,
        job.worker,
        job.job_id,
        nanos(job.send_time),
        nanos(job.receive_time),
        nanos(job.job_time),
        s.boards_evaluated,
        s.nodes_pruned,
        s.est_max_depth_pruned,
        s.max_depth_reached,
        flag(s.entire_space_covered)
    )
}

pub fn run_row(run: &RunStats) -> String {
    let s = &run.search;
    format!(
        "{},{},{},{},{},{},{},{},{},{},{},{},{:.2},{},{},{:.2},{},{},{:.2}",
        timestamp(),
        run.board_size,
        run.worker_count,
        run.jobs,
        nanos(run.total_time),
        s.boards_evaluated,
        s.nodes_pruned,
        s.est_max_depth_pruned,
        s.max_depth_reached,
        flag(s.entire_space_covered),
        run.boards.min,
        run.boards.max,
        run.boards.std_dev,
        run.job_time.min,
        run.job_time.max,
        run.job_time.std_dev,
        run.worker_time.min,
        run.worker_time.max,
        run.worker_time.std_dev
    )
}

pub fn static_row(stats: &StaticEvalStats) -> String {
    let s = &stats.search;
    format!(
        "{},{},{},{},{},{},{},{},{},{}",
        timestamp(),
        stats.board_size,
        stats.worker_count,
        stats.evaluations,
        nanos(stats.total_time),
        nanos(stats.comm_time),
        nanos(stats.comp_time),
        s.boards_evaluated,
        s.max_depth_reached,
        flag(s.entire_space_covered)
    )
}

/// Append one job row per entry and the run summary. Failures are logged and
/// skipped: losing a stats row never fails a search.
pub fn record_run(config: &StatsConfig, run: &RunStats, jobs: &[WorkerStats]) {
    if !config.enabled {
        return;
    }
    for job in jobs {
        let row = job_row(run.board_size, run.worker_count, job);
        if let Err(e) = append_row(&config.job_log, JOB_HEADER, &row) {
            log::warn!("skipping job stats: {:#}", e);
            break;
        }
    }
    if let Err(e) = append_row(&config.run_log, RUN_HEADER, &run_row(run)) {
        log::warn!("skipping run stats: {:#}", e);
    }
}

pub fn record_static(config: &StatsConfig, stats: &StaticEvalStats) {
    if !config.enabled {
        return;
    }
    if let Err(e) = append_row(&config.static_eval_log, STATIC_HEADER, &static_row(stats)) {
        log::warn!("skipping static evaluation stats: {:#}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(worker: usize, boards: u64, job_ms: u64, covered: bool) -> WorkerStats {
        WorkerStats {
            worker,
            job_id: worker,
            send_time: Duration::ZERO,
            receive_time: Duration::from_millis(job_ms),
            job_time: Duration::from_millis(job_ms),
            search: SearchStats {
                boards_evaluated: boards,
                nodes_pruned: 1,
                est_max_depth_pruned: 7,
                max_depth_reached: worker as u32 + 2,
                entire_space_covered: covered,
            },
        }
    }

    #[test]
    fn test_spread() {
        let s = Spread::of(&[2, 4, 4, 4, 5, 5, 7, 9]);
        assert_eq!(s.min, 2);
        assert_eq!(s.max, 9);
        assert!((s.std_dev - 2.0).abs() < 1e-9);
        assert_eq!(Spread::of(&[]), Spread::default());
    }

    #[test]
    fn test_aggregate_merges_jobs() {
        let jobs = [job(0, 10, 3, true), job(1, 30, 5, false), job(1, 5, 1, true)];
        let workers = [
            WorkerSummary {
                worker: 0,
                jobs: 1,
                busy_time: Duration::from_millis(3),
                boards_evaluated: 10,
            },
            WorkerSummary {
                worker: 1,
                jobs: 2,
                busy_time: Duration::from_millis(6),
                boards_evaluated: 35,
            },
        ];
        let run = RunStats::aggregate(64, 2, Duration::from_millis(9), &jobs, &workers);
        assert_eq!(run.jobs, 3);
        assert_eq!(run.search.boards_evaluated, 45);
        assert_eq!(run.search.nodes_pruned, 3);
        assert_eq!(run.search.est_max_depth_pruned, 21);
        assert_eq!(run.search.max_depth_reached, 3);
        assert!(!run.search.entire_space_covered);
        assert_eq!((run.boards.min, run.boards.max), (10, 35));
        assert_eq!((run.job_time.min, run.job_time.max), (3_000_000, 6_000_000));
        assert_eq!(run.worker_time.max, 6_000_000);
    }

    #[test]
    fn test_idle_worker_counts_as_zero_job_time() {
        let jobs = [job(1, 5, 4, true)];
        let workers = [
            WorkerSummary {
                worker: 0,
                ..WorkerSummary::default()
            },
            WorkerSummary {
                worker: 1,
                jobs: 1,
                busy_time: Duration::from_millis(4),
                boards_evaluated: 5,
            },
        ];
        let run = RunStats::aggregate(16, 2, Duration::from_millis(4), &jobs, &workers);
        assert_eq!((run.job_time.min, run.job_time.max), (0, 4_000_000));
        assert!((run.job_time.std_dev - 2_000_000.0).abs() < 1e-3);
    }

    #[test]
    fn test_unwritable_logs_are_skipped() {
        let dir = std::env::temp_dir()
            .join("othello_search_no_such_dir")
            .join("nested");
        let config = StatsConfig {
            enabled: true,
            job_log: dir.join("jobs.csv"),
            run_log: dir.join("runs.csv"),
            static_eval_log: dir.join("static.csv"),
        };
        let j = job(0, 10, 3, true);
        let run = RunStats::aggregate(64, 1, Duration::from_millis(3), &[j], &[]);
        let stats = StaticEvalStats {
            board_size: 64,
            worker_count: 2,
            evaluations: 1,
            total_time: Duration::from_millis(1),
            comm_time: Duration::ZERO,
            comp_time: Duration::ZERO,
            search: SearchStats::default(),
        };

        record_run(&config, &run, &[j]);
        record_static(&config, &stats);
        assert!(!dir.exists());
    }

    #[test]
    fn test_rows_match_headers() {
        let j = job(0, 10, 3, true);
        let run = RunStats::aggregate(64, 1, Duration::from_millis(3), &[j], &[]);
        let stats = StaticEvalStats {
            board_size: 64,
            worker_count: 3,
            evaluations: 12,
            total_time: Duration::from_millis(4),
            comm_time: Duration::from_millis(1),
            comp_time: Duration::from_millis(2),
            search: SearchStats::default(),
        };
        let columns = |s: &str| s.split(',').count();
        assert_eq!(columns(&job_row(64, 1, &j)), columns(JOB_HEADER));
        assert_eq!(columns(&run_row(&run)), columns(RUN_HEADER));
        assert_eq!(columns(&static_row(&stats)), columns(STATIC_HEADER));
        assert!(job_row(64, 1, &j).ends_with(",3000000,10,1,7,2,1"));
    }
}
