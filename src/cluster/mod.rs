//! Distributed search.
//!
//! The coordinator splits the top of the game tree into jobs, hands them to
//! worker threads over channels and merges the subtree scores into a ranked
//! move list. The same workers also serve scattered static evaluations for
//! `ParallelStaticEvaluator`.

pub mod coordinator;
pub mod error;
pub mod parallel_eval;
pub mod pool;
pub mod protocol;
pub mod tree;
pub mod worker;

pub use coordinator::{run_distributed_search, DistributedOutcome};
pub use error::ClusterError;
pub use parallel_eval::{split_cells, ParallelStaticEvaluator};
pub use pool::WorkerPool;
pub use protocol::{Job, JobResult, WorkerRequest, WorkerResponse};
pub use tree::{SearchNode, SearchTree};
