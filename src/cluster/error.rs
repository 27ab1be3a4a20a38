use thiserror::Error;

/// Protocol violations between the coordinator and its workers.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("a distributed run needs at least one worker")]
    NoWorkers,
    #[error("worker {worker} answered job {job}, which was never dispatched")]
    UnknownJob { worker: usize, job: usize },
    #[error("worker {worker} answered job {job}, which is already resolved")]
    AlreadyResolved { worker: usize, job: usize },
    #[error("unexpected {got} message from worker {worker}")]
    UnexpectedMessage { worker: usize, got: &'static str },
    #[error("worker {0} does not exist")]
    NoSuchWorker(usize),
    #[error("worker {0} was already retired")]
    Retired(usize),
    #[error("request channel of worker {0} is closed")]
    Disconnected(usize),
    #[error("every worker hung up before answering")]
    ResponsesClosed,
    #[error("worker {worker} failed: {reason}")]
    WorkerFailed { worker: usize, reason: String },
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
}
