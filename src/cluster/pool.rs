use super::error::ClusterError;
use super::protocol::{WorkerRequest, WorkerResponse};
use super::worker::Worker;
use crate::config::EvalParams;
use crate::eval::WeightTable;
use crate::search::CancellationToken;
use crate::stats::WorkerSummary;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Worker threads with one request channel each and a shared response
/// channel.
///
/// Workers are numbered from 0. A retired worker has been sent `Shutdown`
/// and must not get any further request.
pub struct WorkerPool {
    senders: Vec<Option<Sender<WorkerRequest>>>,
    responses: Receiver<WorkerResponse>,
    handles: Vec<Option<JoinHandle<()>>>,
    summaries: Vec<WorkerSummary>,
    cancel: CancellationToken,
    #[cfg(test)]
    rewrite: Option<Box<dyn FnMut(WorkerResponse) -> WorkerResponse + Send>>,
}

impl WorkerPool {
    /// Spawn `count` workers for boards of `width` x `height`.
    pub fn spawn(
        count: usize,
        params: Arc<EvalParams>,
        width: usize,
        height: usize,
        cancel: CancellationToken,
    ) -> Self {
        let table = Arc::new(WeightTable::new(&params, width, height));
        let (resp_tx, responses) = mpsc::channel();

        let mut senders = Vec::with_capacity(count);
        let mut handles = Vec::with_capacity(count);
        for id in 0..count {
            let (req_tx, req_rx) = mpsc::channel();
            let worker = Worker::new(
                id,
                Arc::clone(&params),
                Arc::clone(&table),
                req_rx,
                resp_tx.clone(),
                cancel.clone(),
            );
            let handle = thread::Builder::new()
                .name(format!("search-worker-{}", id))
                .spawn(move || worker.run());
            match handle {
                Ok(h) => {
                    senders.push(Some(req_tx));
                    handles.push(Some(h));
                }
                Err(e) => {
                    log::warn!("could not spawn worker {}: {}", id, e);
                    break;
                }
            }
        }
        log::debug!("spawned {} workers", senders.len());

        Self {
            senders,
            responses,
            handles,
            summaries: Vec::new(),
            cancel,
            #[cfg(test)]
            rewrite: None,
        }
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn send(&self, worker: usize, request: WorkerRequest) -> Result<(), ClusterError> {
        let sender = self
            .senders
            .get(worker)
            .ok_or(ClusterError::NoSuchWorker(worker))?
            .as_ref()
            .ok_or(ClusterError::Retired(worker))?;
        sender
            .send(request)
            .map_err(|_| ClusterError::Disconnected(worker))
    }

    /// Tell `worker` there is no more work. Its final summary is collected
    /// by later `recv` calls.
    pub fn retire(&mut self, worker: usize) -> Result<(), ClusterError> {
        self.send(worker, WorkerRequest::Shutdown)?;
        self.senders[worker] = None;
        Ok(())
    }

    /// Next search or evaluation response. Final summaries are stored on the
    /// way and never returned here.
    pub fn recv(&mut self) -> Result<WorkerResponse, ClusterError> {
        loop {
            match self.responses.recv() {
                Ok(WorkerResponse::Final(summary)) => self.summaries.push(summary),
                Ok(WorkerResponse::Failed { worker, reason }) => {
                    return Err(ClusterError::WorkerFailed { worker, reason })
                }
                Ok(response) => return Ok(self.rewritten(response)),
                Err(_) => return Err(ClusterError::ResponsesClosed),
            }
        }
    }

    /// Pass every response `recv` returns through `f` first.
    #[cfg(test)]
    pub(crate) fn rewrite_responses(
        &mut self,
        f: impl FnMut(WorkerResponse) -> WorkerResponse + Send + 'static,
    ) {
        self.rewrite = Some(Box::new(f));
    }

    #[cfg(test)]
    fn rewritten(&mut self, response: WorkerResponse) -> WorkerResponse {
        match self.rewrite.as_mut() {
            Some(f) => f(response),
            None => response,
        }
    }

    #[cfg(not(test))]
    fn rewritten(&mut self, response: WorkerResponse) -> WorkerResponse {
        response
    }

    /// Retire every remaining worker, wait for all summaries and join the
    /// threads. Summaries come back ordered by worker id.
    pub fn finish(&mut self) -> Result<Vec<WorkerSummary>, ClusterError> {
        for worker in 0..self.senders.len() {
            if self.senders[worker].is_some() {
                self.retire(worker)?;
            }
        }

        while self.summaries.len() < self.handles.len() {
            match self.responses.recv() {
                Ok(WorkerResponse::Final(summary)) => self.summaries.push(summary),
                Ok(other) => log::debug!(
                    "dropping late {} from worker {}",
                    other.kind(),
                    other.worker()
                ),
                Err(_) => break,
            }
        }

        for (id, handle) in self.handles.iter_mut().enumerate() {
            if let Some(h) = handle.take() {
                h.join().map_err(|_| ClusterError::WorkerPanicked(id))?;
            }
        }

        let mut summaries = std::mem::take(&mut self.summaries);
        summaries.sort_by_key(|s| s.worker);
        Ok(summaries)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if self.handles.iter().all(Option::is_none) {
            return;
        }
        // Error path: stop searches early and let every thread exit.
        self.cancel.cancel();
        for sender in self.senders.iter_mut() {
            if let Some(s) = sender.take() {
                let _ = s.send(WorkerRequest::Shutdown);
            }
        }
        for handle in self.handles.iter_mut() {
            if let Some(h) = handle.take() {
                let _ = h.join();
            }
        }
    }
}
