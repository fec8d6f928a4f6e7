//! # Cooperative scheduler: one worker, one queue.
//!
//! [`Scheduler`] drains a bounded queue of posted [`Job`]s on a single worker, awaiting
//! each job to completion before taking the next. Since no two jobs ever run at the
//! same time, jobs never need locks around the state they carry.
//!
//! ```text
//! post(job) ──► [bounded mpsc] ──► dispatch_forever() ──► job.await ──► next job
//!      ▲                                                      │
//!      └──────────────────── a job may post its successor ────┘
//! ```
//!
//! ## Rules
//! - Jobs run in FIFO order, strictly one at a time
//! - `post` never blocks; a full or closed queue is reported as [`PostError`]
//! - `dispatch_forever` returns once every [`SchedulerHandle`] is gone and the queue is drained

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::error::PostError;

/// A unit of work for the scheduler worker.
pub type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Cloneable posting side of the scheduler queue.
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<Job>,
}

impl SchedulerHandle {
    /// Enqueues a future to be awaited on the worker.
    pub fn post<F>(&self, fut: F) -> Result<(), PostError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.post_job(Box::pin(fut))
    }

    /// Enqueues an already boxed job.
    pub fn post_job(&self, job: Job) -> Result<(), PostError> {
        self.try_reserve()?.send(job);
        Ok(())
    }

    /// Reserves a queue slot without building the job yet.
    ///
    /// Lets a job that moves itself into its successor find out whether the post
    /// can succeed while it still owns its state.
    pub(crate) fn try_reserve(&self) -> Result<mpsc::Permit<'_, Job>, PostError> {
        self.tx.try_reserve().map_err(|e| match e {
            mpsc::error::TrySendError::Full(()) => PostError::Full,
            mpsc::error::TrySendError::Closed(()) => PostError::Closed,
        })
    }
}

/// The worker side: owns the queue receiver.
pub struct Scheduler {
    rx: mpsc::Receiver<Job>,
    handle: SchedulerHandle,
}

impl Scheduler {
    /// Creates a scheduler with the given queue capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            rx,
            handle: SchedulerHandle { tx },
        }
    }

    pub fn handle(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    /// Runs queued jobs one at a time until the queue is closed and empty.
    pub async fn dispatch_forever(self) {
        let Scheduler { mut rx, handle } = self;
        drop(handle);

        while let Some(job) = rx.recv().await {
            job.await;
        }
    }
}
