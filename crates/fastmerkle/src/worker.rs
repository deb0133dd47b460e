//! Hash worker pool.
//!
//! A fixed set of OS threads consumes [`WorkerJob`]s from a bounded queue and
//! publishes [`WorkerResult`]s to a second bounded queue:
//!
//! ```text
//! [submit] → job queue (bounded) → worker 0..n → result queue (bounded) → [take_result]
//!               ↑ backpressure        ↓ acquire/release
//!                                  HasherPool
//! ```
//!
//! Results arrive in completion order, not submission order. The slot index
//! carried by each job and echoed in its result is the only way to place a
//! result.
//!
//! The queues are tokio channels driven through their blocking API, so the
//! pool must not be used from inside an async runtime.
//!
//! A pool lives for one tree construction. Dropping it raises the
//! cancellation flag, closes both queues and joins every worker.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{trace, warn};

use crate::constants::WORKER_THREAD_PREFIX;
use crate::error::{HashingError, WriteError};
use crate::hash::{HashAlgorithm, HashState, HasherPool};

/// A unit of hashing work: the items are hashed as one concatenated stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerJob {
    slot: usize,
    items: Vec<Bytes>,
}

impl WorkerJob {
    /// Create a job hashing `items` in order, for the given slot.
    pub const fn new(slot: usize, items: Vec<Bytes>) -> Self {
        Self { slot, items }
    }

    /// A leaf job: one input element.
    pub fn leaf(slot: usize, data: Bytes) -> Self {
        Self::new(slot, vec![data])
    }

    /// An internal job: left child hash followed by right child hash.
    pub fn pair(slot: usize, left: Bytes, right: Bytes) -> Self {
        Self::new(slot, vec![left, right])
    }

    /// Target slot of this job
    #[inline]
    pub const fn slot(&self) -> usize {
        self.slot
    }

    /// Items to hash, in order
    #[inline]
    pub const fn items(&self) -> &[Bytes] {
        self.items.as_slice()
    }
}

/// Outcome of one [`WorkerJob`].
#[derive(Debug)]
pub struct WorkerResult {
    slot: usize,
    outcome: Result<Bytes, WriteError>,
}

impl WorkerResult {
    /// Slot of the job that produced this result
    #[inline]
    pub const fn slot(&self) -> usize {
        self.slot
    }

    /// The digest, or the write failure that prevented it
    #[inline]
    pub const fn outcome(&self) -> &Result<Bytes, WriteError> {
        &self.outcome
    }

    /// Consume the result, yielding the digest or the write failure
    #[inline]
    pub fn into_outcome(self) -> Result<Bytes, WriteError> {
        self.outcome
    }
}

/// A fixed-size pool of hashing threads fed through bounded queues.
#[derive(Debug)]
pub struct WorkerPool {
    jobs: Option<mpsc::Sender<WorkerJob>>,
    results: Option<Mutex<mpsc::Receiver<WorkerResult>>>,
    cancelled: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` threads drawing hash states from `hashers`.
    ///
    /// Both queues hold at most `queue_capacity` entries. Values of zero are
    /// raised to one.
    pub fn start<A: HashAlgorithm>(
        hashers: Arc<HasherPool<A>>,
        workers: usize,
        queue_capacity: usize,
    ) -> std::io::Result<Self> {
        let (job_tx, job_rx) = mpsc::channel(queue_capacity.max(1));
        let (result_tx, result_rx) = mpsc::channel(queue_capacity.max(1));
        let job_rx = Arc::new(Mutex::new(job_rx));

        // Built up front so that a failed spawn still shuts down earlier workers
        let mut pool = Self {
            jobs: Some(job_tx),
            results: Some(Mutex::new(result_rx)),
            cancelled: Arc::new(AtomicBool::new(false)),
            handles: Vec::with_capacity(workers.max(1)),
        };

        for id in 0..workers.max(1) {
            let jobs = Arc::clone(&job_rx);
            let results = result_tx.clone();
            let hashers = Arc::clone(&hashers);
            let cancelled = Arc::clone(&pool.cancelled);

            let handle = thread::Builder::new()
                .name(format!("{WORKER_THREAD_PREFIX}-{id}"))
                .spawn(move || run_worker(id, &jobs, &results, &hashers, &cancelled))?;
            pool.handles.push(handle);
        }

        Ok(pool)
    }

    /// Number of worker threads
    #[inline]
    pub const fn workers(&self) -> usize {
        self.handles.len()
    }

    /// Queue a job, blocking while the job queue is full.
    pub fn submit(&self, job: WorkerJob) -> Result<(), HashingError> {
        let jobs = self
            .jobs
            .as_ref()
            .ok_or(HashingError::Disconnected { outstanding: 0 })?;
        jobs.blocking_send(job)
            .map_err(|_| HashingError::Disconnected { outstanding: 0 })
    }

    /// Block until any result is available.
    ///
    /// Returns `None` once every worker has exited and the queue is drained.
    pub fn take_result(&self) -> Option<WorkerResult> {
        self.results.as_ref()?.lock().blocking_recv()
    }

    /// Ask workers to skip every job they have not started yet.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](Self::cancel) has been called
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Run a batch of jobs to completion, handing each digest to `place`.
    ///
    /// Returns only after exactly one result per job has been placed. Whenever
    /// the job queue is full, a pending result is consumed before retrying, so
    /// a batch larger than both queues combined cannot stall.
    ///
    /// The first failed result cancels the pool and aborts the batch; results
    /// still in flight are never placed.
    pub fn run_batch<I, F>(&mut self, jobs: I, mut place: F) -> Result<(), HashingError>
    where
        I: IntoIterator<Item = WorkerJob>,
        F: FnMut(usize, Bytes),
    {
        let mut outstanding = 0usize;

        for job in jobs {
            let mut pending = job;
            loop {
                let sender = self
                    .jobs
                    .as_ref()
                    .ok_or(HashingError::Disconnected { outstanding })?;
                match sender.try_send(pending) {
                    Ok(()) => {
                        outstanding += 1;
                        break;
                    }
                    Err(TrySendError::Full(job)) => {
                        pending = job;
                        self.collect_one(&mut outstanding, &mut place)?;
                    }
                    Err(TrySendError::Closed(_)) => {
                        return Err(HashingError::Disconnected { outstanding });
                    }
                }
            }
        }

        while outstanding > 0 {
            self.collect_one(&mut outstanding, &mut place)?;
        }

        Ok(())
    }

    fn collect_one<F>(&self, outstanding: &mut usize, place: &mut F) -> Result<(), HashingError>
    where
        F: FnMut(usize, Bytes),
    {
        let Some(result) = self.take_result() else {
            self.cancel();
            return Err(HashingError::Disconnected {
                outstanding: *outstanding,
            });
        };
        *outstanding -= 1;

        match result.outcome {
            Ok(hash) => {
                place(result.slot, hash);
                Ok(())
            }
            Err(source) => {
                warn!(slot = result.slot, error = %source, "hash worker reported a failure");
                self.cancel();
                Err(HashingError::Write { source })
            }
        }
    }

    fn shutdown(&mut self) {
        self.cancel();
        // Closing the job queue lets idle workers exit, dropping the result
        // queue unblocks any worker waiting to publish.
        self.jobs.take();
        self.results.take();

        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("hash worker exited with a panic");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker<A: HashAlgorithm>(
    id: usize,
    jobs: &Mutex<mpsc::Receiver<WorkerJob>>,
    results: &mpsc::Sender<WorkerResult>,
    hashers: &HasherPool<A>,
    cancelled: &AtomicBool,
) {
    trace!(worker = id, "hash worker started");

    loop {
        let next = jobs.lock().blocking_recv();
        let Some(job) = next else {
            break;
        };
        if cancelled.load(Ordering::Acquire) {
            continue;
        }

        let slot = job.slot;
        let result = panic::catch_unwind(AssertUnwindSafe(|| hash_job(hashers, job)))
            .unwrap_or_else(|_| WorkerResult {
                slot,
                outcome: Err(WriteError::rejected("hash state panicked")),
            });

        if results.blocking_send(result).is_err() {
            break;
        }
    }

    trace!(worker = id, "hash worker exited");
}

fn hash_job<A: HashAlgorithm>(hashers: &HasherPool<A>, job: WorkerJob) -> WorkerResult {
    let mut state = hashers.acquire();
    let outcome = job
        .items
        .iter()
        .try_for_each(|item| state.write(item))
        .map(|()| state.finalize_reset());

    WorkerResult {
        slot: job.slot,
        outcome,
    }
}
