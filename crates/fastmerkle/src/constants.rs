//! Constants used to size the worker pool and its queues

/// Slots per worker in the bounded job and result queues.
///
/// Each worker can have this many jobs waiting for it before submitters are
/// suspended.
pub const DEFAULT_QUEUE_DEPTH_PER_WORKER: usize = 4;

/// Lower bound on the number of worker threads.
pub const MIN_WORKERS: usize = 1;

/// Lower bound on the capacity of either bounded queue.
pub const MIN_QUEUE_CAPACITY: usize = 1;

/// Prefix for worker thread names.
pub(crate) const WORKER_THREAD_PREFIX: &str = "fastmerkle-worker";
