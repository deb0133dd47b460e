//! Construction settings for [`TreeBuilder`](crate::TreeBuilder)
//!
//! ```
//! use fastmerkle::{PaddingPolicy, TreeConfig};
//!
//! let config = TreeConfig::default()
//!     .with_workers(4)
//!     .with_queue_capacity(64)
//!     .with_padding(PaddingPolicy::DuplicateLastPerLevel);
//! assert_eq!(config.workers(), 4);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_QUEUE_DEPTH_PER_WORKER, MIN_QUEUE_CAPACITY, MIN_WORKERS};

/// How a level with an odd number of nodes is made even before pairing.
///
/// The two policies commit to different root hashes for the same
/// non-power-of-two input and are not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PaddingPolicy {
    /// Whenever a level (the leaf level included) has an odd count, append a
    /// copy of its last node. Adds at most one node per level.
    #[default]
    DuplicateLastPerLevel,

    /// Pad the leaf level once, up front, to the next power of two by
    /// repeating the last leaf. A single leaf is its own root.
    NextPowerOfTwo,
}

/// Worker pool sizing and padding policy for a tree construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TreeConfig {
    workers: usize,
    queue_capacity: usize,
    padding: PaddingPolicy,
}

impl Default for TreeConfig {
    fn default() -> Self {
        let workers = num_cpus::get().max(MIN_WORKERS);
        Self {
            workers,
            queue_capacity: workers * DEFAULT_QUEUE_DEPTH_PER_WORKER,
            padding: PaddingPolicy::default(),
        }
    }
}

impl TreeConfig {
    /// Set the number of worker threads (at least one).
    ///
    /// The queue capacity is not changed; call
    /// [`with_queue_capacity`](Self::with_queue_capacity) to resize it.
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = if workers < MIN_WORKERS { MIN_WORKERS } else { workers };
        self
    }

    /// Set the capacity of the bounded job and result queues (at least one).
    #[must_use]
    pub const fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = if capacity < MIN_QUEUE_CAPACITY {
            MIN_QUEUE_CAPACITY
        } else {
            capacity
        };
        self
    }

    /// Set the padding policy.
    #[must_use]
    pub const fn with_padding(mut self, padding: PaddingPolicy) -> Self {
        self.padding = padding;
        self
    }

    /// Number of worker threads.
    #[inline]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Capacity of each bounded queue.
    #[inline]
    pub const fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Padding policy.
    #[inline]
    pub const fn padding(&self) -> PaddingPolicy {
        self.padding
    }
}
