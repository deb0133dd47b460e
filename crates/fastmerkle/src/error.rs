//! Error types for the fastmerkle crate
//!
//! The crate uses a two-level error hierarchy:
//!
//! - [`MerkleError`]: the top-level error returned from tree construction
//! - [`HashingError`] and [`WriteError`]: failures reported by the worker pool
//!   and by the pluggable hash state respectively
//!
//! ## Example Usage
//!
//! ```
//! use fastmerkle::{MerkleError, generate_merkle_tree};
//!
//! let empty: Vec<Vec<u8>> = Vec::new();
//! match generate_merkle_tree(&empty) {
//!     Ok(tree) => println!("root: {:?}", tree.root_hash()),
//!     Err(MerkleError::EmptyInput) => println!("nothing to commit to"),
//!     Err(e) => println!("construction failed: {e}"),
//! }
//! ```

use thiserror::Error;

/// Result type for tree construction
pub type Result<T> = std::result::Result<T, MerkleError>;

/// Main error type for the fastmerkle crate
#[derive(Error, Debug)]
pub enum MerkleError {
    /// The input data set contained no elements
    #[error("empty data set provided")]
    EmptyInput,

    /// A hashing job failed; no tree was produced
    #[error("unable to perform hashing: {0}")]
    Hashing(#[from] HashingError),

    /// A worker thread could not be started
    #[error("unable to spawn hash worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}

/// Failures surfaced by the hash worker pool
#[derive(Error, Debug)]
pub enum HashingError {
    /// The hash state rejected the job's input
    #[error("unable to write hash: {source}")]
    Write {
        /// The underlying write failure
        #[from]
        source: WriteError,
    },

    /// The worker pool stopped before every expected result arrived
    #[error("worker pool disconnected with {outstanding} results outstanding")]
    Disconnected {
        /// Number of results still expected when the pool went away
        outstanding: usize,
    },
}

/// Errors raised by a [`HashState`](crate::hash::HashState) while absorbing input
#[derive(Error, Debug)]
pub enum WriteError {
    /// The state no longer accepts input
    #[error("hash state is closed")]
    Closed,

    /// The state refused the input
    #[error("write rejected: {0}")]
    Rejected(String),

    /// An I/O-backed state failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WriteError {
    /// Build a [`WriteError::Rejected`] from any message
    pub fn rejected<S: Into<String>>(msg: S) -> Self {
        Self::Rejected(msg.into())
    }
}
