//! Parallel Merkle tree construction
//!
//! This crate builds a binary Merkle tree over an ordered sequence of opaque
//! data blocks and returns the tree together with a root digest committing to
//! the whole sequence. Hashing is spread over a pool of worker threads that
//! is created for, and torn down at the end of, every construction.
//!
//! ## Key Components
//!
//! - **Tree**: the immutable result ([`MerkleTree`], [`Node`])
//! - **Builder**: leaf hashing and level-by-level reduction ([`TreeBuilder`])
//! - **Workers**: bounded job/result queues feeding hash threads ([`worker::WorkerPool`])
//! - **Hashing**: pluggable algorithms and a reusable state pool ([`hash`])
//!
//! ## Usage Examples
//!
//! ```
//! use fastmerkle::{PaddingPolicy, TreeBuilder, TreeConfig, generate_merkle_tree};
//! use fastmerkle::hash::Keccak256Algorithm;
//!
//! // Defaults: Keccak256, one worker per CPU
//! let data = ["alpha", "beta", "gamma"];
//! let tree = generate_merkle_tree(&data).unwrap();
//! assert_eq!(tree.root_hash().len(), 32);
//! assert_eq!(tree.height(), 2);
//!
//! // Explicit settings
//! let config = TreeConfig::default()
//!     .with_workers(2)
//!     .with_padding(PaddingPolicy::DuplicateLastPerLevel);
//! let builder = TreeBuilder::with_config(Keccak256Algorithm::new(), config);
//! assert_eq!(builder.build(&data).unwrap().root_hash(), tree.root_hash());
//! ```
//!
//! ## Padding
//!
//! A level with an odd number of nodes is evened out by appending a copy of
//! its last node, at every level. [`PaddingPolicy::NextPowerOfTwo`] instead
//! pads only the leaf level, up front. The two policies give different roots
//! for most input lengths; pick the one your root format was defined with.

pub mod config;
pub mod constants;
pub mod error;
pub mod hash;
pub mod tree;
pub mod worker;

#[cfg(test)]
mod test_utils;

// Re-export dependencies that are part of our public API
pub use bytes;

// Re-export core types
pub use config::{PaddingPolicy, TreeConfig};
pub use error::{HashingError, MerkleError, Result, WriteError};
pub use hash::{HashAlgorithm, HashState, HasherPool};
pub use tree::{MerkleTree, Node, NodeId, TreeBuilder, generate_merkle_tree};
