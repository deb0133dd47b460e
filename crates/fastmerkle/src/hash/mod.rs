//! Pluggable hash algorithms.
//!
//! Tree construction never names a concrete digest. Workers drive a
//! [`HashState`] obtained from a [`HasherPool`], which in turn asks its
//! [`HashAlgorithm`] for fresh states. Two algorithms ship with the crate:
//!
//! - [`Keccak256Algorithm`]: the default, backed by `alloy-primitives`
//! - [`DigestAlgorithm`]: wraps any RustCrypto [`digest::Digest`]
//!
//! A job's items are written in order and the digest covers their
//! concatenation, so `write(a); write(b)` hashes exactly like `write(a ++ b)`.

mod adapter;
mod keccak;
pub mod pool;

use bytes::Bytes;

use crate::error::WriteError;

pub use adapter::{DigestAlgorithm, DigestState};
pub use keccak::{Keccak256Algorithm, Keccak256State};
pub use pool::{HasherPool, PooledState};

/// An exclusive, mutable hashing context.
pub trait HashState: Send + 'static {
    /// Absorb `data` into the running digest.
    fn write(&mut self, data: &[u8]) -> Result<(), WriteError>;

    /// Return the digest of everything written since the last reset, then reset.
    fn finalize_reset(&mut self) -> Bytes;

    /// Discard any absorbed input.
    fn reset(&mut self);
}

/// A factory for [`HashState`]s of one digest algorithm.
pub trait HashAlgorithm: Send + Sync + 'static {
    /// The state type produced by this algorithm.
    type State: HashState;

    /// Create a fresh state.
    fn new_state(&self) -> Self::State;

    /// Digest length in bytes.
    fn output_size(&self) -> usize;
}
