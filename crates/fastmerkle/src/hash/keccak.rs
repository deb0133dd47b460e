//! Keccak256 hash algorithm
//!
//! Uses the same Keccak256 implementation as the rest of the alloy stack.

use std::fmt;

use alloy_primitives::Keccak256;
use bytes::Bytes;

use super::{HashAlgorithm, HashState};
use crate::error::WriteError;

/// Keccak256 output size in bytes
const KECCAK256_OUTPUT_SIZE: usize = 32;

/// Default hash algorithm: legacy (pre-NIST) Keccak256.
#[derive(Debug, Default, Clone, Copy)]
pub struct Keccak256Algorithm;

impl Keccak256Algorithm {
    /// Create the algorithm
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

impl HashAlgorithm for Keccak256Algorithm {
    type State = Keccak256State;

    #[inline]
    fn new_state(&self) -> Keccak256State {
        Keccak256State::new()
    }

    #[inline]
    fn output_size(&self) -> usize {
        KECCAK256_OUTPUT_SIZE
    }
}

/// Running Keccak256 state
pub struct Keccak256State {
    inner: Keccak256,
}

impl Keccak256State {
    /// Create an empty state
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: Keccak256::new(),
        }
    }
}

impl Default for Keccak256State {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Keccak256State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keccak256State").finish_non_exhaustive()
    }
}

impl HashState for Keccak256State {
    #[inline]
    fn write(&mut self, data: &[u8]) -> Result<(), WriteError> {
        self.inner.update(data);
        Ok(())
    }

    #[inline]
    fn finalize_reset(&mut self) -> Bytes {
        // Keccak256::finalize consumes the state, swap in a fresh one first
        let digest = std::mem::replace(&mut self.inner, Keccak256::new()).finalize();
        Bytes::copy_from_slice(digest.as_slice())
    }

    #[inline]
    fn reset(&mut self) {
        self.inner = Keccak256::new();
    }
}
