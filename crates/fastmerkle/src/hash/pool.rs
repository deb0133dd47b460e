//! Thread-safe pool of reusable hash states.
//!
//! Workers acquire a state per job and hand it back when the
//! [`PooledState`] guard drops, on success and failure alike. States are
//! reset before they are parked, so a reacquired state starts empty.

use std::fmt;
use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

use super::{HashAlgorithm, HashState};

/// Pool of [`HashState`]s for one [`HashAlgorithm`].
pub struct HasherPool<A: HashAlgorithm> {
    algorithm: A,
    idle: Mutex<Vec<A::State>>,
}

impl<A: HashAlgorithm> HasherPool<A> {
    /// Create an empty pool; states are allocated on demand.
    pub fn new(algorithm: A) -> Self {
        Self {
            algorithm,
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Create a pool holding `capacity` pre-allocated states.
    pub fn with_capacity(algorithm: A, capacity: usize) -> Self {
        let idle = (0..capacity).map(|_| algorithm.new_state()).collect();
        Self {
            algorithm,
            idle: Mutex::new(idle),
        }
    }

    /// Take a state from the pool, allocating one if none is parked.
    pub fn acquire(&self) -> PooledState<'_, A> {
        let parked = self.idle.lock().pop();
        let state = parked.unwrap_or_else(|| self.algorithm.new_state());
        PooledState {
            pool: self,
            state: Some(state),
        }
    }

    fn release(&self, mut state: A::State) {
        state.reset();
        self.idle.lock().push(state);
    }

    /// Number of states currently parked in the pool.
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }

    /// The algorithm this pool draws states from.
    #[inline]
    pub const fn algorithm(&self) -> &A {
        &self.algorithm
    }
}

impl<A: HashAlgorithm> fmt::Debug for HasherPool<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HasherPool")
            .field("algorithm", &std::any::type_name::<A>())
            .field("idle", &self.idle())
            .finish()
    }
}

/// A state on loan from a [`HasherPool`]; returned to the pool on drop.
pub struct PooledState<'a, A: HashAlgorithm> {
    pool: &'a HasherPool<A>,
    // Always `Some` until `drop` takes it.
    state: Option<A::State>,
}

impl<A: HashAlgorithm> Deref for PooledState<'_, A> {
    type Target = A::State;

    fn deref(&self) -> &A::State {
        self.state.as_ref().expect("pooled state present until drop")
    }
}

impl<A: HashAlgorithm> DerefMut for PooledState<'_, A> {
    fn deref_mut(&mut self) -> &mut A::State {
        self.state.as_mut().expect("pooled state present until drop")
    }
}

impl<A: HashAlgorithm> Drop for PooledState<'_, A> {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            self.pool.release(state);
        }
    }
}

impl<A: HashAlgorithm> fmt::Debug for PooledState<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledState").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Keccak256Algorithm;
    use crate::test_utils::ToyAlgorithm;
    use alloy_primitives::keccak256;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_pool_preallocates() {
        let pool = HasherPool::with_capacity(Keccak256Algorithm::new(), 4);
        assert_eq!(pool.idle(), 4);

        let a = pool.acquire();
        let b = pool.acquire();
        assert_eq!(pool.idle(), 2);

        drop(a);
        drop(b);
        assert_eq!(pool.idle(), 4);
    }

    #[test]
    fn test_pool_allocates_on_demand() {
        let pool = HasherPool::new(Keccak256Algorithm::new());
        assert_eq!(pool.idle(), 0);

        let state = pool.acquire();
        assert_eq!(pool.idle(), 0);
        drop(state);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_released_state_is_reset() {
        let pool = HasherPool::new(ToyAlgorithm);
        {
            let mut state = pool.acquire();
            state.write(&[0xaa, 0xbb]).unwrap();
            // dropped without finalizing
        }

        let mut state = pool.acquire();
        state.write(&[0x01]).unwrap();
        assert_eq!(state.finalize_reset().as_ref(), &[0x01, 0x01]);
    }

    #[test]
    fn test_pool_concurrent_acquire_release() {
        let pool = Arc::new(HasherPool::with_capacity(Keccak256Algorithm::new(), 2));

        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let mut state = pool.acquire();
                        state.write(&[i]).unwrap();
                        assert_eq!(state.finalize_reset().as_ref(), keccak256([i]).as_slice());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        // Every state ever created is parked again
        assert!(pool.idle() >= 2);
        assert!(pool.idle() <= 8 + 2);
    }
}
