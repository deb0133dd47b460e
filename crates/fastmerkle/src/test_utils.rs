//! Test-only hash algorithms.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::WriteError;
use crate::hash::{HashAlgorithm, HashState};

/// Length-prefix "hash": `T(x) = len(x) as u8 || x`.
///
/// Not a digest at all, but every tree it produces can be checked by hand.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ToyAlgorithm;

#[derive(Debug, Default)]
pub(crate) struct ToyState {
    buffer: BytesMut,
}

impl HashAlgorithm for ToyAlgorithm {
    type State = ToyState;

    fn new_state(&self) -> ToyState {
        ToyState::default()
    }

    fn output_size(&self) -> usize {
        0
    }
}

impl HashState for ToyState {
    fn write(&mut self, data: &[u8]) -> Result<(), WriteError> {
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    fn finalize_reset(&mut self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.buffer.len() + 1);
        out.put_u8(self.buffer.len() as u8);
        out.extend_from_slice(&self.buffer);
        self.buffer.clear();
        out.freeze()
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }
}

/// [`ToyAlgorithm`] that rejects any write equal to `poison`.
#[derive(Debug, Clone)]
pub(crate) struct FailingAlgorithm {
    pub(crate) poison: Bytes,
}

impl FailingAlgorithm {
    pub(crate) fn new(poison: &[u8]) -> Self {
        Self {
            poison: Bytes::copy_from_slice(poison),
        }
    }
}

#[derive(Debug)]
pub(crate) struct FailingState {
    inner: ToyState,
    poison: Bytes,
}

impl HashAlgorithm for FailingAlgorithm {
    type State = FailingState;

    fn new_state(&self) -> FailingState {
        FailingState {
            inner: ToyState::default(),
            poison: self.poison.clone(),
        }
    }

    fn output_size(&self) -> usize {
        0
    }
}

impl HashState for FailingState {
    fn write(&mut self, data: &[u8]) -> Result<(), WriteError> {
        if data == self.poison.as_ref() {
            return Err(WriteError::rejected("poisoned input"));
        }
        self.inner.write(data)
    }

    fn finalize_reset(&mut self) -> Bytes {
        self.inner.finalize_reset()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

/// [`ToyAlgorithm`] whose states panic when they see `trigger`.
#[derive(Debug, Clone)]
pub(crate) struct PanickingAlgorithm {
    pub(crate) trigger: Bytes,
}

#[derive(Debug)]
pub(crate) struct PanickingState {
    inner: ToyState,
    trigger: Bytes,
}

impl HashAlgorithm for PanickingAlgorithm {
    type State = PanickingState;

    fn new_state(&self) -> PanickingState {
        PanickingState {
            inner: ToyState::default(),
            trigger: self.trigger.clone(),
        }
    }

    fn output_size(&self) -> usize {
        0
    }
}

impl HashState for PanickingState {
    fn write(&mut self, data: &[u8]) -> Result<(), WriteError> {
        assert_ne!(data, self.trigger.as_ref(), "hash state blew up");
        self.inner.write(data)
    }

    fn finalize_reset(&mut self) -> Bytes {
        self.inner.finalize_reset()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

/// Install a test subscriber once; honours `RUST_LOG`.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
