//! Adapter from RustCrypto [`Digest`] implementations to [`HashAlgorithm`].

use std::fmt;
use std::marker::PhantomData;

use bytes::Bytes;
use digest::{Digest, FixedOutputReset};

use super::{HashAlgorithm, HashState};
use crate::error::WriteError;

/// A [`HashAlgorithm`] producing states of the digest type `D`.
///
/// ```
/// use fastmerkle::{TreeBuilder, hash::DigestAlgorithm};
/// # fn demo<D: digest::Digest + digest::FixedOutputReset + Send + 'static>() {
/// let builder = TreeBuilder::new(DigestAlgorithm::<D>::new());
/// let tree = builder.build(&[b"a".as_slice(), b"b".as_slice()]).unwrap();
/// assert_eq!(tree.root_hash().len(), <D as digest::Digest>::output_size());
/// # }
/// ```
pub struct DigestAlgorithm<D> {
    _digest: PhantomData<fn() -> D>,
}

impl<D> DigestAlgorithm<D> {
    /// Create the algorithm
    #[inline]
    pub const fn new() -> Self {
        Self {
            _digest: PhantomData,
        }
    }
}

impl<D> Default for DigestAlgorithm<D> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for DigestAlgorithm<D> {
    #[inline]
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<D> fmt::Debug for DigestAlgorithm<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestAlgorithm")
            .field("digest", &std::any::type_name::<D>())
            .finish()
    }
}

impl<D> HashAlgorithm for DigestAlgorithm<D>
where
    D: Digest + FixedOutputReset + Send + 'static,
{
    type State = DigestState<D>;

    #[inline]
    fn new_state(&self) -> DigestState<D> {
        DigestState { inner: D::new() }
    }

    #[inline]
    fn output_size(&self) -> usize {
        <D as Digest>::output_size()
    }
}

/// Running state of a wrapped [`Digest`]
pub struct DigestState<D> {
    inner: D,
}

impl<D> fmt::Debug for DigestState<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestState")
            .field("digest", &std::any::type_name::<D>())
            .finish_non_exhaustive()
    }
}

impl<D> HashState for DigestState<D>
where
    D: Digest + FixedOutputReset + Send + 'static,
{
    #[inline]
    fn write(&mut self, data: &[u8]) -> Result<(), WriteError> {
        Digest::update(&mut self.inner, data);
        Ok(())
    }

    #[inline]
    fn finalize_reset(&mut self) -> Bytes {
        Bytes::copy_from_slice(Digest::finalize_reset(&mut self.inner).as_slice())
    }

    #[inline]
    fn reset(&mut self) {
        Digest::reset(&mut self.inner);
    }
}
