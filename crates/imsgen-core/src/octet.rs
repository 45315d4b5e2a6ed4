//! Fixed-capacity byte buffers for key material.
//!
//! Every derived value lives in an [`Octet`]: a buffer with a declared
//! capacity and a current logical length. Several outputs are shorter than
//! the storage that holds them (a 23-byte tail of a 32-byte digest, 32-byte
//! legacy primes in 128-byte storage), so the deriver that fills a buffer
//! also sets its length, and readers only ever see `[0..len]`.

use std::fmt;

use zeroize::Zeroize;

use crate::error::ImsError;

/// Length-prefixed byte buffer with capacity `N`.
///
/// Contents are zeroized on drop. `Debug` prints the length only.
#[derive(Clone)]
pub struct Octet<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> Octet<N> {
    /// Storage capacity in bytes.
    pub const CAPACITY: usize = N;

    /// Empty buffer (logical length zero).
    pub fn new() -> Self {
        Self { buf: [0u8; N], len: 0 }
    }

    /// Copy `bytes` into a new buffer.
    ///
    /// # Errors
    ///
    /// - `InvalidLength`: `bytes` is longer than the capacity
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ImsError> {
        if bytes.len() > N {
            return Err(ImsError::InvalidLength { expected: N, actual: bytes.len() });
        }

        let mut octet = Self::new();
        octet.buf[..bytes.len()].copy_from_slice(bytes);
        octet.len = bytes.len();
        Ok(octet)
    }

    /// The logical contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Current logical length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Storage capacity in bytes.
    pub fn capacity(&self) -> usize {
        N
    }

    /// Lowercase hex of the logical contents.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Full backing storage, for derivers filling the buffer.
    ///
    /// The logical length is not touched; the caller must follow up with
    /// [`Self::set_len`].
    pub(crate) fn storage_mut(&mut self) -> &mut [u8; N] {
        &mut self.buf
    }

    /// Declare how many bytes of the storage are meaningful.
    pub(crate) fn set_len(&mut self, len: usize) {
        debug_assert!(len <= N, "logical length {len} exceeds capacity {N}");
        self.len = len.min(N);
    }
}

impl<const N: usize> Default for Octet<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> AsRef<[u8]> for Octet<N> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<const N: usize> PartialEq for Octet<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const N: usize> Eq for Octet<N> {}

impl<const N: usize> fmt::Debug for Octet<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Octet")
            .field("len", &self.len)
            .field("capacity", &N)
            .finish_non_exhaustive()
    }
}

impl<const N: usize> Drop for Octet<N> {
    fn drop(&mut self) {
        self.buf.zeroize();
        self.len = 0;
    }
}
