//! # Growable Buffer
//!
//! A [`Buffer`] that reallocates instead of overflowing. Capacity doubles
//! until the pending write fits; written content is preserved. Reads behave
//! exactly like the fixed buffer.
//!
//! `max_size()` reports the current allocation and may change across writes.

use bytes::Bytes;
use tracing::trace;

use crate::core::buffer::Buffer;
use crate::core::codec::{WireRead, WireWrite};
use crate::error::Result;

/// Wire buffer whose capacity grows on demand
#[derive(Debug, Clone)]
pub struct GrowableBuffer {
    inner: Buffer,
}

impl GrowableBuffer {
    /// Allocate with an initial capacity of `max_size` bytes
    ///
    /// # Errors
    /// Returns `WireError::InvalidSize` if `max_size` is zero
    pub fn new(max_size: usize) -> Result<Self> {
        Ok(Self {
            inner: Buffer::new(max_size)?,
        })
    }

    #[inline]
    pub fn max_size(&self) -> usize {
        self.inner.max_size()
    }

    #[inline]
    pub fn write_pos(&self) -> usize {
        self.inner.write_pos()
    }

    #[inline]
    pub fn read_pos(&self) -> usize {
        self.inner.read_pos()
    }

    pub fn finalize_for_read(&mut self) -> Result<()> {
        self.inner.finalize_for_read()
    }

    pub fn snapshot(&self) -> Bytes {
        self.inner.snapshot()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.inner.as_slice()
    }

    pub fn into_bytes(self) -> Bytes {
        self.inner.into_bytes()
    }

    /// Unwrap into a fixed buffer at the current capacity
    pub fn into_inner(self) -> Buffer {
        self.inner
    }
}

impl WireWrite for GrowableBuffer {
    fn reserve(&mut self, additional: usize) -> Result<()> {
        self.inner.ensure_writable()?;
        let needed = self.inner.write_pos().saturating_add(additional);
        let current = self.inner.max_size();
        if needed > current {
            let mut new_max = current;
            while new_max < needed {
                new_max = new_max.saturating_mul(2);
            }
            trace!(from = current, to = new_max, "growing buffer");
            self.inner.grow_to(new_max);
        }
        Ok(())
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        WireWrite::reserve(self, data.len())?;
        self.inner.write_raw(data)
    }
}

impl WireRead for GrowableBuffer {
    fn take_slice(&mut self, len: usize) -> Result<&[u8]> {
        self.inner.take_slice(len)
    }

    fn peek_slice(&self, len: usize) -> Result<&[u8]> {
        self.inner.peek_slice(len)
    }

    fn position(&self) -> usize {
        self.inner.position()
    }

    fn remaining(&self) -> usize {
        self.inner.remaining()
    }
}
