//! # Fixed Buffer
//!
//! A bounded byte store with independent write and read cursors.
//!
//! A buffer is written once, finalized, then read once:
//!
//! ```text
//!   0          read_pos        write_pos        max_size
//!   |-----------|-----------------|----------------|
//!     consumed      unread content     free space
//! ```
//!
//! Invariant: `0 <= read_pos <= write_pos <= max_size`. Writes past
//! `max_size` fail with `BufferOverflow`; reads past `write_pos` fail with
//! `BufferUnderflow`. The codec itself lives in [`WireWrite`] / [`WireRead`].
//!
//! ## Usage
//! ```rust
//! use tns_wire::core::buffer::Buffer;
//! use tns_wire::core::codec::{WireRead, WireWrite};
//!
//! let mut buf = Buffer::new(64).expect("capacity");
//! buf.write_ub4(70_000).expect("fits");
//! buf.finalize_for_read().expect("finalize");
//! assert_eq!(buf.read_ub4().expect("read"), 70_000);
//! ```

use bytes::{Bytes, BytesMut};

use crate::core::codec::{WireRead, WireWrite};
use crate::error::{constants, Result, WireError};

/// Fixed-capacity wire buffer
#[derive(Debug, Clone)]
pub struct Buffer {
    data: BytesMut,
    max_size: usize,
    read_pos: usize,
    finalized: bool,
}

impl Buffer {
    /// Allocate an empty buffer holding at most `max_size` bytes
    ///
    /// # Errors
    /// Returns `WireError::InvalidSize` if `max_size` is zero
    pub fn new(max_size: usize) -> Result<Self> {
        if max_size == 0 {
            return Err(WireError::InvalidSize(max_size));
        }
        Ok(Self {
            data: BytesMut::with_capacity(max_size),
            max_size,
            read_pos: 0,
            finalized: false,
        })
    }

    /// Build a buffer over received bytes, already finalized for reading
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut buf = Self::new(data.len())?;
        buf.write_raw(data)?;
        buf.finalize_for_read()?;
        Ok(buf)
    }

    /// Current capacity
    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Offset of the next write, which is also the content length
    #[inline]
    pub fn write_pos(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn read_pos(&self) -> usize {
        self.read_pos
    }

    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Freeze the content and rewind the read cursor
    ///
    /// # Errors
    /// Returns `WireError::InvalidState` if the buffer is empty or already finalized
    pub fn finalize_for_read(&mut self) -> Result<()> {
        if self.finalized {
            return Err(WireError::InvalidState(constants::ERR_ALREADY_FINALIZED));
        }
        if self.data.is_empty() {
            return Err(WireError::InvalidState(constants::ERR_FINALIZE_EMPTY));
        }
        self.finalized = true;
        self.read_pos = 0;
        Ok(())
    }

    /// Copy of `[0, write_pos)`; cursors are untouched
    pub fn snapshot(&self) -> Bytes {
        Bytes::copy_from_slice(&self.data)
    }

    /// Borrow `[0, write_pos)`
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, returning its content without copying
    pub fn into_bytes(self) -> Bytes {
        self.data.freeze()
    }

    /// Raise the capacity to `new_max`; never shrinks
    pub(crate) fn grow_to(&mut self, new_max: usize) {
        if new_max > self.max_size {
            self.data.reserve(new_max - self.data.len());
            self.max_size = new_max;
        }
    }

    pub(crate) fn ensure_writable(&self) -> Result<()> {
        if self.finalized {
            return Err(WireError::InvalidState(constants::ERR_ALREADY_FINALIZED));
        }
        Ok(())
    }

    fn ensure_readable(&self) -> Result<()> {
        if !self.finalized {
            return Err(WireError::InvalidState(constants::ERR_NOT_FINALIZED));
        }
        Ok(())
    }

    fn check_available(&self, len: usize) -> Result<()> {
        let available = self.data.len() - self.read_pos;
        if len > available {
            return Err(WireError::BufferUnderflow {
                requested: len,
                available,
            });
        }
        Ok(())
    }
}

impl WireWrite for Buffer {
    fn reserve(&mut self, additional: usize) -> Result<()> {
        self.ensure_writable()?;
        let available = self.max_size - self.data.len();
        if additional > available {
            return Err(WireError::BufferOverflow {
                requested: additional,
                available,
            });
        }
        Ok(())
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        WireWrite::reserve(self, data.len())?;
        self.data.extend_from_slice(data);
        Ok(())
    }
}

impl WireRead for Buffer {
    fn take_slice(&mut self, len: usize) -> Result<&[u8]> {
        self.ensure_readable()?;
        self.check_available(len)?;
        let start = self.read_pos;
        self.read_pos += len;
        Ok(&self.data[start..start + len])
    }

    fn peek_slice(&self, len: usize) -> Result<&[u8]> {
        self.ensure_readable()?;
        self.check_available(len)?;
        Ok(&self.data[self.read_pos..self.read_pos + len])
    }

    #[inline]
    fn position(&self) -> usize {
        self.read_pos
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.data.len() - self.read_pos
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(Buffer::new(0), Err(WireError::InvalidSize(0))));
        assert!(matches!(
            Buffer::from_bytes(&[]),
            Err(WireError::InvalidSize(0))
        ));
    }

    #[test]
    fn test_uint8_roundtrip() {
        let mut buf = Buffer::new(64).unwrap();
        buf.write_uint8(255).unwrap();
        buf.finalize_for_read().unwrap();
        assert_eq!(buf.read_uint8().unwrap(), 255);
    }

    #[test]
    fn test_overflow_leaves_content_intact() {
        let mut buf = Buffer::new(8).unwrap();
        buf.write_uint32_be(1).unwrap();
        let err = buf.write_bytes_with_length(&[0u8; 10]).unwrap_err();
        assert!(matches!(
            err,
            WireError::BufferOverflow {
                requested: 11,
                available: 4
            }
        ));
        assert_eq!(buf.write_pos(), 4);
        assert_eq!(buf.max_size(), 8);
    }

    #[test]
    fn test_fixed_buffer_rejects_twenty_bytes() {
        let mut buf = Buffer::new(8).unwrap();
        assert!(matches!(
            buf.write_raw(&[b'A'; 20]),
            Err(WireError::BufferOverflow { .. })
        ));
    }

    #[test]
    fn test_exact_fill() {
        let mut buf = Buffer::new(4).unwrap();
        buf.write_uint32_be(0x0102_0304).unwrap();
        assert_eq!(buf.write_pos(), buf.max_size());
        assert!(buf.write_uint8(0).is_err());
    }

    #[test]
    fn test_finalize_state_machine() {
        let mut empty = Buffer::new(4).unwrap();
        assert!(matches!(
            empty.finalize_for_read(),
            Err(WireError::InvalidState(_))
        ));

        let mut buf = Buffer::new(4).unwrap();
        buf.write_uint8(1).unwrap();
        assert!(matches!(buf.read_uint8(), Err(WireError::InvalidState(_))));
        buf.finalize_for_read().unwrap();
        assert!(matches!(
            buf.finalize_for_read(),
            Err(WireError::InvalidState(_))
        ));
        assert!(matches!(buf.write_uint8(2), Err(WireError::InvalidState(_))));
        assert_eq!(buf.read_uint8().unwrap(), 1);
    }

    #[test]
    fn test_underflow_does_not_move_cursor() {
        let mut buf = Buffer::from_bytes(&[1, 2, 3]).unwrap();
        buf.skip(2).unwrap();
        assert!(matches!(
            buf.read_uint16_be(),
            Err(WireError::BufferUnderflow {
                requested: 2,
                available: 1
            })
        ));
        assert_eq!(buf.read_pos(), 2);
        assert_eq!(buf.read_uint8().unwrap(), 3);
    }

    #[test]
    fn test_snapshot_keeps_cursors() {
        let mut buf = Buffer::new(16).unwrap();
        buf.write_uint16_be(0xABCD).unwrap();
        let first = buf.snapshot();
        buf.write_uint8(0xEF).unwrap();
        assert_eq!(&first[..], &[0xAB, 0xCD]);
        assert_eq!(&buf.snapshot()[..], &[0xAB, 0xCD, 0xEF]);
        assert_eq!(buf.write_pos(), 3);
        assert_eq!(buf.as_slice(), &[0xAB, 0xCD, 0xEF]);
    }
}
