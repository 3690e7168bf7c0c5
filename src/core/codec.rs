//! # Wire Codec
//!
//! Encoding rules of the TNS wire format, layered over any buffer.
//!
//! [`WireWrite`] and [`WireRead`] carry the whole codec as provided methods;
//! a buffer only supplies raw byte movement (`reserve`/`write_raw` on the
//! write side, `take_slice`/`peek_slice` on the read side). Both the fixed
//! [`Buffer`](crate::core::buffer::Buffer) and the
//! [`GrowableBuffer`](crate::core::growable::GrowableBuffer) get identical
//! encodings this way, differing only in what happens on overflow.
//!
//! ## Encodings
//! ```text
//! uint8/16/32/64   big-endian, fixed width
//! UB2/UB4/UB8      [len(1)] [value(len)]        len in {0,1,2,4,8}, minimal
//! bytes (short)    [len(1)] [data(len)]         len < 0xFE
//! bytes (long)     [0xFE] ([chunk_len(4)] [chunk])* [0x00000000]
//! NUMBER           [len(1)] [exponent(1)] [mantissa(len-1)]
//! ```
//!
//! Multi-byte writes reserve their full size first, so a failed write on a
//! fixed buffer never leaves a partial value behind.

use serde::{Deserialize, Serialize};

use crate::core::number;
use crate::error::{constants, Result, WireError};

/// Length prefix introducing the chunked long form of a byte string.
pub const LONG_LENGTH_INDICATOR: u8 = 0xFE;

/// Length prefix the protocol uses for a NULL value.
pub const NULL_LENGTH_INDICATOR: u8 = 0xFF;

/// Chunk size used when writing the long form.
pub const CHUNK_SIZE: usize = 32767;

/// How length-prefixed text is turned into a `String`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Utf8Mode {
    /// Malformed sequences fail with `InvalidEncoding`
    #[default]
    Strict,
    /// Malformed sequences are replaced with U+FFFD
    Lossy,
}

/// Shape of a value to decode with [`WireRead::read_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireKind {
    U8,
    U16,
    U32,
    U64,
    Ub4,
    Bytes,
    Text(Utf8Mode),
    Number,
}

/// A decoded wire value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Ub4(u32),
    Bytes(Vec<u8>),
    Text(String),
    /// Packed decimal, as canonical decimal text
    Number(String),
}

/// Decode `bytes` as UTF-8 according to `mode`.
pub fn decode_text(bytes: Vec<u8>, mode: Utf8Mode) -> Result<String> {
    match mode {
        Utf8Mode::Strict => String::from_utf8(bytes).map_err(|e| {
            WireError::InvalidEncoding(format!(
                "{} at byte {}",
                constants::ERR_INVALID_UTF8,
                e.utf8_error().valid_up_to()
            ))
        }),
        Utf8Mode::Lossy => Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }),
    }
}

/// Number of payload bytes in the minimal variable-width encoding of `value`.
fn var_uint_width(value: u64) -> usize {
    match value {
        0 => 0,
        1..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFFFF_FFFF => 4,
        _ => 8,
    }
}

/// Encoding operations over a writable byte store.
pub trait WireWrite {
    /// Make room for `additional` more bytes, or fail without writing anything.
    fn reserve(&mut self, additional: usize) -> Result<()>;

    /// Append raw bytes with no prefix.
    fn write_raw(&mut self, data: &[u8]) -> Result<()>;

    fn write_uint8(&mut self, value: u8) -> Result<()> {
        self.write_raw(&[value])
    }

    fn write_uint16_be(&mut self, value: u16) -> Result<()> {
        self.write_raw(&value.to_be_bytes())
    }

    fn write_uint32_be(&mut self, value: u32) -> Result<()> {
        self.write_raw(&value.to_be_bytes())
    }

    fn write_uint64_be(&mut self, value: u64) -> Result<()> {
        self.write_raw(&value.to_be_bytes())
    }

    /// Write `value` as a length prefix plus its minimal big-endian bytes,
    /// using at most `max_width` payload bytes.
    fn write_var_uint(&mut self, value: u64, max_width: usize) -> Result<()> {
        let width = var_uint_width(value);
        if width > max_width {
            return Err(WireError::ValueTooLarge(format!(
                "{value} does not fit in {max_width} bytes"
            )));
        }
        self.reserve(1 + width)?;
        self.write_uint8(width as u8)?;
        self.write_raw(&value.to_be_bytes()[8 - width..])
    }

    fn write_ub2(&mut self, value: u16) -> Result<()> {
        self.write_var_uint(u64::from(value), 2)
    }

    /// Write a UB4. Values above `u32::MAX` fail with `ValueTooLarge`.
    fn write_ub4(&mut self, value: u64) -> Result<()> {
        self.write_var_uint(value, 4)
    }

    fn write_ub8(&mut self, value: u64) -> Result<()> {
        self.write_var_uint(value, 8)
    }

    /// Write a byte string with a length prefix, switching to the chunked
    /// long form at `0xFE` bytes and above.
    fn write_bytes_with_length(&mut self, data: &[u8]) -> Result<()> {
        if data.len() < LONG_LENGTH_INDICATOR as usize {
            self.reserve(1 + data.len())?;
            self.write_uint8(data.len() as u8)?;
            return self.write_raw(data);
        }

        let chunks = data.len().div_ceil(CHUNK_SIZE);
        self.reserve(1 + data.len() + 4 * (chunks + 1))?;
        self.write_uint8(LONG_LENGTH_INDICATOR)?;
        for chunk in data.chunks(CHUNK_SIZE) {
            self.write_uint32_be(chunk.len() as u32)?;
            self.write_raw(chunk)?;
        }
        self.write_uint32_be(0)
    }

    fn write_str_with_length(&mut self, text: &str) -> Result<()> {
        self.write_bytes_with_length(text.as_bytes())
    }

    /// Write decimal text (e.g. `b"-123.45"`, `b"1e10"`) as a packed-decimal NUMBER.
    fn write_oracle_number(&mut self, digits_text: &[u8]) -> Result<()> {
        let encoded = number::encode_number(digits_text)?;
        self.write_raw(&encoded)
    }
}

/// Decoding operations over a readable byte store.
pub trait WireRead {
    /// Consume the next `len` bytes.
    fn take_slice(&mut self, len: usize) -> Result<&[u8]>;

    /// Look at the next `len` bytes without consuming them.
    fn peek_slice(&self, len: usize) -> Result<&[u8]>;

    /// Offset of the next byte to read.
    fn position(&self) -> usize;

    /// Bytes left between the read cursor and the end of the content.
    fn remaining(&self) -> usize;

    fn skip(&mut self, len: usize) -> Result<()> {
        self.take_slice(len).map(|_| ())
    }

    fn peek_uint8(&self) -> Result<u8> {
        Ok(self.peek_slice(1)?[0])
    }

    fn read_uint8(&mut self) -> Result<u8> {
        Ok(self.take_slice(1)?[0])
    }

    fn read_uint16_be(&mut self) -> Result<u16> {
        let b = self.take_slice(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_uint32_be(&mut self) -> Result<u32> {
        let b = self.take_slice(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_uint64_be(&mut self) -> Result<u64> {
        let b = self.take_slice(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(u64::from_be_bytes(raw))
    }

    /// Read a length-prefixed unsigned integer of at most `max_width` bytes.
    fn read_var_uint(&mut self, max_width: usize) -> Result<u64> {
        let width = self.read_uint8()? as usize;
        if width > max_width {
            return Err(WireError::ValueTooLarge(format!(
                "length prefix {width} exceeds {max_width} bytes"
            )));
        }
        let bytes = self.take_slice(width)?;
        Ok(bytes
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    fn read_ub2(&mut self) -> Result<u16> {
        Ok(self.read_var_uint(2)? as u16)
    }

    fn read_ub4(&mut self) -> Result<u32> {
        Ok(self.read_var_uint(4)? as u32)
    }

    fn read_ub8(&mut self) -> Result<u64> {
        self.read_var_uint(8)
    }

    /// Read a length-prefixed byte string in short or long form.
    ///
    /// A NULL length prefix yields an empty vector.
    fn read_bytes_with_length(&mut self) -> Result<Vec<u8>> {
        match self.read_uint8()? {
            0 | NULL_LENGTH_INDICATOR => Ok(Vec::new()),
            LONG_LENGTH_INDICATOR => {
                let mut out = Vec::new();
                loop {
                    let chunk_len = self.read_uint32_be()? as usize;
                    if chunk_len == 0 {
                        break;
                    }
                    out.extend_from_slice(self.take_slice(chunk_len)?);
                }
                Ok(out)
            }
            len => Ok(self.take_slice(len as usize)?.to_vec()),
        }
    }

    fn read_str_with_length(&mut self, mode: Utf8Mode) -> Result<String> {
        let bytes = self.read_bytes_with_length()?;
        decode_text(bytes, mode)
    }

    /// Read a packed-decimal NUMBER and return it as canonical decimal text.
    fn read_oracle_number(&mut self) -> Result<String> {
        let len = self.read_uint8()? as usize;
        if len == 0 || len == NULL_LENGTH_INDICATOR as usize {
            return Err(WireError::InvalidEncoding(
                constants::ERR_NUMBER_BYTES.into(),
            ));
        }
        number::decode_number(self.take_slice(len)?)
    }

    fn read_value(&mut self, kind: WireKind) -> Result<WireValue> {
        Ok(match kind {
            WireKind::U8 => WireValue::U8(self.read_uint8()?),
            WireKind::U16 => WireValue::U16(self.read_uint16_be()?),
            WireKind::U32 => WireValue::U32(self.read_uint32_be()?),
            WireKind::U64 => WireValue::U64(self.read_uint64_be()?),
            WireKind::Ub4 => WireValue::Ub4(self.read_ub4()?),
            WireKind::Bytes => WireValue::Bytes(self.read_bytes_with_length()?),
            WireKind::Text(mode) => WireValue::Text(self.read_str_with_length(mode)?),
            WireKind::Number => WireValue::Number(self.read_oracle_number()?),
        })
    }
}
