//! Transport header framing.
//!
//! ```text
//! [length(4, BE)] [packet_type(1)] [flags(1)] [header_checksum(2)]
//! ```
//!
//! The first four bytes are the framing prefix the capture comparator skips:
//! they differ between implementations whenever packet sizes do.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::core::buffer::Buffer;
use crate::core::codec::{WireRead, WireWrite};
use crate::error::{Result, WireError};

/// Size of the transport header preceding every message
pub const TRANSPORT_HEADER_LEN: usize = 8;

/// Size of the data-flags field following the header of a DATA packet
pub const DATA_FLAGS_LEN: usize = 2;

/// Leading header bytes that carry framing rather than payload
pub const FRAMING_PREFIX_LEN: usize = 4;

/// Packet type of ordinary data packets
pub const PACKET_TYPE_DATA: u8 = 6;

/// Parsed transport header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportHeader {
    /// Total packet length, header included
    pub length: u32,
    pub packet_type: u8,
    pub flags: u8,
    pub checksum: u16,
}

impl TransportHeader {
    /// Header for a DATA packet carrying `payload_len` bytes after the header
    pub fn data(payload_len: usize) -> Result<Self> {
        let length = u32::try_from(TRANSPORT_HEADER_LEN + payload_len).map_err(|_| {
            WireError::ValueTooLarge(format!("packet payload of {payload_len} bytes"))
        })?;
        Ok(Self {
            length,
            packet_type: PACKET_TYPE_DATA,
            flags: 0,
            checksum: 0,
        })
    }

    pub fn write_to<W: WireWrite + ?Sized>(&self, out: &mut W) -> Result<()> {
        out.reserve(TRANSPORT_HEADER_LEN)?;
        out.write_uint32_be(self.length)?;
        out.write_uint8(self.packet_type)?;
        out.write_uint8(self.flags)?;
        out.write_uint16_be(self.checksum)
    }

    pub fn read_from<R: WireRead + ?Sized>(input: &mut R) -> Result<Self> {
        Ok(Self {
            length: input.read_uint32_be()?,
            packet_type: input.read_uint8()?,
            flags: input.read_uint8()?,
            checksum: input.read_uint16_be()?,
        })
    }

    /// Parse the header at the start of a captured packet
    pub fn parse(packet: &[u8]) -> Result<Self> {
        let head = packet.get(..TRANSPORT_HEADER_LEN).ok_or(WireError::BufferUnderflow {
            requested: TRANSPORT_HEADER_LEN,
            available: packet.len(),
        })?;
        let mut buf = Buffer::from_bytes(head)?;
        Self::read_from(&mut buf)
    }
}

/// Prefix `body` (data flags onward) with a DATA transport header
pub fn frame_data_packet(body: &[u8]) -> Result<Bytes> {
    let header = TransportHeader::data(body.len())?;
    let mut buf = Buffer::new(TRANSPORT_HEADER_LEN + body.len())?;
    header.write_to(&mut buf)?;
    buf.write_raw(body)?;
    Ok(buf.into_bytes())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_frame_layout() {
        let packet = frame_data_packet(&[0, 0, 0xAA]).unwrap();
        assert_eq!(&packet[..], &[0, 0, 0, 11, PACKET_TYPE_DATA, 0, 0, 0, 0, 0, 0xAA]);
    }

    #[test]
    fn test_parse_header() {
        let packet = frame_data_packet(&[1, 2, 3, 4]).unwrap();
        let header = TransportHeader::parse(&packet).unwrap();
        assert_eq!(header.length as usize, packet.len());
        assert_eq!(header.packet_type, PACKET_TYPE_DATA);
    }

    #[test]
    fn test_parse_truncated_header() {
        assert!(matches!(
            TransportHeader::parse(&[0, 0, 0]),
            Err(WireError::BufferUnderflow {
                requested: 8,
                available: 3
            })
        ));
    }
}
