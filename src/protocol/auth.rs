//! Authentication message field model.
//!
//! Decodes (and, for fixtures, encodes) the messages exchanged during the
//! two authentication round trips. Key/value pairs are protocol-ordered
//! fields rather than a map: keys may repeat and consumers depend on the
//! order, so they are kept as a `Vec` in wire order.
//!
//! Decoding is all-or-nothing. Any primitive failure surfaces as
//! `WireError::MalformedMessage` carrying the offset of the field that failed,
//! which lines up with offsets reported by the capture comparator.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::{BufferConfig, DecodeConfig};
use crate::core::buffer::Buffer;
use crate::core::codec::{decode_text, Utf8Mode, WireRead, WireWrite};
use crate::core::growable::GrowableBuffer;
use crate::core::serialization::MultiFormat;
use crate::error::Result;
use crate::protocol::packet::{self, DATA_FLAGS_LEN, TRANSPORT_HEADER_LEN};
use crate::protocol::{auth_mode, FUNC_AUTH_PHASE_ONE, FUNC_AUTH_PHASE_TWO, MSG_TYPE_FUNCTION};

/// Placeholder byte written for the pointer fields
const POINTER_PRESENT: u8 = 1;

const BODY_INITIAL_CAPACITY: usize = 256;

/// Authentication round trip identified by a function code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    One,
    Two,
    Other(u8),
}

impl From<u8> for AuthPhase {
    fn from(code: u8) -> Self {
        match code {
            FUNC_AUTH_PHASE_ONE => AuthPhase::One,
            FUNC_AUTH_PHASE_TWO => AuthPhase::Two,
            other => AuthPhase::Other(other),
        }
    }
}

/// One key/value field of an authentication message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValuePair {
    pub key: String,
    /// Decoded leniently; invalid UTF-8 becomes U+FFFD
    pub value: String,
    /// Length declared on the wire, kept as sent
    pub value_len: u32,
    pub flags: u32,
}

impl KeyValuePair {
    /// Pair whose declared length matches the UTF-8 length of `value`
    ///
    /// The declared length saturates at `u32::MAX`; the value itself is still
    /// written in full by the chunked long form.
    pub fn new(key: impl Into<String>, value: impl Into<String>, flags: u32) -> Self {
        let value = value.into();
        Self {
            key: key.into(),
            value_len: declared_len(value.len()),
            value,
            flags,
        }
    }
}

fn declared_len(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Decoded authentication-phase message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthMessage {
    pub msg_type: u8,
    pub function_code: u8,
    pub seq_num: u8,
    pub has_user: bool,
    pub user: Option<String>,
    pub auth_mode: u32,
    pub pairs: Vec<KeyValuePair>,
}

impl MultiFormat for AuthMessage {}

/// Run one field decode, tagging failures with the field's starting offset
fn field<R, T>(reader: &mut R, decode: impl FnOnce(&mut R) -> Result<T>) -> Result<T>
where
    R: WireRead + ?Sized,
{
    let offset = reader.position();
    decode(reader).map_err(|e| e.at_offset(offset))
}

impl AuthMessage {
    /// Function-call message for the given round trip
    pub fn new(function_code: u8, seq_num: u8, user: Option<&str>, auth_mode: u32) -> Self {
        Self {
            msg_type: MSG_TYPE_FUNCTION,
            function_code,
            seq_num,
            has_user: user.is_some(),
            user: user.map(str::to_string),
            auth_mode,
            pairs: Vec::new(),
        }
    }

    /// First round trip: announces the user and session properties
    pub fn phase_one(user: &str, pairs: Vec<KeyValuePair>) -> Self {
        let mut msg = Self::new(FUNC_AUTH_PHASE_ONE, 1, Some(user), auth_mode::LOGON);
        msg.pairs = pairs;
        msg
    }

    /// Second round trip: carries the verifier response
    pub fn phase_two(user: &str, pairs: Vec<KeyValuePair>) -> Self {
        let mut msg = Self::new(
            FUNC_AUTH_PHASE_TWO,
            2,
            Some(user),
            auth_mode::LOGON | auth_mode::WITH_PASSWORD,
        );
        msg.pairs = pairs;
        msg
    }

    /// Append a pair, keeping wire order
    pub fn with_pair(mut self, key: &str, value: &str, flags: u32) -> Self {
        self.pairs.push(KeyValuePair::new(key, value, flags));
        self
    }

    pub fn phase(&self) -> AuthPhase {
        AuthPhase::from(self.function_code)
    }

    /// First pair with `key`
    pub fn pair(&self, key: &str) -> Option<&KeyValuePair> {
        self.pairs.iter().find(|p| p.key == key)
    }

    /// Every pair with `key`, in wire order
    pub fn pairs_named<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a KeyValuePair> + 'a {
        self.pairs.iter().filter(move |p| p.key == key)
    }

    /// Decode a complete message, header included
    pub fn decode(packet: &[u8]) -> Result<Self> {
        Self::decode_with(packet, &DecodeConfig::default())
    }

    #[instrument(skip_all, fields(len = packet.len()))]
    pub fn decode_with(packet: &[u8], config: &DecodeConfig) -> Result<Self> {
        let mut buf = Buffer::from_bytes(packet).map_err(|e| e.at_offset(0))?;
        let msg = Self::read_from(&mut buf, config.key_mode())?;
        if buf.remaining() > 0 {
            debug!(trailing = buf.remaining(), "bytes left after auth message");
        }
        Ok(msg)
    }

    /// Decode from a reader positioned at the start of the transport header
    pub fn read_from<R: WireRead + ?Sized>(reader: &mut R, key_mode: Utf8Mode) -> Result<Self> {
        field(reader, |r| r.skip(TRANSPORT_HEADER_LEN + DATA_FLAGS_LEN))?;

        let msg_type = field(reader, |r| r.read_uint8())?;
        let function_code = field(reader, |r| r.read_uint8())?;
        let seq_num = field(reader, |r| r.read_uint8())?;
        let has_user = field(reader, |r| r.read_uint8())? != 0;

        let user_len = field(reader, |r| r.read_ub4())?;
        let auth_mode = field(reader, |r| r.read_ub4())?;
        field(reader, |r| r.skip(1))?;
        let num_pairs = field(reader, |r| r.read_ub4())? as usize;
        field(reader, |r| r.skip(2))?;

        let user = if has_user {
            Some(field(reader, |r| r.read_str_with_length(key_mode))?)
        } else {
            None
        };

        // each pair takes at least four bytes; cap the allocation by what is left
        let mut pairs = Vec::with_capacity(num_pairs.min(reader.remaining() / 4));
        for _ in 0..num_pairs {
            let _key_len = field(reader, |r| r.read_ub4())?;
            let key = field(reader, |r| r.read_str_with_length(key_mode))?;
            let value_len = field(reader, |r| r.read_ub4())?;
            // the value field is present whatever value_len declares
            let value = field(reader, |r| {
                let raw = r.read_bytes_with_length()?;
                decode_text(raw, Utf8Mode::Lossy)
            })?;
            let flags = field(reader, |r| r.read_ub4())?;
            pairs.push(KeyValuePair {
                key,
                value,
                value_len,
                flags,
            });
        }

        debug!(
            msg_type,
            function_code,
            seq_num,
            user_len,
            auth_mode,
            num_pairs,
            "decoded auth message"
        );

        Ok(Self {
            msg_type,
            function_code,
            seq_num,
            has_user,
            user,
            auth_mode,
            pairs,
        })
    }

    /// Write everything after the transport header
    pub fn write_body<W: WireWrite + ?Sized>(&self, out: &mut W) -> Result<()> {
        let user = self.user.as_deref().unwrap_or_default();

        out.write_uint16_be(0)?;
        out.write_uint8(self.msg_type)?;
        out.write_uint8(self.function_code)?;
        out.write_uint8(self.seq_num)?;
        out.write_uint8(u8::from(self.has_user))?;
        out.write_ub4(user.len() as u64)?;
        out.write_ub4(u64::from(self.auth_mode))?;
        out.write_uint8(POINTER_PRESENT)?;
        out.write_ub4(self.pairs.len() as u64)?;
        out.write_uint8(POINTER_PRESENT)?;
        out.write_uint8(POINTER_PRESENT)?;

        if self.has_user {
            out.write_str_with_length(user)?;
        }

        for pair in &self.pairs {
            out.write_ub4(pair.key.len() as u64)?;
            out.write_str_with_length(&pair.key)?;
            out.write_ub4(u64::from(pair.value_len))?;
            out.write_str_with_length(&pair.value)?;
            out.write_ub4(u64::from(pair.flags))?;
        }
        Ok(())
    }

    /// Encode as a complete DATA packet
    pub fn encode(&self) -> Result<Bytes> {
        let mut body = GrowableBuffer::new(BODY_INITIAL_CAPACITY)?;
        self.write_body(&mut body)?;
        packet::frame_data_packet(body.as_slice())
    }

    /// Encode using the configured buffer policy
    ///
    /// # Errors
    /// With `growable = false`, fails with `BufferOverflow` when the body does
    /// not fit in `initial_capacity`
    pub fn encode_with(&self, config: &BufferConfig) -> Result<Bytes> {
        if config.growable {
            let mut body = GrowableBuffer::new(config.initial_capacity)?;
            self.write_body(&mut body)?;
            packet::frame_data_packet(body.as_slice())
        } else {
            let mut body = Buffer::new(config.initial_capacity)?;
            self.write_body(&mut body)?;
            packet::frame_data_packet(body.as_slice())
        }
    }
}
