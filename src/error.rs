//! # Error Types
//!
//! Error handling for the TNS wire layer.
//!
//! Every failure in the buffer, codec and message layers is a [`WireError`].
//! Codec failures are local to the message being processed: they abort the
//! decode and propagate to the caller, which decides whether to drop the
//! connection or retry at a higher layer.
//!
//! ## Error Categories
//! - **Buffer Errors**: invalid capacity, overflow, underflow, invalid state
//! - **Codec Errors**: values too large for an encoding, malformed UTF-8 or NUMBER bytes
//! - **Message Errors**: structural decode failures carrying the byte offset
//! - **Tooling Errors**: missing captures, unresolved constants, configuration
//!
//! ## Example Usage
//! ```rust
//! use tns_wire::core::buffer::Buffer;
//! use tns_wire::core::codec::WireWrite;
//! use tns_wire::error::WireError;
//!
//! let mut buf = Buffer::new(1).expect("capacity");
//! buf.write_uint8(7).expect("fits");
//! match buf.write_uint8(8) {
//!     Err(WireError::BufferOverflow { requested, available }) => {
//!         assert_eq!((requested, available), (1, 0));
//!     }
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Buffer state errors
    pub const ERR_ALREADY_FINALIZED: &str = "buffer already finalized for reading";
    pub const ERR_FINALIZE_EMPTY: &str = "cannot finalize an empty buffer";
    pub const ERR_NOT_FINALIZED: &str = "buffer not finalized for reading";
    pub const ERR_ZERO_CAPACITY: &str = "buffer capacity must be greater than 0";

    /// Codec errors
    pub const ERR_INVALID_UTF8: &str = "invalid UTF-8 sequence";
    pub const ERR_NUMBER_EMPTY: &str = "number text has zero length";
    pub const ERR_NUMBER_TOO_LONG: &str = "number text is too long";
    pub const ERR_NUMBER_INVALID: &str = "number text contains an invalid character";
    pub const ERR_NUMBER_EMPTY_EXPONENT: &str = "number text has an empty exponent";
    pub const ERR_NUMBER_NO_REPR: &str = "number cannot be represented in packed decimal";
    pub const ERR_NUMBER_BYTES: &str = "malformed packed decimal bytes";

    /// Configuration errors
    pub const ERR_CONFIG_OPEN: &str = "Failed to open config file";
    pub const ERR_CONFIG_PARSE: &str = "Failed to parse TOML";
}

/// WireError is the error type for all buffer, codec and message operations
#[derive(Error, Debug)]
pub enum WireError {
    #[error("Invalid buffer size {}: {}", .0, constants::ERR_ZERO_CAPACITY)]
    InvalidSize(usize),

    #[error("Buffer overflow: {requested} bytes requested, {available} available")]
    BufferOverflow { requested: usize, available: usize },

    #[error("Buffer underflow: {requested} bytes requested, {available} available")]
    BufferUnderflow { requested: usize, available: usize },

    #[error("Value too large for encoding: {0}")]
    ValueTooLarge(String),

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Invalid buffer state: {0}")]
    InvalidState(&'static str),

    #[error("Malformed message at offset {offset:#06x}: {source}")]
    MalformedMessage {
        offset: usize,
        #[source]
        source: Box<WireError>,
    },

    #[error("Capture not found: {0}")]
    MissingCapture(String),

    #[error("Unresolved constants: {}", .0.join(", "))]
    UnresolvedConstants(Vec<String>),

    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Deserialize error: {0}")]
    DeserializeError(String),
}

impl WireError {
    /// Wrap a primitive decode failure with the offset of the field that failed.
    ///
    /// Already-wrapped errors are returned unchanged so the innermost offset wins.
    pub fn at_offset(self, offset: usize) -> Self {
        match self {
            malformed @ WireError::MalformedMessage { .. } => malformed,
            other => WireError::MalformedMessage {
                offset,
                source: Box::new(other),
            },
        }
    }

    /// Offset carried by a `MalformedMessage`, if any.
    #[inline]
    pub fn offset(&self) -> Option<usize> {
        match self {
            WireError::MalformedMessage { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Returns `true` if this error came from reading past the written content.
    pub fn is_underflow(&self) -> bool {
        match self {
            WireError::BufferUnderflow { .. } => true,
            WireError::MalformedMessage { source, .. } => source.is_underflow(),
            _ => false,
        }
    }
}

/// Type alias for Results using WireError
pub type Result<T> = std::result::Result<T, WireError>;
