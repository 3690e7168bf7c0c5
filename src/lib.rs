//! # tns-wire
//!
//! Binary wire-format layer for the TNS database network protocol.
//!
//! The crate provides the primitives needed to encode and decode TNS messages
//! byte-for-byte: fixed and growable buffers, variable-width integers
//! (UB2/UB4/UB8), length-prefixed strings with the chunked long form, and the
//! packed-decimal NUMBER representation. On top of these sit a field model for
//! the authentication-phase messages and a capture comparator for locating the
//! first byte where two implementations disagree.
//!
//! ## Layout
//! - [`core`]: buffers, codec traits, NUMBER conversion, export formats
//! - [`protocol`]: transport header framing and authentication messages
//! - [`utils`]: capture comparison, constant resolution, hex dumps, logging
//! - [`transport`]: packet transport seam and tracing decorator
//! - [`config`]: explicit configuration for all of the above
//! - [`error`]: the [`WireError`] type
//!
//! ## Example
//! ```rust
//! use tns_wire::{compare_captures, AuthMessage, KeyValuePair};
//!
//! let ours = AuthMessage::phase_one("scott", vec![KeyValuePair::new("AUTH_TERMINAL", "pts/0", 0)])
//!     .encode()
//!     .expect("encode");
//! let decoded = AuthMessage::decode(&ours).expect("decode");
//! assert_eq!(decoded.user.as_deref(), Some("scott"));
//!
//! let report = compare_captures("ours", &ours, "theirs", &ours);
//! assert!(report.is_identical());
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod utils;

pub use crate::config::WireConfig;
pub use crate::core::buffer::Buffer;
pub use crate::core::codec::{Utf8Mode, WireKind, WireRead, WireValue, WireWrite};
pub use crate::core::growable::GrowableBuffer;
pub use crate::core::number::{decode_number, encode_number};
pub use crate::error::{Result, WireError};
pub use crate::protocol::auth::{AuthMessage, AuthPhase, KeyValuePair};
pub use crate::utils::compare::{compare, compare_captures, CaptureSet, ComparisonReport};
