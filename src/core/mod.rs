//! # Core Wire Components
//!
//! Buffers and the encoding rules of the TNS wire format.
//!
//! ## Components
//! - **Buffer**: fixed-capacity byte store with read and write cursors
//! - **GrowableBuffer**: buffer that reallocates instead of overflowing
//! - **Codec**: `WireWrite` / `WireRead` traits carrying every encoding
//! - **Number**: packed-decimal NUMBER conversion
//! - **Serialization**: bincode / JSON export of decoded values
//!
//! ## Wire Primitives
//! ```text
//! UB4      [len(1)] [big-endian value(len)]           len in {0,1,2,4}
//! BYTES    [len(1)] [data]                             len < 0xFE
//!          [0xFE] ([chunk_len(4)] [chunk])* [0(4)]     long form
//! NUMBER   [len(1)] [exponent(1)] [mantissa(len-1)]
//! ```

pub mod buffer;
pub mod codec;
pub mod growable;
pub mod number;
pub mod serialization;
