//! # Protocol Messages
//!
//! Message-level structure on top of the wire codec.
//!
//! ## Components
//! - **Packet**: the 8-byte transport header framing every message
//! - **Auth**: field model of the authentication-phase messages
//!
//! ## Authentication Message Layout
//! ```text
//! [transport header(8)] [data flags(2)]
//! [msg_type(1)] [function(1)] [seq(1)] [has_user(1)]
//! [user_len(UB4)] [auth_mode(UB4)] [ptr(1)] [num_pairs(UB4)] [ptr(1)] [ptr(1)]
//! [user(BYTES)]?                                   present when has_user != 0
//! ([key_len(UB4)] [key(BYTES)] [value_len(UB4)] [value(BYTES)]? [flags(UB4)])*
//! ```

pub mod auth;
pub mod packet;

/// Message type of a function call
pub const MSG_TYPE_FUNCTION: u8 = 3;

/// Function code of the first authentication round trip
pub const FUNC_AUTH_PHASE_ONE: u8 = 0x76;

/// Function code of the second authentication round trip
pub const FUNC_AUTH_PHASE_TWO: u8 = 0x73;

/// Authentication mode bits carried in the `auth_mode` UB4
pub mod auth_mode {
    pub const LOGON: u32 = 0x0000_0001;
    pub const CHANGE_PASSWORD: u32 = 0x0000_0002;
    pub const SYSDBA: u32 = 0x0000_0020;
    pub const SYSOPER: u32 = 0x0000_0040;
    pub const PRELIM: u32 = 0x0000_0080;
    pub const WITH_PASSWORD: u32 = 0x0000_0100;
}
