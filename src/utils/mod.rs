//! # Utility Modules
//!
//! Debugging support around the codec.
//!
//! ## Components
//! - **Compare**: lock-step capture comparison with framing-prefix skipping
//! - **Constants**: fixed-point resolution of protocol constant expressions
//! - **Hex dump**: packet rendering for traces
//! - **Logging**: subscriber setup from `LoggingConfig`

pub mod compare;
pub mod constants;
pub mod hexdump;
pub mod logging;

pub use compare::{compare, compare_captures, CaptureSet, ComparisonReport, Divergence};
pub use constants::ConstantResolver;
pub use hexdump::hex_dump;
