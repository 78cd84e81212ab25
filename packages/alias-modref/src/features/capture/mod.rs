//! Capture (escape) tracking.
//!
//! Answers one question for the alias engine: is an object guaranteed not
//! to have escaped by a given program point? Two providers implement the
//! port at different precision/cost tradeoffs: a context-free per-function
//! boolean, and a context-sensitive earliest-escape-point tracker.

pub mod infrastructure;
pub mod ports;

pub use infrastructure::{EarliestEscapeInfo, FunctionCaptureInfo};
pub use ports::CaptureInfo;
