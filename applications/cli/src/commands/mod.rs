//! Command implementations
//!
//! Each command writes its human-readable output to the given writer and
//! returns what it produced, so the binary prints and tests inspect.

pub mod catalog;
pub mod mixes;
pub mod play;

pub use play::{PlayOptions, SessionSummary};
