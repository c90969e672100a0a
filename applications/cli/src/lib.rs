//! FlowPlayer command-line front end
//!
//! Catalog management, remote Mix management and dry-run playback of a Flow
//! on the simulated clock engine.
//!
//! This library exposes the command implementations for testing purposes.

pub mod commands;
pub mod config;
pub mod error;

// Re-export commonly used types for convenience
pub use commands::{PlayOptions, SessionSummary};
pub use config::FlowConfig;
pub use error::{AppError, Result};
