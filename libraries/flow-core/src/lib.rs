//! FlowPlayer Core
//!
//! Platform-agnostic domain types and error handling shared by every
//! FlowPlayer crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `MediaKind`, `FlowKey`, `MediaEntry`
//! - **Flow Theme Registry**: the static palette attached to each Flow
//! - **Error Handling**: `FlowError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use flow_core::{FlowKey, MediaKind};
//!
//! let flow: FlowKey = "blue".parse().unwrap();
//! assert_eq!(flow.palette().primary, "#1E88E5");
//!
//! assert_eq!(MediaKind::from_file_name("clip.MOV"), Some(MediaKind::Video));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod types;

pub use error::{FlowError, Result};
pub use types::{FlowKey, FlowPalette, MediaEntry, MediaKind, NewMediaEntry};
