mod flow;
mod media;

pub use flow::{FlowKey, FlowPalette};
pub use media::{MediaEntry, MediaKind, NewMediaEntry};
