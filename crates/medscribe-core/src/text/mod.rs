//! Text-level normalization: spoken numbers and tagged-span merging.

mod numbers;
mod spans;

pub use numbers::*;
pub use spans::*;
