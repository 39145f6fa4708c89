//! Domain types for the extraction pipeline.

mod entity;
mod prescription;

pub use entity::*;
pub use prescription::*;
