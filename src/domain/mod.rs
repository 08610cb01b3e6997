//! Pure domain types with minimal dependencies
//!
//! Types here know nothing about rendering backends or the host UI.

pub mod geometry;
pub mod shape;
pub mod tool;

pub use geometry::*;
pub use shape::*;
pub use tool::*;
