//! Shape rendering module
//!
//! This module contains:
//! - Geometry calculations shared by the flattened artifact and live frames
//! - Image rendering using tiny-skia
//! - Text labels using ab_glyph

pub mod geometry;
pub mod image;
pub mod text;

pub use self::image::Rasterizer;
