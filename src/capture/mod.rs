//! Background image intake and artifact encoding
//!
//! This module consolidates:
//! - Data URI decoding/encoding (data_uri.rs)
//! - The immutable background image type (image.rs)

pub mod data_uri;
pub mod image;

pub use self::image::BackgroundImage;
