//! Background image the annotations are drawn over

use std::path::Path;

use anyhow::Context;
use image::RgbaImage;
use image::imageops::{self, FilterType};

use super::data_uri;
use crate::domain::CanvasSize;

/// A loaded background with its natural size and a copy scaled to the
/// canvas display size
#[derive(Clone, Debug)]
pub struct BackgroundImage {
    natural: RgbaImage,
    display: RgbaImage,
    size: CanvasSize,
}

impl BackgroundImage {
    /// Scale `natural` to fit `max_width` x `max_height`
    pub fn new(natural: RgbaImage, max_width: f32, max_height: f32) -> Self {
        let size = CanvasSize::fit(natural.width(), natural.height(), max_width, max_height);
        let (w, h) = size.pixels();
        let display = if (w, h) == natural.dimensions() {
            natural.clone()
        } else {
            imageops::resize(&natural, w, h, FilterType::Triangle)
        };
        log::debug!(
            "Background {}x{} displayed at {}x{}",
            natural.width(),
            natural.height(),
            w,
            h
        );
        Self {
            natural,
            display,
            size,
        }
    }

    /// Load from a data URI or a file path
    pub fn load(source: &str, max_width: f32, max_height: f32) -> anyhow::Result<Self> {
        let natural = if data_uri::is_data_uri(source) {
            data_uri::decode_image(source)?
        } else {
            let path = Path::new(source);
            image::open(path)
                .with_context(|| format!("opening background {}", path.display()))?
                .to_rgba8()
        };
        Ok(Self::new(natural, max_width, max_height))
    }

    /// Get the natural width of the image
    pub fn natural_width(&self) -> u32 {
        self.natural.width()
    }

    /// Get the natural height of the image
    pub fn natural_height(&self) -> u32 {
        self.natural.height()
    }

    pub fn size(&self) -> CanvasSize {
        self.size
    }

    /// Pixels at display size
    pub fn display(&self) -> &RgbaImage {
        &self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_copy_fits_box() {
        let bg = BackgroundImage::new(RgbaImage::new(1600, 900), 800.0, 600.0);
        assert_eq!(bg.display().dimensions(), (800, 450));
        assert_eq!((bg.natural_width(), bg.natural_height()), (1600, 900));
    }

    #[test]
    fn test_load_from_data_uri() {
        let img = RgbaImage::from_pixel(8, 6, image::Rgba([1, 2, 3, 255]));
        let uri = data_uri::encode_png(&img).unwrap();
        let bg = BackgroundImage::load(&uri, 80.0, 60.0).unwrap();
        assert_eq!(bg.size(), CanvasSize { width: 80.0, height: 60.0 });
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(BackgroundImage::load("/definitely/not/here.png", 800.0, 600.0).is_err());
    }
}
