//! Text label rasterization with ab_glyph

use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontArc, FontVec, ScaleFont, point};
use anyhow::Context;
use tiny_skia::{ColorU8, Pixmap};

use crate::config::ShapeColor;

/// Fonts probed when no font path is configured
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

pub fn load_font_file(path: &Path) -> anyhow::Result<FontArc> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
    let font = FontVec::try_from_vec(bytes)
        .with_context(|| format!("parsing font {}", path.display()))?;
    Ok(FontArc::from(font))
}

/// Load the configured font, falling back to well-known system fonts
pub fn load_font(configured: Option<&Path>) -> Option<FontArc> {
    if let Some(path) = configured {
        match load_font_file(path) {
            Ok(font) => return Some(font),
            Err(err) => log::warn!("Configured font unusable, probing system fonts: {err:?}"),
        }
    }
    SYSTEM_FONTS
        .iter()
        .map(PathBuf::from)
        .filter(|p| p.exists())
        .find_map(|p| match load_font_file(&p) {
            Ok(font) => {
                log::debug!("Using font {}", p.display());
                Some(font)
            }
            Err(err) => {
                log::debug!("Skipping font: {err:?}");
                None
            }
        })
}

/// Draw a single line of text with its top-left corner at (x, y)
pub fn draw_text(
    pixmap: &mut Pixmap,
    font: &FontArc,
    x: f32,
    y: f32,
    text: &str,
    color: ShapeColor,
    size: f32,
) {
    if text.is_empty() || size <= 0.0 || color.is_transparent() {
        return;
    }
    let (w, h) = (pixmap.width() as i32, pixmap.height() as i32);
    let scaled = font.as_scaled(size);
    let mut caret = point(x, y + scaled.ascent());
    for ch in text.chars() {
        let mut glyph = scaled.scaled_glyph(ch);
        glyph.position = caret;
        caret.x += scaled.h_advance(glyph.id);
        let Some(outlined) = scaled.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        let pixels = pixmap.pixels_mut();
        outlined.draw(|gx, gy, coverage| {
            let px = gx as i32 + bounds.min.x as i32;
            let py = gy as i32 + bounds.min.y as i32;
            if px < 0 || py < 0 || px >= w || py >= h {
                return;
            }
            let alpha = (color.a as f32 * coverage).round().clamp(0.0, 255.0) as u8;
            if alpha == 0 {
                return;
            }
            let idx = (py * w + px) as usize;
            let src = ColorU8::from_rgba(color.r, color.g, color.b, alpha).premultiply();
            let dst = pixels[idx];
            let inv = 255 - u16::from(src.alpha());
            let blend = |s: u8, d: u8| (u16::from(s) + (u16::from(d) * inv + 127) / 255) as u8;
            let out = tiny_skia::PremultipliedColorU8::from_rgba(
                blend(src.red(), dst.red()),
                blend(src.green(), dst.green()),
                blend(src.blue(), dst.blue()),
                blend(src.alpha(), dst.alpha()),
            );
            if let Some(out) = out {
                pixels[idx] = out;
            }
        });
    }
}
