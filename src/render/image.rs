//! Image rendering for shapes using tiny-skia
//!
//! These functions composite the scene onto the background for the
//! emitted artifact and for live preview frames.

use std::cell::Cell;

use ab_glyph::FontArc;
use anyhow::Context;
use image::RgbaImage;
use tiny_skia::{
    ColorU8, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, Transform,
};

use super::geometry::{self, CurveSegment, arrow, handles, shape};
use super::text;
use crate::config::ShapeColor;
use crate::domain::{Bounds, ShapeKind};
use crate::scene::SceneNode;

/// Composites scene nodes over a background
pub struct Rasterizer {
    font: Option<FontArc>,
    font_size: f32,
    warned_missing_font: Cell<bool>,
}

impl Rasterizer {
    pub fn new(font: Option<FontArc>, font_size: f32) -> Self {
        Self {
            font,
            font_size,
            warned_missing_font: Cell::new(false),
        }
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draw `nodes` bottom to top over `background`.
    ///
    /// `chrome` names the node whose selection handles are drawn on top;
    /// emitted artifacts always pass `None`.
    pub fn render(
        &self,
        background: &RgbaImage,
        nodes: &[SceneNode],
        chrome: Option<&SceneNode>,
    ) -> anyhow::Result<RgbaImage> {
        let mut pixmap = pixmap_from_image(background)?;

        for node in nodes {
            self.draw_node(&mut pixmap, node);
        }
        if let Some(node) = chrome {
            draw_handles(&mut pixmap, node.bounds(self.font_size));
        }

        Ok(image_from_pixmap(&pixmap))
    }

    fn draw_node(&self, pixmap: &mut Pixmap, node: &SceneNode) {
        let s = &node.shape;
        let anchor = s.anchor();
        let t = &node.transform;
        // Maps shape space onto the canvas through the node transform
        let transform = Transform::from_row(
            t.scale_x,
            0.0,
            0.0,
            t.scale_y,
            t.x - anchor.x * t.scale_x,
            t.y - anchor.y * t.scale_y,
        );

        match &s.kind {
            ShapeKind::Freehand { x, y, points } => {
                let Some(path) = build_smooth_path(points, geometry::FREEHAND_TENSION) else {
                    return;
                };
                let transform = transform.pre_translate(*x, *y);
                stroke_path(pixmap, &path, s.stroke, s.stroke_width, true, transform);
            }
            ShapeKind::Rectangle {
                x,
                y,
                width,
                height,
                fill,
            } => {
                let b = Bounds::from_signed(*x, *y, *width, *height);
                let Some(path) = build_rect_path(b) else {
                    return;
                };
                fill_path(pixmap, &path, *fill, transform);
                stroke_path(pixmap, &path, s.stroke, s.stroke_width, false, transform);
            }
            ShapeKind::Circle { x, y, radius, fill } => {
                let Some(path) = build_ellipse_path(*x, *y, *radius, *radius) else {
                    return;
                };
                fill_path(pixmap, &path, *fill, transform);
                stroke_path(pixmap, &path, s.stroke, s.stroke_width, false, transform);
            }
            ShapeKind::Arrow { x, y, points } => {
                let [sx, sy, ex, ey] = *points;
                let Some(path) = build_arrow_path(sx, sy, ex, ey, arrow::HEAD_SIZE) else {
                    return;
                };
                let transform = transform.pre_translate(*x, *y);
                stroke_path(pixmap, &path, s.stroke, s.stroke_width, true, transform);
            }
            ShapeKind::Text { text, fill, .. } => {
                let Some(font) = &self.font else {
                    if !self.warned_missing_font.replace(true) {
                        log::warn!("No font available, text labels are not rasterized");
                    }
                    return;
                };
                let origin = node.to_canvas_space(anchor);
                text::draw_text(
                    pixmap,
                    font,
                    origin.x,
                    origin.y,
                    text,
                    *fill,
                    self.font_size * t.scale_y.abs(),
                );
            }
        }
    }
}

/// Premultiply an RGBA image into a fresh pixmap
fn pixmap_from_image(img: &RgbaImage) -> anyhow::Result<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height()).with_context(|| {
        format!(
            "could not allocate a {}x{} raster",
            img.width(),
            img.height()
        )
    })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Demultiply a pixmap back into a straight-alpha image
fn image_from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
    img
}

fn paint_for(color: ShapeColor) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn stroke_path(
    pixmap: &mut Pixmap,
    path: &Path,
    color: ShapeColor,
    width: f32,
    round: bool,
    transform: Transform,
) {
    if color.is_transparent() || width <= 0.0 {
        return;
    }
    let stroke = if round {
        Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        }
    } else {
        Stroke {
            width,
            ..Default::default()
        }
    };
    pixmap.stroke_path(path, &paint_for(color), &stroke, transform, None);
}

fn fill_path(pixmap: &mut Pixmap, path: &Path, color: ShapeColor, transform: Transform) {
    if color.is_transparent() {
        return;
    }
    pixmap.fill_path(path, &paint_for(color), FillRule::Winding, transform, None);
}

fn build_rect_path(b: Bounds) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(b.min_x, b.min_y);
    pb.line_to(b.max_x, b.min_y);
    pb.line_to(b.max_x, b.max_y);
    pb.line_to(b.min_x, b.max_y);
    pb.close();
    pb.finish()
}

fn build_smooth_path(points: &[f32], tension: f32) -> Option<Path> {
    let (&x0, &y0) = (points.first()?, points.get(1)?);
    let mut pb = PathBuilder::new();
    pb.move_to(x0, y0);
    let segments = geometry::smooth_polyline(points, tension);
    if segments.is_empty() {
        // A single tap still leaves a dot thanks to the round cap
        pb.line_to(x0, y0);
    }
    for seg in segments {
        match seg {
            CurveSegment::Quad { ctrl, to } => pb.quad_to(ctrl.x, ctrl.y, to.x, to.y),
            CurveSegment::Cubic { c1, c2, to } => {
                pb.cubic_to(c1.x, c1.y, c2.x, c2.y, to.x, to.y)
            }
        }
    }
    pb.finish()
}

/// Build an arrow path as stroked lines (shaft + two angled head lines)
fn build_arrow_path(
    start_x: f32,
    start_y: f32,
    end_x: f32,
    end_y: f32,
    head_size: f32,
) -> Option<Path> {
    let mut pb = PathBuilder::new();

    // Shaft line from start to end
    pb.move_to(start_x, start_y);
    pb.line_to(end_x, end_y);

    if let Some((head1_x, head1_y, head2_x, head2_y)) =
        arrow::head_points(start_x, start_y, end_x, end_y, head_size)
    {
        pb.move_to(end_x, end_y);
        pb.line_to(head1_x, head1_y);
        pb.move_to(end_x, end_y);
        pb.line_to(head2_x, head2_y);
    }

    pb.finish()
}

/// Build an ellipse path using cubic bezier curves
fn build_ellipse_path(cx: f32, cy: f32, rx: f32, ry: f32) -> Option<Path> {
    let kx = rx * shape::BEZIER_K;
    let ky = ry * shape::BEZIER_K;

    let mut pb = PathBuilder::new();

    pb.move_to(cx, cy - ry);
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);

    pb.close();
    pb.finish()
}

/// Selection box plus eight square anchors (corners and edge midpoints)
fn draw_handles(pixmap: &mut Pixmap, b: Bounds) {
    let [r, g, bl] = handles::COLOR;
    let accent = ShapeColor::rgb(r, g, bl);

    if let Some(path) = build_rect_path(b) {
        stroke_path(
            pixmap,
            &path,
            accent,
            handles::BORDER_WIDTH,
            false,
            Transform::identity(),
        );
    }

    let half = handles::ANCHOR_SIZE * 0.5;
    let mid_x = (b.min_x + b.max_x) * 0.5;
    let mid_y = (b.min_y + b.max_y) * 0.5;
    let anchors = [
        (b.min_x, b.min_y),
        (mid_x, b.min_y),
        (b.max_x, b.min_y),
        (b.max_x, mid_y),
        (b.max_x, b.max_y),
        (mid_x, b.max_y),
        (b.min_x, b.max_y),
        (b.min_x, mid_y),
    ];
    for (ax, ay) in anchors {
        let square = Bounds {
            min_x: ax - half,
            min_y: ay - half,
            max_x: ax + half,
            max_y: ay + half,
        };
        if let Some(path) = build_rect_path(square) {
            fill_path(pixmap, &path, ShapeColor::rgb(0xff, 0xff, 0xff), Transform::identity());
            stroke_path(
                pixmap,
                &path,
                accent,
                handles::BORDER_WIDTH,
                false,
                Transform::identity(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Point, Shape, ShapeId};
    use crate::scene::NodeTransform;

    fn white(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba([255, 255, 255, 255]))
    }

    fn rect_node(x: f32, y: f32, w: f32, h: f32) -> SceneNode {
        let mut s = Shape::rectangle(ShapeId::new(1), Point::new(x, y), ShapeColor::RED, 2.0);
        if let ShapeKind::Rectangle { width, height, .. } = &mut s.kind {
            *width = w;
            *height = h;
        }
        SceneNode::new(s)
    }

    #[test]
    fn test_empty_scene_is_background() {
        let bg = white(40, 30);
        let out = Rasterizer::new(None, 16.0).render(&bg, &[], None).unwrap();
        assert_eq!(out, bg);
    }

    #[test]
    fn test_rectangle_outline_drawn() {
        let bg = white(100, 100);
        let out = Rasterizer::new(None, 16.0)
            .render(&bg, &[rect_node(10.0, 10.0, 50.0, 50.0)], None)
            .unwrap();
        // On the left edge: red
        let edge = out.get_pixel(10, 30).0;
        assert!(edge[0] > 200 && edge[1] < 60 && edge[2] < 60, "{edge:?}");
        // Transparent interior stays white
        assert_eq!(out.get_pixel(35, 35).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_negative_rectangle_renders_identically() {
        let bg = white(120, 120);
        let r = Rasterizer::new(None, 16.0);
        let a = r.render(&bg, &[rect_node(100.0, 100.0, -50.0, -50.0)], None).unwrap();
        let b = r.render(&bg, &[rect_node(50.0, 50.0, 50.0, 50.0)], None).unwrap();
        assert!(a == b);
    }

    #[test]
    fn test_node_transform_moves_rendering() {
        let bg = white(100, 100);
        let mut node = rect_node(0.0, 0.0, 20.0, 20.0);
        node.transform = NodeTransform::at(Point::new(60.0, 60.0));
        let out = Rasterizer::new(None, 16.0).render(&bg, &[node], None).unwrap();
        let edge = out.get_pixel(60, 70).0;
        assert!(edge[0] > 200 && edge[1] < 60, "{edge:?}");
        assert_eq!(out.get_pixel(0, 10).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_handles_only_with_chrome() {
        let bg = white(100, 100);
        let node = rect_node(20.0, 20.0, 40.0, 40.0);
        let r = Rasterizer::new(None, 16.0);
        let plain = r.render(&bg, std::slice::from_ref(&node), None).unwrap();
        let chrome = r.render(&bg, std::slice::from_ref(&node), Some(&node)).unwrap();
        assert!(plain != chrome);
        // The left-middle anchor covers the shape's stroke
        let under = plain.get_pixel(20, 40).0;
        assert!(under[0] > 200 && under[1] < 60, "{under:?}");
        assert_eq!(chrome.get_pixel(20, 40).0, [255, 255, 255, 255]);
    }
}
