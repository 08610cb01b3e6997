//! Shape types drawn over the background image
//!
//! All coordinates are canvas (display) coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::{Bounds, Point};
use crate::config::ShapeColor;

/// Average glyph advance as a fraction of the font size, used when no font
/// metrics are at hand
const APPROX_ADVANCE: f32 = 0.6;

/// Opaque shape identifier, unique within one canvas
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(u64);

impl ShapeId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out fresh ids in increasing order
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn next_id(&mut self) -> ShapeId {
        let id = ShapeId(self.next);
        self.next += 1;
        id
    }
}

/// Variant-specific geometry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "lowercase")]
pub enum ShapeKind {
    /// Smoothed polyline. `x, y` is the node origin that drags move.
    Freehand { x: f32, y: f32, points: Vec<f32> },
    /// `width`/`height` are signed while dragging out the shape
    Rectangle {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: ShapeColor,
    },
    Circle {
        x: f32,
        y: f32,
        radius: f32,
        fill: ShapeColor,
    },
    /// `points` is `[tail_x, tail_y, head_x, head_y]`, relative to `x, y`
    Arrow { x: f32, y: f32, points: [f32; 4] },
    Text {
        x: f32,
        y: f32,
        text: String,
        fill: ShapeColor,
    },
}

/// A user-drawn shape
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub stroke: ShapeColor,
    pub stroke_width: f32,
    #[serde(flatten)]
    pub kind: ShapeKind,
}

impl Shape {
    pub fn freehand(id: ShapeId, start: Point, stroke: ShapeColor, stroke_width: f32) -> Self {
        Self {
            id,
            stroke,
            stroke_width,
            kind: ShapeKind::Freehand {
                x: 0.0,
                y: 0.0,
                points: vec![start.x, start.y],
            },
        }
    }

    pub fn rectangle(id: ShapeId, anchor: Point, stroke: ShapeColor, stroke_width: f32) -> Self {
        Self {
            id,
            stroke,
            stroke_width,
            kind: ShapeKind::Rectangle {
                x: anchor.x,
                y: anchor.y,
                width: 0.0,
                height: 0.0,
                fill: ShapeColor::TRANSPARENT,
            },
        }
    }

    pub fn circle(id: ShapeId, center: Point, stroke: ShapeColor, stroke_width: f32) -> Self {
        Self {
            id,
            stroke,
            stroke_width,
            kind: ShapeKind::Circle {
                x: center.x,
                y: center.y,
                radius: 0.0,
                fill: ShapeColor::TRANSPARENT,
            },
        }
    }

    pub fn arrow(id: ShapeId, anchor: Point, stroke: ShapeColor, stroke_width: f32) -> Self {
        Self {
            id,
            stroke,
            stroke_width,
            kind: ShapeKind::Arrow {
                x: 0.0,
                y: 0.0,
                points: [anchor.x, anchor.y, anchor.x, anchor.y],
            },
        }
    }

    /// Text labels use the active color for both stroke and fill
    pub fn text(
        id: ShapeId,
        anchor: Point,
        text: String,
        color: ShapeColor,
        stroke_width: f32,
    ) -> Self {
        Self {
            id,
            stroke: color,
            stroke_width,
            kind: ShapeKind::Text {
                x: anchor.x,
                y: anchor.y,
                text,
                fill: color,
            },
        }
    }

    /// Tool name as used in serialized shapes
    pub fn tool_name(&self) -> &'static str {
        match self.kind {
            ShapeKind::Freehand { .. } => "freehand",
            ShapeKind::Rectangle { .. } => "rectangle",
            ShapeKind::Circle { .. } => "circle",
            ShapeKind::Arrow { .. } => "arrow",
            ShapeKind::Text { .. } => "text",
        }
    }

    /// Node position: top-left for rectangles/text, center for circles,
    /// origin offset for point-based shapes
    pub fn anchor(&self) -> Point {
        match &self.kind {
            ShapeKind::Freehand { x, y, .. }
            | ShapeKind::Rectangle { x, y, .. }
            | ShapeKind::Circle { x, y, .. }
            | ShapeKind::Arrow { x, y, .. }
            | ShapeKind::Text { x, y, .. } => Point::new(*x, *y),
        }
    }

    pub fn set_anchor(&mut self, p: Point) {
        match &mut self.kind {
            ShapeKind::Freehand { x, y, .. }
            | ShapeKind::Rectangle { x, y, .. }
            | ShapeKind::Circle { x, y, .. }
            | ShapeKind::Arrow { x, y, .. }
            | ShapeKind::Text { x, y, .. } => {
                *x = p.x;
                *y = p.y;
            }
        }
    }

    /// Untransformed geometry bounds (stroke width not included)
    pub fn bounds(&self, font_size: f32) -> Bounds {
        match &self.kind {
            ShapeKind::Freehand { x, y, points } => Bounds::from_points(points)
                .unwrap_or_default()
                .translate(*x, *y),
            ShapeKind::Rectangle {
                x,
                y,
                width,
                height,
                ..
            } => Bounds::from_signed(*x, *y, *width, *height),
            ShapeKind::Circle { x, y, radius, .. } => Bounds {
                min_x: x - radius,
                min_y: y - radius,
                max_x: x + radius,
                max_y: y + radius,
            },
            ShapeKind::Arrow { x, y, points } => Bounds::from_points(points)
                .unwrap_or_default()
                .translate(*x, *y),
            ShapeKind::Text { x, y, text, .. } => {
                let (w, h) = text_extent(text, font_size);
                Bounds::from_signed(*x, *y, w, h)
            }
        }
    }
}

/// Approximate size of a single-line label
pub fn text_extent(text: &str, font_size: f32) -> (f32, f32) {
    let chars = text.chars().count() as f32;
    (chars * font_size * APPROX_ADVANCE, font_size)
}
