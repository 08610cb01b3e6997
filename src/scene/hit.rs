//! Hit testing: point → shape lookup.
//!
//! Walks nodes front-to-back (last painted = topmost). Rectangles, circles
//! and text hit on their whole area, since a transparent fill still counts
//! as filled. Strokes and arrows hit within half their stroke width plus a
//! tolerance.

use super::SceneNode;
use crate::domain::{Bounds, Point, ShapeId, ShapeKind, distance_to_segment};

/// Find the topmost node at `p`. Returns `None` on empty canvas.
pub fn hit_test(nodes: &[SceneNode], p: Point, font_size: f32, tolerance: f32) -> Option<ShapeId> {
    nodes
        .iter()
        .rev()
        .find(|node| node_contains(node, p, font_size, tolerance))
        .map(SceneNode::id)
}

fn node_contains(node: &SceneNode, p: Point, font_size: f32, tolerance: f32) -> bool {
    let shape = &node.shape;
    let q = node.to_shape_space(p);
    let half = shape.stroke_width * 0.5;

    match &shape.kind {
        ShapeKind::Rectangle {
            x,
            y,
            width,
            height,
            ..
        } => Bounds::from_signed(*x, *y, *width, *height)
            .inflate(half)
            .contains(q),
        ShapeKind::Circle { x, y, radius, .. } => q.distance(Point::new(*x, *y)) <= radius + half,
        ShapeKind::Text { .. } => shape.bounds(font_size).contains(q),
        ShapeKind::Freehand { x, y, points } => {
            polyline_hit(points, Point::new(*x, *y), q, half + tolerance)
        }
        ShapeKind::Arrow { x, y, points } => {
            polyline_hit(points, Point::new(*x, *y), q, half + tolerance)
        }
    }
}

fn polyline_hit(points: &[f32], offset: Point, q: Point, reach: f32) -> bool {
    let pts: Vec<Point> = points
        .chunks_exact(2)
        .map(|c| Point::new(c[0] + offset.x, c[1] + offset.y))
        .collect();
    match pts.as_slice() {
        [] => false,
        [only] => q.distance(*only) <= reach,
        _ => pts
            .windows(2)
            .any(|w| distance_to_segment(q, w[0], w[1]) <= reach),
    }
}
