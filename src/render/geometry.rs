//! Shared geometry calculations for shape rendering
//!
//! Constants and math used by both the flattened raster and the live
//! preview frame (which adds selection handles).

use crate::domain::Point;

/// Arrow geometry constants
pub mod arrow {
    /// Arrowhead stroke length in pixels
    pub const HEAD_SIZE: f32 = 10.0;
    /// Arrowhead angle from shaft in radians (35 degrees)
    pub const HEAD_ANGLE: f32 = 0.610_865_2; // 35.0_f32.to_radians()
    /// Below this length only the shaft is drawn
    pub const MIN_LENGTH: f32 = 2.0;

    /// Calculate arrow head points given start, end, and head size
    /// Returns (head1_x, head1_y, head2_x, head2_y) for the two head lines
    pub fn head_points(
        start_x: f32,
        start_y: f32,
        end_x: f32,
        end_y: f32,
        head_size: f32,
    ) -> Option<(f32, f32, f32, f32)> {
        let dx = end_x - start_x;
        let dy = end_y - start_y;
        let length = (dx * dx + dy * dy).sqrt();
        if length < MIN_LENGTH {
            return None;
        }

        // Unit vector pointing back along the shaft
        let bx = -dx / length;
        let by = -dy / length;

        let (sin_a, cos_a) = HEAD_ANGLE.sin_cos();

        let head1_x = end_x + (bx * cos_a - by * sin_a) * head_size;
        let head1_y = end_y + (bx * sin_a + by * cos_a) * head_size;
        let head2_x = end_x + (bx * cos_a + by * sin_a) * head_size;
        let head2_y = end_y + (-bx * sin_a + by * cos_a) * head_size;

        Some((head1_x, head1_y, head2_x, head2_y))
    }
}

/// Rectangle/circle constants
pub mod shape {
    /// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
    pub const BEZIER_K: f32 = 0.552_284_8;
}

/// Selection handle (transformer) decoration constants
pub mod handles {
    /// Side of each square anchor in pixels
    pub const ANCHOR_SIZE: f32 = 10.0;
    /// Outline width of the selection box
    pub const BORDER_WIDTH: f32 = 1.0;
    /// Handle color (rgb 0,161,255)
    pub const COLOR: [u8; 3] = [0, 161, 255];
}

/// Freehand smoothing factor
pub const FREEHAND_TENSION: f32 = 0.5;

/// One piece of a smoothed polyline
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CurveSegment {
    Quad { ctrl: Point, to: Point },
    Cubic { c1: Point, c2: Point, to: Point },
}

/// Control points around interior point `p1` for a cardinal spline
fn control_points(p0: Point, p1: Point, p2: Point, tension: f32) -> (Point, Point) {
    let d01 = p0.distance(p1);
    let d12 = p1.distance(p2);
    let total = d01 + d12;
    if total <= f32::EPSILON {
        return (p1, p1);
    }
    let fa = tension * d01 / total;
    let fb = tension * d12 / total;
    let dx = p2.x - p0.x;
    let dy = p2.y - p0.y;
    (
        Point::new(p1.x - fa * dx, p1.y - fa * dy),
        Point::new(p1.x + fb * dx, p1.y + fb * dy),
    )
}

/// Smooth a flat point list into curve segments starting at the first
/// point. Fewer than three points (or zero tension) yield straight
/// segments expressed as degenerate quads.
pub fn smooth_polyline(points: &[f32], tension: f32) -> Vec<CurveSegment> {
    let pts: Vec<Point> = points
        .chunks_exact(2)
        .map(|c| Point::new(c[0], c[1]))
        .collect();
    if pts.len() < 2 {
        return Vec::new();
    }
    if pts.len() == 2 || tension == 0.0 {
        return pts
            .iter()
            .skip(1)
            .map(|&to| CurveSegment::Quad { ctrl: to, to })
            .collect();
    }

    let controls: Vec<(Point, Point)> = pts
        .windows(3)
        .map(|w| control_points(w[0], w[1], w[2], tension))
        .collect();

    let mut segments = Vec::with_capacity(pts.len() - 1);
    segments.push(CurveSegment::Quad {
        ctrl: controls[0].0,
        to: pts[1],
    });
    for i in 1..controls.len() {
        segments.push(CurveSegment::Cubic {
            c1: controls[i - 1].1,
            c2: controls[i].0,
            to: pts[i + 1],
        });
    }
    let last = pts.len() - 1;
    segments.push(CurveSegment::Quad {
        ctrl: controls[controls.len() - 1].1,
        to: pts[last],
    });
    segments
}
