//! Geometric types for canvas coordinates

use serde::{Deserialize, Serialize};

/// Position in canvas (display) coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned bounding box with non-negative extent
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    /// Build from an anchor and a signed extent.
    ///
    /// A negative width or height means the box extends left/up from the
    /// anchor; the result is always normalized.
    pub fn from_signed(x: f32, y: f32, width: f32, height: f32) -> Self {
        let (min_x, max_x) = if width < 0.0 { (x + width, x) } else { (x, x + width) };
        let (min_y, max_y) = if height < 0.0 {
            (y + height, y)
        } else {
            (y, y + height)
        };
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounding box of a flat `[x0, y0, x1, y1, ...]` list
    pub fn from_points(points: &[f32]) -> Option<Self> {
        let mut pairs = points.chunks_exact(2);
        let first = pairs.next()?;
        let mut b = Bounds {
            min_x: first[0],
            min_y: first[1],
            max_x: first[0],
            max_y: first[1],
        };
        for p in pairs {
            b.min_x = b.min_x.min(p[0]);
            b.min_y = b.min_y.min(p[1]);
            b.max_x = b.max_x.max(p[0]);
            b.max_y = b.max_y.max(p[1]);
        }
        Some(b)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Grow on every side by `by`
    pub fn inflate(&self, by: f32) -> Bounds {
        Bounds {
            min_x: self.min_x - by,
            min_y: self.min_y - by,
            max_x: self.max_x + by,
            max_y: self.max_y + by,
        }
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Bounds {
        Bounds {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// Inclusive containment test
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Display size of the canvas
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl CanvasSize {
    /// Scale a natural image size to fit `max_width` x `max_height`,
    /// preserving aspect ratio. Small images are scaled up to fill the box.
    pub fn fit(natural_width: u32, natural_height: u32, max_width: f32, max_height: f32) -> Self {
        if natural_width == 0 || natural_height == 0 {
            return Self {
                width: max_width,
                height: max_height,
            };
        }
        let w = natural_width as f32;
        let h = natural_height as f32;
        let scale = (max_width / w).min(max_height / h);
        Self {
            width: w * scale,
            height: h * scale,
        }
    }

    /// Pixel dimensions of the raster produced for this size
    pub fn pixels(&self) -> (u32, u32) {
        (
            (self.width.round() as u32).max(1),
            (self.height.round() as u32).max(1),
        )
    }
}

/// Distance from `p` to the segment `a`-`b`
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_bounds_normalize() {
        let forward = Bounds::from_signed(50.0, 50.0, 50.0, 50.0);
        let backward = Bounds::from_signed(100.0, 100.0, -50.0, -50.0);
        assert_eq!(forward, backward);
        assert_eq!(forward.width(), 50.0);
    }

    #[test]
    fn test_fit_landscape_and_portrait() {
        assert_eq!(
            CanvasSize::fit(1600, 900, 800.0, 600.0),
            CanvasSize {
                width: 800.0,
                height: 450.0
            }
        );
        assert_eq!(
            CanvasSize::fit(300, 600, 800.0, 600.0),
            CanvasSize {
                width: 300.0,
                height: 600.0
            }
        );
        // Small images grow to fill the box
        assert_eq!(CanvasSize::fit(400, 300, 800.0, 600.0).pixels(), (800, 600));
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(distance_to_segment(Point::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(distance_to_segment(Point::new(13.0, 4.0), a, b), 5.0);
        assert_eq!(distance_to_segment(Point::new(0.0, 2.0), a, a), 2.0);
    }
}
