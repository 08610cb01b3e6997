//! Drawable scene abstraction
//!
//! The canvas state machine talks to its rendering surface only through
//! [`Scene`]: add, update or remove a node, look one up by id, read or
//! change its interactive transform, and hit-test a position. Any retained
//! or immediate-mode backend can sit behind it. [`RetainedScene`] is the
//! in-memory implementation used by default and by the rasterizer.

pub mod hit;

use serde::{Deserialize, Serialize};

use crate::domain::{Bounds, Point, Shape, ShapeId, ShapeKind};

/// Interactive position and scale of a node.
///
/// Position starts at the shape's anchor; scale is identity except while
/// a resize gesture is in progress.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeTransform {
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl NodeTransform {
    pub fn at(p: Point) -> Self {
        Self {
            x: p.x,
            y: p.y,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_identity_scale(&self) -> bool {
        self.scale_x == 1.0 && self.scale_y == 1.0
    }

    /// Same position, scale reset to 1
    pub fn without_scale(self) -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            ..self
        }
    }
}

/// One drawable node mirroring a shape
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub shape: Shape,
    pub transform: NodeTransform,
}

impl SceneNode {
    pub fn new(shape: Shape) -> Self {
        let transform = NodeTransform::at(shape.anchor());
        Self { shape, transform }
    }

    pub fn id(&self) -> ShapeId {
        self.shape.id
    }

    /// Unscaled size of the node's own geometry (signed for rectangles)
    pub fn base_size(&self, font_size: f32) -> (f32, f32) {
        match &self.shape.kind {
            ShapeKind::Rectangle { width, height, .. } => (*width, *height),
            ShapeKind::Circle { radius, .. } => (radius * 2.0, radius * 2.0),
            _ => {
                let b = self.shape.bounds(font_size);
                (b.width(), b.height())
            }
        }
    }

    /// Map a canvas position into the shape's own (untransformed) space
    pub fn to_shape_space(&self, p: Point) -> Point {
        let anchor = self.shape.anchor();
        let t = &self.transform;
        let sx = if t.scale_x.abs() > f32::EPSILON { t.scale_x } else { 1.0 };
        let sy = if t.scale_y.abs() > f32::EPSILON { t.scale_y } else { 1.0 };
        Point::new(
            anchor.x + (p.x - t.x) / sx,
            anchor.y + (p.y - t.y) / sy,
        )
    }

    /// Map a position in shape space onto the canvas
    pub fn to_canvas_space(&self, p: Point) -> Point {
        let anchor = self.shape.anchor();
        let t = &self.transform;
        Point::new(
            t.x + (p.x - anchor.x) * t.scale_x,
            t.y + (p.y - anchor.y) * t.scale_y,
        )
    }

    /// Bounds on the canvas with the interactive transform applied
    pub fn bounds(&self, font_size: f32) -> Bounds {
        let b = self.shape.bounds(font_size);
        let a = self.to_canvas_space(Point::new(b.min_x, b.min_y));
        let c = self.to_canvas_space(Point::new(b.max_x, b.max_y));
        Bounds::from_signed(a.x, a.y, c.x - a.x, c.y - a.y)
    }
}

/// Minimal drawable-scene interface the canvas renders through
pub trait Scene {
    fn add_node(&mut self, shape: &Shape);

    /// Replace a node's geometry. The node's transform is re-derived from
    /// the shape: position = anchor, scale = 1.
    fn update_node(&mut self, shape: &Shape);

    fn remove_node(&mut self, id: ShapeId);

    fn clear_nodes(&mut self);

    fn node(&self, id: ShapeId) -> Option<&SceneNode>;

    /// Returns false when no node has this id
    fn set_transform(&mut self, id: ShapeId, transform: NodeTransform) -> bool;

    /// Topmost node at `p`, if any
    fn hit_test(&self, p: Point) -> Option<ShapeId>;

    fn transform(&self, id: ShapeId) -> Option<NodeTransform> {
        self.node(id).map(|n| n.transform)
    }
}

/// In-memory retained scene; nodes kept in z-order
#[derive(Clone, Debug)]
pub struct RetainedScene {
    nodes: Vec<SceneNode>,
    font_size: f32,
    hit_tolerance: f32,
}

impl Default for RetainedScene {
    fn default() -> Self {
        Self::new(16.0, 3.0)
    }
}

impl RetainedScene {
    pub fn new(font_size: f32, hit_tolerance: f32) -> Self {
        Self {
            nodes: Vec::new(),
            font_size,
            hit_tolerance,
        }
    }

    /// Nodes bottom to top
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    fn position(&self, id: ShapeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id() == id)
    }
}

impl Scene for RetainedScene {
    fn add_node(&mut self, shape: &Shape) {
        if self.position(shape.id).is_some() {
            self.update_node(shape);
            return;
        }
        self.nodes.push(SceneNode::new(shape.clone()));
    }

    fn update_node(&mut self, shape: &Shape) {
        match self.position(shape.id) {
            Some(idx) => self.nodes[idx] = SceneNode::new(shape.clone()),
            None => log::debug!("update for unknown node {}", shape.id),
        }
    }

    fn remove_node(&mut self, id: ShapeId) {
        self.nodes.retain(|n| n.id() != id);
    }

    fn clear_nodes(&mut self) {
        self.nodes.clear();
    }

    fn node(&self, id: ShapeId) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    fn set_transform(&mut self, id: ShapeId, transform: NodeTransform) -> bool {
        match self.nodes.iter_mut().find(|n| n.id() == id) {
            Some(node) => {
                node.transform = transform;
                true
            }
            None => false,
        }
    }

    fn hit_test(&self, p: Point) -> Option<ShapeId> {
        hit::hit_test(&self.nodes, p, self.font_size, self.hit_tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapeColor;

    fn rect(id: u64, x: f32, y: f32, w: f32, h: f32) -> Shape {
        let mut s = Shape::rectangle(ShapeId::new(id), Point::new(x, y), ShapeColor::RED, 2.0);
        if let ShapeKind::Rectangle { width, height, .. } = &mut s.kind {
            *width = w;
            *height = h;
        }
        s
    }

    #[test]
    fn test_update_resets_transform() {
        let mut scene = RetainedScene::default();
        let shape = rect(1, 10.0, 10.0, 20.0, 20.0);
        scene.add_node(&shape);
        scene.set_transform(
            shape.id,
            NodeTransform {
                x: 50.0,
                y: 50.0,
                scale_x: 2.0,
                scale_y: 2.0,
            },
        );
        scene.update_node(&shape);
        assert_eq!(
            scene.transform(shape.id),
            Some(NodeTransform::at(Point::new(10.0, 10.0)))
        );
    }

    #[test]
    fn test_scaled_node_bounds() {
        let mut node = SceneNode::new(rect(1, 10.0, 10.0, 20.0, 10.0));
        node.transform = NodeTransform {
            x: 100.0,
            y: 0.0,
            scale_x: 2.0,
            scale_y: 3.0,
        };
        let b = node.bounds(16.0);
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (100.0, 0.0, 140.0, 30.0));
    }

    #[test]
    fn test_set_transform_unknown_node() {
        let mut scene = RetainedScene::default();
        assert!(!scene.set_transform(ShapeId::new(9), NodeTransform::at(Point::default())));
    }
}
