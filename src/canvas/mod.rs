//! Annotation canvas state machine
//!
//! Owns the shape list, active tool and color, selection and staged text,
//! and drives a [`Scene`] for hit-testing and interactive transforms.
//!
//! Every mutation that changes the visible composition requests a flatten:
//! selection handles are hidden, and once the host has rendered a frame it
//! calls [`AnnotationCanvas::after_render`], which rasterizes background +
//! shapes, hands the PNG data URI to the save sink and restores the
//! selection.

pub mod handlers;
pub mod keys;
pub mod messages;

use std::borrow::Cow;

use anyhow::Context;
use image::RgbaImage;

use crate::capture::{BackgroundImage, data_uri};
use crate::config::{CanvasConfig, ShapeColor};
use crate::domain::{CanvasSize, IdAllocator, Point, Shape, ShapeId, ShapeKind, Tool};
use crate::render::{Rasterizer, text};
use crate::scene::{NodeTransform, RetainedScene, Scene, SceneNode};

pub use messages::{CanvasMsg, Key};

/// Receives every flattened image as a PNG data URI
pub type SaveSink = Box<dyn FnMut(&str)>;

/// Text label staged at a position, not yet committed
#[derive(Clone, Debug, PartialEq)]
pub struct PendingText {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

/// Flatten requested but not yet rasterized; holds the selection to
/// restore afterwards
#[derive(Clone, Copy, Debug, PartialEq)]
struct PendingFlatten {
    restore: Option<ShapeId>,
}

pub struct AnnotationCanvas<S: Scene = RetainedScene> {
    config: CanvasConfig,
    tool: Tool,
    color: ShapeColor,
    shapes: Vec<Shape>,
    drawing: bool,
    /// Selection whose handles are currently shown
    selected: Option<ShapeId>,
    pending_text: Option<PendingText>,
    background: Option<BackgroundImage>,
    canvas_size: CanvasSize,
    ids: IdAllocator,
    scene: S,
    rasterizer: Rasterizer,
    pending_flatten: Option<PendingFlatten>,
    on_save: Option<SaveSink>,
}

impl AnnotationCanvas<RetainedScene> {
    pub fn new(config: CanvasConfig) -> Self {
        let scene = RetainedScene::new(config.font_size, config.hit_tolerance);
        Self::with_scene(config, scene)
    }
}

impl<S: Scene> AnnotationCanvas<S> {
    /// Build a canvas over a caller-provided scene backend
    pub fn with_scene(config: CanvasConfig, scene: S) -> Self {
        let font = text::load_font(config.font_path.as_deref());
        let rasterizer = Rasterizer::new(font, config.font_size);
        Self {
            tool: Tool::Select,
            color: config.default_color,
            shapes: Vec::new(),
            drawing: false,
            selected: None,
            pending_text: None,
            background: None,
            canvas_size: CanvasSize {
                width: config.max_width,
                height: config.max_height,
            },
            ids: IdAllocator::default(),
            scene,
            rasterizer,
            pending_flatten: None,
            on_save: None,
            config,
        }
    }

    /// Replace the rasterizer (e.g. to supply a specific font)
    pub fn with_rasterizer(mut self, rasterizer: Rasterizer) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// Register the `on_save` collaborator
    pub fn with_save_sink(mut self, sink: impl FnMut(&str) + 'static) -> Self {
        self.on_save = Some(Box::new(sink));
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn color(&self) -> ShapeColor {
        self.color
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Current selection, including one whose handles are hidden while a
    /// flatten is pending
    pub fn selected_id(&self) -> Option<ShapeId> {
        match self.pending_flatten {
            Some(pending) => pending.restore,
            None => self.selected,
        }
    }

    /// Whether selection handles would be drawn in the next frame
    pub fn handles_visible(&self) -> bool {
        self.pending_flatten.is_none() && self.selected.is_some() && self.tool == Tool::Select
    }

    pub fn pending_text(&self) -> Option<&PendingText> {
        self.pending_text.as_ref()
    }

    pub fn canvas_size(&self) -> CanvasSize {
        self.canvas_size
    }

    pub fn background(&self) -> Option<&BackgroundImage> {
        self.background.as_ref()
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn flatten_pending(&self) -> bool {
        self.pending_flatten.is_some()
    }

    // ------------------------------------------------------------------
    // Background
    // ------------------------------------------------------------------

    /// Install a new background; the canvas is re-initialized and the bare
    /// background is emitted
    pub fn set_background(&mut self, background: BackgroundImage) {
        self.shapes.clear();
        self.scene.clear_nodes();
        self.drawing = false;
        self.pending_text = None;
        self.pending_flatten = None;
        self.selected = None;
        self.canvas_size = background.size();
        self.background = Some(background);
        log::debug!("Background loaded, canvas size {:?}", self.canvas_size);
        self.request_flatten();
    }

    /// Load a background from a data URI or file path.
    ///
    /// On failure the canvas is left untouched.
    pub fn load_background(&mut self, source: &str) -> anyhow::Result<()> {
        let background =
            BackgroundImage::load(source, self.config.max_width, self.config.max_height)?;
        self.set_background(background);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tool and color
    // ------------------------------------------------------------------

    pub fn set_tool(&mut self, tool: Tool) {
        log::debug!("Tool {:?} -> {:?}", self.tool, tool);
        self.tool = tool;
        if tool != Tool::Select {
            self.set_selection(None);
        }
    }

    /// Applies to shapes created from now on
    pub fn set_color(&mut self, color: ShapeColor) {
        self.color = color;
    }

    // ------------------------------------------------------------------
    // Pointer input
    // ------------------------------------------------------------------

    pub fn pointer_down(&mut self, p: Point) {
        // Clicking the canvas takes focus away from a staged text entry
        if self.pending_text.is_some() {
            self.commit_text();
        }

        let widths = self.config.stroke_widths;
        let shape = match self.tool {
            Tool::Select => {
                let hit = self.scene.hit_test(p);
                log::debug!("Select at {p:?} hit {hit:?}");
                self.set_selection(hit);
                return;
            }
            Tool::Text => {
                self.pending_text = Some(PendingText {
                    x: p.x,
                    y: p.y,
                    text: String::new(),
                });
                return;
            }
            Tool::Freehand => Shape::freehand(self.ids.next_id(), p, self.color, widths.freehand),
            Tool::Rectangle => {
                Shape::rectangle(self.ids.next_id(), p, self.color, widths.rectangle)
            }
            Tool::Circle => Shape::circle(self.ids.next_id(), p, self.color, widths.circle),
            Tool::Arrow => Shape::arrow(self.ids.next_id(), p, self.color, widths.arrow),
        };

        log::debug!("Started {} {}", shape.tool_name(), shape.id);
        self.scene.add_node(&shape);
        self.shapes.push(shape);
        self.drawing = true;
    }

    /// Only the in-progress (last) shape changes
    pub fn pointer_move(&mut self, p: Point) {
        if !self.drawing {
            return;
        }
        let Some(shape) = self.shapes.last_mut() else {
            return;
        };

        match &mut shape.kind {
            ShapeKind::Freehand { x, y, points } => {
                points.push(p.x - *x);
                points.push(p.y - *y);
            }
            ShapeKind::Rectangle {
                x,
                y,
                width,
                height,
                ..
            } => {
                *width = p.x - *x;
                *height = p.y - *y;
            }
            ShapeKind::Circle { x, y, radius, .. } => {
                *radius = p.distance(Point::new(*x, *y));
            }
            ShapeKind::Arrow { x, y, points } => {
                points[2] = p.x - *x;
                points[3] = p.y - *y;
            }
            ShapeKind::Text { .. } => return,
        }
        self.scene.update_node(shape);
    }

    pub fn pointer_up(&mut self) {
        if self.drawing {
            if let Some(shape) = self.shapes.last() {
                log::debug!("Finished {} {}", shape.tool_name(), shape.id);
            }
        }
        self.drawing = false;
        self.request_flatten();
    }

    // ------------------------------------------------------------------
    // Text entry
    // ------------------------------------------------------------------

    /// Replace the staged text; ignored when nothing is staged
    pub fn text_input(&mut self, text: &str) {
        if let Some(pending) = &mut self.pending_text {
            pending.text = text.to_string();
        }
    }

    /// Commit the staged label if it has text; always dismisses the entry
    pub fn commit_text(&mut self) {
        let Some(pending) = self.pending_text.take() else {
            return;
        };
        if pending.text.is_empty() {
            return;
        }
        let shape = Shape::text(
            self.ids.next_id(),
            Point::new(pending.x, pending.y),
            pending.text,
            self.color,
            self.config.stroke_widths.text,
        );
        log::debug!("Committed text {}", shape.id);
        self.scene.add_node(&shape);
        self.shapes.push(shape);
        self.request_flatten();
    }

    // ------------------------------------------------------------------
    // Selection edits
    // ------------------------------------------------------------------

    /// Remove the selected shape. Returns whether anything was removed.
    pub fn delete_selected(&mut self) -> bool {
        if self.tool != Tool::Select {
            return false;
        }
        let Some(id) = self.selected_id() else {
            return false;
        };
        self.shapes.retain(|s| s.id != id);
        self.scene.remove_node(id);
        self.set_selection(None);
        log::debug!("Deleted {id}");
        self.request_flatten();
        true
    }

    /// Live move while a drag is in progress
    pub fn drag_node(&mut self, id: ShapeId, p: Point) -> bool {
        if self.tool != Tool::Select {
            return false;
        }
        let Some(current) = self.scene.transform(id) else {
            return false;
        };
        self.scene.set_transform(
            id,
            NodeTransform {
                x: p.x,
                y: p.y,
                ..current
            },
        )
    }

    /// Commit a drag: the shape's anchor becomes `p`
    pub fn drag_end(&mut self, id: ShapeId, p: Point) {
        if self.tool != Tool::Select {
            return;
        }
        let Some(shape) = self.shapes.iter_mut().find(|s| s.id == id) else {
            log::debug!("Drag end for unknown shape {id}");
            return;
        };
        shape.set_anchor(p);
        self.scene.update_node(shape);
        self.request_flatten();
    }

    /// Live resize through the handles. Transforms that would shrink the
    /// node below the minimum size are rejected and the previous one kept.
    pub fn transform_node(&mut self, id: ShapeId, transform: NodeTransform) -> bool {
        if self.tool != Tool::Select {
            return false;
        }
        let Some(node) = self.scene.node(id) else {
            return false;
        };
        let proposed = SceneNode {
            shape: node.shape.clone(),
            transform,
        };
        let b = proposed.bounds(self.config.font_size);
        let min = self.config.min_transform_size;
        if b.width() < min || b.height() < min {
            log::debug!("Rejected transform of {id}: {}x{}", b.width(), b.height());
            return false;
        }
        self.scene.set_transform(id, transform)
    }

    /// Bake the node's final position and scale into the shape geometry
    pub fn transform_end(&mut self, id: ShapeId) {
        if self.tool != Tool::Select {
            return;
        }
        let Some(node) = self.scene.node(id) else {
            log::debug!("Transform end for unknown node {id}");
            return;
        };
        let t = node.transform;
        let (base_w, base_h) = node.base_size(self.config.font_size);
        let Some(shape) = self.shapes.iter_mut().find(|s| s.id == id) else {
            return;
        };

        match &mut shape.kind {
            ShapeKind::Rectangle {
                x,
                y,
                width,
                height,
                ..
            } => {
                *x = t.x;
                *y = t.y;
                *width = base_w * t.scale_x;
                *height = base_h * t.scale_y;
            }
            ShapeKind::Circle { x, y, radius, .. } => {
                *x = t.x;
                *y = t.y;
                *radius *= t.scale_x;
            }
            ShapeKind::Text { x, y, .. } => {
                *x = t.x;
                *y = t.y;
            }
            ShapeKind::Freehand { x, y, points } => {
                *x = t.x;
                *y = t.y;
                scale_points(points, t.scale_x, t.scale_y);
            }
            ShapeKind::Arrow { x, y, points } => {
                *x = t.x;
                *y = t.y;
                scale_points(points, t.scale_x, t.scale_y);
            }
        }
        // Re-syncing the node resets its scale to 1
        self.scene.update_node(shape);
        log::debug!("Baked transform into {id}");
        self.request_flatten();
    }

    /// Remove every shape and the selection. Also the host's imperative
    /// "clear annotations" entry point.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.scene.clear_nodes();
        self.drawing = false;
        self.set_selection(None);
        log::debug!("Cleared canvas");
        self.request_flatten();
    }

    // ------------------------------------------------------------------
    // Flatten and emit
    // ------------------------------------------------------------------

    /// Hide handles and schedule a rasterize for the next render pass.
    /// Requests arriving before that pass coalesce into one.
    fn request_flatten(&mut self) {
        if self.pending_flatten.is_none() {
            self.pending_flatten = Some(PendingFlatten {
                restore: self.selected.take(),
            });
        }
    }

    /// Selection changes made while handles are hidden land in the stash
    fn set_selection(&mut self, id: Option<ShapeId>) {
        match &mut self.pending_flatten {
            Some(pending) => pending.restore = id,
            None => self.selected = id,
        }
    }

    /// Post-render hook. When a flatten is pending: rasterize without
    /// handles, emit, then restore the stashed selection. Returns whether
    /// an image was emitted.
    ///
    /// A rasterization error is returned to the caller after the selection
    /// has been restored.
    pub fn after_render(&mut self) -> anyhow::Result<bool> {
        let Some(pending) = self.pending_flatten else {
            return Ok(false);
        };

        let result = self.flatten().and_then(|img| data_uri::encode_png(&img));

        self.pending_flatten = None;
        self.selected = pending
            .restore
            .filter(|id| self.tool == Tool::Select && self.shapes.iter().any(|s| s.id == *id));

        let uri = result.context("flattening canvas")?;
        if let Some(sink) = &mut self.on_save {
            sink(&uri);
        }
        Ok(true)
    }

    /// Composite background + shapes, never including selection handles
    pub fn flatten(&self) -> anyhow::Result<RgbaImage> {
        let nodes = self.scene_nodes();
        self.rasterizer.render(&self.background_pixels(), &nodes, None)
    }

    /// Live preview frame: the composition plus handles for the visible
    /// selection
    pub fn render_frame(&self) -> anyhow::Result<RgbaImage> {
        let nodes = self.scene_nodes();
        let chrome = if self.handles_visible() {
            self.selected
                .and_then(|id| nodes.iter().find(|n| n.id() == id))
        } else {
            None
        };
        self.rasterizer
            .render(&self.background_pixels(), &nodes, chrome)
    }

    /// Nodes in z-order, carrying whatever interactive transform the scene
    /// currently holds
    fn scene_nodes(&self) -> Vec<SceneNode> {
        self.shapes
            .iter()
            .map(|shape| SceneNode {
                shape: shape.clone(),
                transform: self
                    .scene
                    .transform(shape.id)
                    .unwrap_or_else(|| NodeTransform::at(shape.anchor())),
            })
            .collect()
    }

    /// Display-size background, or a transparent canvas when none is loaded
    fn background_pixels(&self) -> Cow<'_, RgbaImage> {
        match &self.background {
            Some(bg) => Cow::Borrowed(bg.display()),
            None => {
                let (w, h) = self.canvas_size.pixels();
                Cow::Owned(RgbaImage::new(w, h))
            }
        }
    }
}

fn scale_points(points: &mut [f32], sx: f32, sy: f32) {
    for pair in points.chunks_exact_mut(2) {
        pair[0] *= sx;
        pair[1] *= sy;
    }
}
