//! Canvas message handlers
//!
//! Dispatches a [`CanvasMsg`] to the matching canvas operation.

use super::AnnotationCanvas;
use super::keys::handle_key_event;
use super::messages::CanvasMsg;
use crate::domain::Point;
use crate::scene::Scene;

/// Apply one message to the canvas
pub fn handle_canvas_msg<S: Scene>(canvas: &mut AnnotationCanvas<S>, msg: CanvasMsg) {
    match msg {
        CanvasMsg::SetTool { tool } => canvas.set_tool(tool),
        CanvasMsg::SetColor { color } => canvas.set_color(color),
        CanvasMsg::PointerDown { x, y } => canvas.pointer_down(Point::new(x, y)),
        CanvasMsg::PointerMove { x, y } => canvas.pointer_move(Point::new(x, y)),
        CanvasMsg::PointerUp => canvas.pointer_up(),
        CanvasMsg::TextInput { text } => canvas.text_input(&text),
        CanvasMsg::CommitText => canvas.commit_text(),
        CanvasMsg::Key { key } => {
            if let Some(routed) = handle_key_event(canvas, &key) {
                handle_canvas_msg(canvas, routed);
            }
        }
        CanvasMsg::DeleteSelected => {
            canvas.delete_selected();
        }
        CanvasMsg::DragNode { id, x, y } => {
            canvas.drag_node(id, Point::new(x, y));
        }
        CanvasMsg::DragEnd { id, x, y } => canvas.drag_end(id, Point::new(x, y)),
        CanvasMsg::TransformNode { id, transform } => {
            canvas.transform_node(id, transform);
        }
        CanvasMsg::TransformEnd { id } => canvas.transform_end(id),
        CanvasMsg::Clear => canvas.clear(),
    }
}

impl<S: Scene> AnnotationCanvas<S> {
    /// Apply a message
    pub fn update(&mut self, msg: CanvasMsg) {
        handle_canvas_msg(self, msg);
    }

    /// Route a key press; returns whether it did anything
    pub fn handle_key(&mut self, key: &super::Key) -> bool {
        match handle_key_event(self, key) {
            Some(msg) => {
                handle_canvas_msg(self, msg);
                true
            }
            None => false,
        }
    }
}
