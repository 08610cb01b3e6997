//! Message types for the annotation canvas
//!
//! Every user gesture or host command is expressed as a [`CanvasMsg`];
//! scripts replayed by the command-line driver are plain JSON arrays of
//! these.

use serde::{Deserialize, Serialize};

use crate::config::ShapeColor;
use crate::domain::{Point, ShapeId, Tool};
use crate::scene::NodeTransform;

/// Keys the canvas reacts to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Delete,
    Backspace,
    Enter,
    Escape,
    /// Printable input, usually a single character
    Character(String),
}

/// All canvas messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasMsg {
    SetTool { tool: Tool },
    SetColor { color: ShapeColor },
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    /// Replace the staged text label's content
    TextInput { text: String },
    /// Enter pressed in, or focus left, the text entry
    CommitText,
    Key { key: Key },
    /// Explicit delete action (toolbar button)
    DeleteSelected,
    /// Live move of a node while dragging
    DragNode { id: ShapeId, x: f32, y: f32 },
    DragEnd { id: ShapeId, x: f32, y: f32 },
    /// Live resize/move of a node through its handles
    TransformNode { id: ShapeId, transform: NodeTransform },
    TransformEnd { id: ShapeId },
    Clear,
}

impl CanvasMsg {
    pub fn set_tool(tool: Tool) -> Self {
        Self::SetTool { tool }
    }

    pub fn set_color(color: ShapeColor) -> Self {
        Self::SetColor { color }
    }

    pub fn pointer_down(p: Point) -> Self {
        Self::PointerDown { x: p.x, y: p.y }
    }

    pub fn pointer_move(p: Point) -> Self {
        Self::PointerMove { x: p.x, y: p.y }
    }

    pub fn text_input(text: impl Into<String>) -> Self {
        Self::TextInput { text: text.into() }
    }

    pub fn key(key: Key) -> Self {
        Self::Key { key }
    }

    pub fn drag_end(id: ShapeId, p: Point) -> Self {
        Self::DragEnd { id, x: p.x, y: p.y }
    }
}
