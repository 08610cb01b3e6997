//! Annotation canvas for screenshots.
//!
//! Users draw freehand strokes, rectangles, circles, arrows and text labels
//! over a background image; every visible change is flattened to a PNG
//! data URI and handed to a save callback.

pub mod canvas;
pub mod capture;
pub mod config;
pub mod domain;
pub mod render;
pub mod scene;

pub use canvas::{AnnotationCanvas, CanvasMsg, Key, PendingText};
pub use config::{CanvasConfig, ShapeColor};
pub use domain::{Point, Shape, ShapeId, ShapeKind, Tool};
