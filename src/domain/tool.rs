//! Drawing tools

use serde::{Deserialize, Serialize};

/// Active canvas tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Select,
    #[serde(alias = "draw")]
    Freehand,
    Rectangle,
    Circle,
    Text,
    Arrow,
}

impl Tool {
    /// Toolbar order
    pub const ALL: [Tool; 6] = [
        Tool::Select,
        Tool::Freehand,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Text,
        Tool::Arrow,
    ];

    /// Whether pointer-down with this tool appends a shape immediately
    pub fn creates_shape(self) -> bool {
        matches!(
            self,
            Tool::Freehand | Tool::Rectangle | Tool::Circle | Tool::Arrow
        )
    }

    /// Accessible label for the toolbar button
    pub fn label(self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::Freehand => "Draw",
            Tool::Rectangle => "Rectangle",
            Tool::Circle => "Circle",
            Tool::Text => "Text",
            Tool::Arrow => "Arrow",
        }
    }

    /// Get the next tool in toolbar order
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}
