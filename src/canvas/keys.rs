use super::AnnotationCanvas;
use super::messages::{CanvasMsg, Key};
use crate::domain::Tool;
use crate::scene::Scene;

/// Route a key press to a canvas message.
///
/// While a text label is staged the entry has focus and receives every
/// key; otherwise Delete/Backspace remove the selection in select mode.
pub fn handle_key_event<S: Scene>(canvas: &AnnotationCanvas<S>, key: &Key) -> Option<CanvasMsg> {
    if let Some(pending) = canvas.pending_text() {
        return match key {
            // Enter commits; Escape blurs the entry, which also commits
            Key::Enter | Key::Escape => Some(CanvasMsg::CommitText),
            Key::Backspace => {
                let mut text = pending.text.clone();
                text.pop()?;
                Some(CanvasMsg::text_input(text))
            }
            Key::Character(c) if !c.is_empty() => {
                Some(CanvasMsg::text_input(format!("{}{c}", pending.text)))
            }
            _ => None,
        };
    }

    let can_delete = canvas.tool() == Tool::Select && canvas.selected_id().is_some();

    match key {
        Key::Delete | Key::Backspace if can_delete => Some(CanvasMsg::DeleteSelected),
        _ => None,
    }
}
