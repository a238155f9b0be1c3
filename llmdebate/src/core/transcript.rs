//! Serialization of a context view into the prompt sent to a backend.

use crate::core::types::Turn;

/// Render turns as `"<role>: <content>"` lines, in window order.
pub fn render_context(view: &[&Turn]) -> String {
    let mut out = String::new();
    for turn in view {
        out.push_str(turn.role.label());
        out.push_str(": ");
        out.push_str(&turn.content);
        out.push('\n');
    }
    out
}
