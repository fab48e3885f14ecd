use ratatui::{style::Style, text::Span};

use crate::ui::theme::Theme;

/// A key and what it does, shown in the bottom bar.
#[derive(Debug, Clone, Copy)]
pub struct KeyHint {
    pub key: &'static str,
    pub action: &'static str,
}

pub const fn hint(key: &'static str, action: &'static str) -> KeyHint {
    KeyHint { key, action }
}

pub fn hints_to_spans(hints: &[KeyHint], theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(theme.accent)));
        spans.push(Span::raw(format!(" {}", hint.action)));
    }

    spans
}

pub fn hint_separator(theme: &Theme) -> Span<'static> {
    Span::styled("  │  ", Style::default().fg(theme.border))
}

pub mod common {
    use super::{KeyHint, hint};

    pub const NAVIGATION: [KeyHint; 3] = [
        hint("h/t", "screen"),
        hint("[ ]", "month"),
        hint("r", "reload"),
    ];

    pub const DASHBOARD: [KeyHint; 3] = [
        hint("a", "add"),
        hint("i", "quick add"),
        hint("c", "category"),
    ];

    pub const TRANSACTIONS: [KeyHint; 6] = [
        hint("↑↓", "select"),
        hint("a", "add"),
        hint("e", "edit"),
        hint("d", "delete"),
        hint("s", "sort"),
        hint("i", "quick add"),
    ];

    pub const FORM: [KeyHint; 4] = [
        hint("Tab", "next"),
        hint("←→", "change"),
        hint("Enter", "save"),
        hint("Esc", "cancel"),
    ];

    pub const PROMPT: [KeyHint; 2] = [hint("Enter", "confirm"), hint("Esc", "cancel")];

    pub const QUIT: [KeyHint; 1] = [hint("q", "quit")];
}
