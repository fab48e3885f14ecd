pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use crate::{
    app::{AppState, Screen},
    repository::Snapshot,
};
use components::hints::{self, KeyHint, common};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState, data: &Snapshot<'_>) {
    let theme = Theme::default();
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.background)),
        area,
    );

    match state.screen {
        Screen::Login => screens::login::render(frame, area, state, &theme),
        Screen::Dashboard | Screen::Transactions => render_shell(frame, area, state, data, &theme),
    }

    components::toast::render(frame, area, state.toast.as_ref(), &theme);
}

fn render_shell(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    data: &Snapshot<'_>,
    theme: &Theme,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Min(0),
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, theme);

    match state.screen {
        Screen::Dashboard => screens::dashboard::render(frame, layout[1], state, data, theme),
        Screen::Transactions => {
            screens::transactions::render(frame, layout[1], state, data, theme)
        }
        Screen::Login => {}
    }

    render_bottom_bar(frame, layout[2], state, theme);

    if let Some(form) = &state.form {
        screens::overlays::render_form(frame, layout[1], form, data.categories, theme);
    }
    if let Some(highlighted) = state.sort_menu {
        screens::overlays::render_sort_menu(frame, layout[1], highlighted, state.sort, theme);
    }
    if let Some(prompt) = &state.prompt {
        screens::overlays::render_prompt(frame, layout[1], prompt, theme);
    }
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut spans = Vec::new();
    for screen in [Screen::Dashboard, Screen::Transactions] {
        let style = if screen == state.screen {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.dim)
        };
        spans.push(Span::styled(format!(" {} ", screen.label()), style));
    }

    spans.push(hints::hint_separator(theme));
    spans.push(Span::styled("User", Style::default().fg(theme.dim)));
    spans.push(Span::raw(format!(": {}  ", state.login.username)));
    spans.push(Span::styled("Month", Style::default().fg(theme.dim)));
    spans.push(Span::raw(format!(": {}", state.period.label())));

    if let Some(busy) = state.busy {
        spans.push(hints::hint_separator(theme));
        spans.push(Span::styled(busy, Style::default().fg(theme.accent)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn context_hints(state: &AppState) -> &'static [KeyHint] {
    if state.prompt.is_some() || state.sort_menu.is_some() {
        &common::PROMPT
    } else if state.form.is_some() {
        &common::FORM
    } else if state.screen == Screen::Transactions {
        &common::TRANSACTIONS
    } else {
        &common::DASHBOARD
    }
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut parts = hints::hints_to_spans(&common::NAVIGATION, theme);
    parts.push(hints::hint_separator(theme));
    parts.extend(hints::hints_to_spans(context_hints(state), theme));
    parts.push(hints::hint_separator(theme));
    parts.extend(hints::hints_to_spans(&common::QUIT, theme));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

/// A `width` x `height` rect centered in `area`.
pub(crate) fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}
