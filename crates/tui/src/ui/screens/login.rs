use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::{AppState, LoginField},
    ui::{centered_box, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let box_width = 36;
    let box_height = 7;
    let card_area = centered_box(box_width, box_height, area);

    frame.render_widget(Clear, card_area);

    let block = Block::default()
        .title(" spendbook ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));

    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Username
            Constraint::Length(1),
            Constraint::Length(1), // Password
        ])
        .margin(1)
        .split(inner);

    let login = &state.login;
    render_input(
        frame,
        rows[0],
        "user",
        &login.username,
        false,
        login.focus == LoginField::Username,
        theme,
    );
    render_input(
        frame,
        rows[2],
        "pass",
        &login.password,
        true,
        login.focus == LoginField::Password,
        theme,
    );

    let below = |offset: u16| Rect {
        x: card_area.x,
        y: card_area.y + card_area.height + offset,
        width: card_area.width,
        height: 1,
    };

    let status = match (state.busy, &login.message) {
        (Some(busy), _) => Some(Span::styled(busy, Style::default().fg(theme.accent))),
        (None, Some(message)) => Some(Span::styled(
            message.as_str(),
            Style::default().fg(theme.error),
        )),
        (None, None) => None,
    };
    if let Some(status) = status {
        frame.render_widget(Paragraph::new(status).alignment(Alignment::Center), below(1));
    }

    frame.render_widget(
        Paragraph::new(Span::styled(
            state.base_url.as_str(),
            Style::default().fg(theme.dim),
        ))
        .alignment(Alignment::Center),
        below(2),
    );
}

fn render_input(
    frame: &mut Frame<'_>,
    area: Rect,
    label: &str,
    value: &str,
    is_password: bool,
    focused: bool,
    theme: &Theme,
) {
    let cursor = if focused { "│" } else { "" };

    let display = if is_password {
        format!("{label}  {}{cursor}", mask_password(value))
    } else {
        format!("{label}  {value}{cursor}")
    };

    let style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.dim)
    };

    frame.render_widget(Paragraph::new(Span::styled(display, style)), area);
}

fn mask_password(password: &str) -> String {
    "•".repeat(password.chars().count())
}
