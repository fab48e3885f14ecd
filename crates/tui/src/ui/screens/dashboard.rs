use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::Paragraph,
};

use crate::{
    app::AppState,
    repository::Snapshot,
    ui::{
        components::{
            card::{Card, StatCard},
            charts::render_category_chart,
            money::styled_amount_bold,
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, data: &Snapshot<'_>, theme: &Theme) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    render_stats(frame, layout[0], state, data, theme);

    let view = data.view;
    let title = format!("Expenses by category · {}", view.period.label());
    if view.category_totals.is_empty() {
        let card = Card::new(&title, theme);
        let inner = card.inner(layout[1]);
        card.render_frame(frame, layout[1]);
        let message = if data.ready {
            "No expenses in this month."
        } else {
            "Loading…"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(theme.dim))),
            inner,
        );
    } else {
        render_category_chart(frame, layout[1], &title, &view.category_totals, theme);
    }
}

fn render_stats(frame: &mut Frame<'_>, area: Rect, state: &AppState, data: &Snapshot<'_>, theme: &Theme) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let symbol = state.currency_symbol.as_str();
    let stats = data.view.stats;

    StatCard::new("Income", styled_amount_bold(stats.income, symbol, theme), theme)
        .subtitle("all time")
        .render(frame, columns[0]);
    StatCard::new(
        "Expenses",
        styled_amount_bold(-stats.expense, symbol, theme),
        theme,
    )
    .subtitle("all time")
    .render(frame, columns[1]);
    StatCard::new("Balance", styled_amount_bold(stats.balance, symbol, theme), theme)
        .subtitle("all time")
        .render(frame, columns[2]);
    StatCard::new(
        "Month",
        styled_amount_bold(data.view.net_total, symbol, theme),
        theme,
    )
    .subtitle(data.view.period.label())
    .render(frame, columns[3]);
}
