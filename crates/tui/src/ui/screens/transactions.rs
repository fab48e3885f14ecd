use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};

use engine::Transaction;

use crate::{
    app::AppState,
    format::display_date,
    repository::Snapshot,
    ui::{
        components::{
            card::Card,
            charts::{ascii_bar, ranked},
            money::{styled_amount, styled_amount_bold},
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, data: &Snapshot<'_>, theme: &Theme) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_header(frame, layout[0], state, data, theme);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(layout[1]);

    render_list(frame, body[0], state, data, theme);
    render_breakdown(frame, body[1], state, data, theme);
}

fn render_header(frame: &mut Frame<'_>, area: Rect, state: &AppState, data: &Snapshot<'_>, theme: &Theme) {
    let view = data.view;
    let line = Line::from(vec![
        Span::styled(view.period.label(), Style::default().fg(theme.text).add_modifier(Modifier::BOLD)),
        Span::styled("   Sort", Style::default().fg(theme.dim)),
        Span::raw(format!(": {}   ", view.sort.label())),
        Span::styled("Net", Style::default().fg(theme.dim)),
        Span::raw(": "),
        styled_amount_bold(view.net_total, &state.currency_symbol, theme),
        Span::styled(
            format!("   {} entries", view.transactions.len()),
            Style::default().fg(theme.dim),
        ),
    ]);

    let card = Card::new("Transactions", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);
    frame.render_widget(Paragraph::new(line), inner);
}

fn transaction_line(tx: &Transaction, symbol: &str, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{:<10}  ", display_date(&tx.date)),
            Style::default().fg(theme.dim),
        ),
        Span::styled(format!("{:<24} ", truncate(&tx.title, 24)), Style::default().fg(theme.text)),
        Span::styled(
            format!("{:<14} ", truncate(tx.category_name(), 14)),
            Style::default().fg(theme.accent),
        ),
        styled_amount(tx.signed_amount(), symbol, theme),
    ])
}

fn render_list(frame: &mut Frame<'_>, area: Rect, state: &AppState, data: &Snapshot<'_>, theme: &Theme) {
    let card = Card::new("Entries", theme).focused(state.form.is_none());
    let block = card.block();
    let transactions = &data.view.transactions;

    if transactions.is_empty() {
        let message = if data.ready {
            "Nothing recorded this month. Press a to add."
        } else {
            "Loading…"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(theme.dim))).block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem<'_>> = transactions
        .iter()
        .map(|tx| ListItem::new(transaction_line(tx, &state.currency_symbol, theme)))
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(state.selected.min(items.len() - 1)));

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .highlight_symbol("» ");

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_breakdown(frame: &mut Frame<'_>, area: Rect, state: &AppState, data: &Snapshot<'_>, theme: &Theme) {
    let card = Card::new("By category", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let totals = ranked(&data.view.category_totals);
    let Some(max) = totals.first().map(|(_, total)| total.cents().unsigned_abs()) else {
        frame.render_widget(
            Paragraph::new(Span::styled("No expenses.", Style::default().fg(theme.dim))),
            inner,
        );
        return;
    };

    let bar_width = (inner.width as usize).saturating_sub(2).min(24);
    let mut lines = Vec::with_capacity(totals.len() * 2);
    for (name, total) in totals {
        lines.push(Line::from(vec![
            Span::styled(name.to_string(), Style::default().fg(theme.text)),
            Span::raw("  "),
            Span::styled(total.format(&state.currency_symbol), Style::default().fg(theme.negative)),
        ]));
        lines.push(Line::from(Span::styled(
            ascii_bar(total.cents().unsigned_abs(), max, bar_width),
            Style::default().fg(theme.accent),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_marks_cut_titles() {
        assert_eq!(truncate("Lunch", 8), "Lunch");
        assert_eq!(truncate("Groceries and more", 8), "Groceri…");
    }
}
