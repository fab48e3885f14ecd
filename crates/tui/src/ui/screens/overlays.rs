//! Modal layers drawn over the active screen: the add/edit form, the sort
//! menu and the single-line prompt.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, List, ListItem, ListState, Paragraph},
};

use engine::{Category, SortKey};

use crate::{
    app::{FormField, FormMode, Prompt, PromptKind, TransactionForm},
    ui::{centered_box, components::card::Card, theme::Theme},
};

const LABEL_WIDTH: usize = 10;

pub fn render_form(
    frame: &mut Frame<'_>,
    area: Rect,
    form: &TransactionForm,
    categories: &[Category],
    theme: &Theme,
) {
    let title = match form.mode {
        FormMode::Add => "Add transaction",
        FormMode::Edit(_) => "Edit transaction",
    };
    let rect = centered_box(52, FormField::ORDER.len() as u16 + 6, area);
    frame.render_widget(Clear, rect);

    let card = Card::new(title, theme).focused(true);
    let inner = card.inner(rect);
    card.render_frame(frame, rect);

    let mut lines: Vec<Line<'_>> = FormField::ORDER
        .iter()
        .map(|field| {
            let focused = *field == form.focus;
            let value = match field {
                FormField::Title => text_value(&form.title, focused),
                FormField::Amount => text_value(&form.amount, focused),
                FormField::Date => text_value(&form.date, focused),
                FormField::Kind => choice_value(form.kind.label(), focused),
                FormField::Category => {
                    let label = form.category_label(categories);
                    if focused {
                        format!("‹ {label} ›  (+ new)")
                    } else {
                        label
                    }
                }
            };
            let style = if focused {
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text)
            };
            Line::from(vec![
                Span::styled(
                    format!("{:<LABEL_WIDTH$}", field.label()),
                    Style::default().fg(theme.dim),
                ),
                Span::styled(value, style),
            ])
        })
        .collect();

    lines.push(Line::default());
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(theme.error),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn text_value(value: &str, focused: bool) -> String {
    if focused {
        format!("{value}│")
    } else {
        value.to_string()
    }
}

fn choice_value(value: &str, focused: bool) -> String {
    if focused {
        format!("‹ {value} ›")
    } else {
        value.to_string()
    }
}

pub fn render_sort_menu(
    frame: &mut Frame<'_>,
    area: Rect,
    highlighted: usize,
    current: SortKey,
    theme: &Theme,
) {
    let rect = centered_box(32, SortKey::ALL.len() as u16 + 2, area);
    frame.render_widget(Clear, rect);

    let items: Vec<ListItem<'_>> = SortKey::ALL
        .iter()
        .map(|key| {
            let marker = if *key == current { "● " } else { "  " };
            ListItem::new(format!("{marker}{}", key.label()))
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(highlighted));

    let list = List::new(items)
        .block(Card::new("Sort by", theme).focused(true).block())
        .highlight_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));

    frame.render_stateful_widget(list, rect, &mut list_state);
}

pub fn render_prompt(frame: &mut Frame<'_>, area: Rect, prompt: &Prompt, theme: &Theme) {
    let rect = centered_box(48, 5, area);
    frame.render_widget(Clear, rect);

    let card = Card::new(prompt.kind.title(), theme).focused(true);
    let inner = card.inner(rect);
    card.render_frame(frame, rect);

    let mut lines = Vec::with_capacity(2);
    if !matches!(prompt.kind, PromptKind::ConfirmDelete(_)) {
        lines.push(Line::from(Span::styled(
            format!("> {}│", prompt.input),
            Style::default().fg(theme.accent),
        )));
    }
    if let Some(error) = &prompt.error {
        lines.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(theme.error),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
