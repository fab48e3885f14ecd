use std::collections::BTreeMap;

use engine::Money;
use ratatui::{
    Frame,
    layout::{Direction, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup},
};

use crate::ui::{components::card::Card, theme::Theme};

/// Horizontal bars of expense per category, largest first. Values are shown
/// in whole major units.
pub fn render_category_chart(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    totals: &BTreeMap<String, Money>,
    theme: &Theme,
) {
    let card = Card::new(title, theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let bars: Vec<Bar<'_>> = ranked(totals)
        .into_iter()
        .map(|(name, total)| {
            Bar::default()
                .label(Line::from(name.to_string()))
                .value(whole_units(total))
                .text_value(total.to_string())
        })
        .collect();

    let chart = BarChart::default()
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(theme.accent))
        .value_style(Style::default().fg(theme.text).add_modifier(Modifier::BOLD))
        .label_style(Style::default().fg(theme.dim));

    frame.render_widget(chart, inner);
}

/// Category totals ordered by amount, ties by name.
pub fn ranked(totals: &BTreeMap<String, Money>) -> Vec<(&str, Money)> {
    let mut items: Vec<(&str, Money)> = totals
        .iter()
        .map(|(name, total)| (name.as_str(), *total))
        .collect();
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    items
}

fn whole_units(amount: Money) -> u64 {
    amount.cents().unsigned_abs().div_ceil(100)
}

/// Returns something like `████████░░░░` for `value / max`.
#[must_use]
pub fn ascii_bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return "░".repeat(width);
    }

    let ratio = (value as f64 / max as f64).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64).round() as usize).min(width);
    let empty = width.saturating_sub(filled);

    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_bar_scales_to_width() {
        assert_eq!(ascii_bar(5, 10, 4), "██░░");
        assert_eq!(ascii_bar(10, 10, 3), "███");
        assert_eq!(ascii_bar(20, 10, 2), "██");
        assert_eq!(ascii_bar(1, 0, 2), "░░");
    }

    #[test]
    fn ranked_orders_by_amount_then_name() {
        let totals = BTreeMap::from([
            ("Bills".to_string(), Money::new(5_000)),
            ("Food".to_string(), Money::new(12_000)),
            ("Fun".to_string(), Money::new(5_000)),
        ]);
        let names: Vec<&str> = ranked(&totals).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["Food", "Bills", "Fun"]);
    }

    #[test]
    fn partial_units_round_up() {
        assert_eq!(whole_units(Money::new(1)), 1);
        assert_eq!(whole_units(Money::new(1_000)), 10);
    }
}
