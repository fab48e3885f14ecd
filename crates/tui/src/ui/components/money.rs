use engine::Money;
use ratatui::{
    style::{Modifier, Style},
    text::Span,
};

use crate::ui::theme::Theme;

/// Signed amount colored by sign, with `+` on positive values.
#[must_use]
pub fn styled_amount(amount: Money, symbol: &str, theme: &Theme) -> Span<'static> {
    let formatted = amount.format(symbol);

    let (color, prefix) = if amount.is_positive() {
        (theme.positive, "+")
    } else if amount.is_negative() {
        (theme.negative, "")
    } else {
        (theme.text, "")
    };

    Span::styled(format!("{prefix}{formatted}"), Style::default().fg(color))
}

#[must_use]
pub fn styled_amount_bold(amount: Money, symbol: &str, theme: &Theme) -> Span<'static> {
    let span = styled_amount(amount, symbol, theme);
    let style = span.style.add_modifier(Modifier::BOLD);
    span.style(style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_prefix_and_color() {
        let theme = Theme::default();

        let span = styled_amount(Money::new(1_050), "zł", &theme);
        assert_eq!(span.content, "+10.50 zł");
        assert_eq!(span.style.fg, Some(theme.positive));

        let span = styled_amount(Money::new(-1_050), "zł", &theme);
        assert_eq!(span.content, "-10.50 zł");
        assert_eq!(span.style.fg, Some(theme.negative));

        let span = styled_amount(Money::ZERO, "", &theme);
        assert_eq!(span.content, "0.00");
        assert_eq!(span.style.fg, Some(theme.text));
    }
}
