//! One-line entry syntax: `[+|-]<amount> <title words> [#category]`.
//!
//! A leading `+` records income, anything else an expense.

use engine::{Money, TransactionType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickAddParsed {
    pub kind: TransactionType,
    pub amount: Money,
    pub title: String,
    /// Tag as typed, without the `#`.
    pub category: Option<String>,
}

pub fn parse(input: &str) -> Result<QuickAddParsed, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Enter an amount.".to_string());
    }

    let (kind, rest) = if let Some(stripped) = trimmed.strip_prefix('+') {
        (TransactionType::Income, stripped.trim_start())
    } else if let Some(stripped) = trimmed.strip_prefix('-') {
        (TransactionType::Expense, stripped.trim_start())
    } else {
        (TransactionType::Expense, trimmed)
    };

    let mut parts = rest.splitn(2, ' ');
    let amount_raw = parts.next().unwrap_or("").trim();
    if amount_raw.is_empty() {
        return Err("Missing amount.".to_string());
    }
    let title_raw = parts.next().unwrap_or("").trim();

    let amount = amount_raw
        .parse::<Money>()
        .map_err(|_| "Invalid amount.".to_string())?
        .abs();
    if amount.is_zero() {
        return Err("Amount must be > 0.".to_string());
    }

    let (category, title) = parse_tag(title_raw)?;
    let Some(title) = title else {
        return Err("Missing title.".to_string());
    };

    Ok(QuickAddParsed {
        kind,
        amount,
        title,
        category,
    })
}

fn parse_tag(raw: &str) -> Result<(Option<String>, Option<String>), String> {
    if raw.is_empty() {
        return Ok((None, None));
    }

    let mut tag: Option<String> = None;
    let mut kept: Vec<&str> = Vec::new();

    for token in raw.split_whitespace() {
        if let Some(rest) = token.strip_prefix('#') {
            if rest.is_empty() {
                kept.push(token);
                continue;
            }
            if tag.is_some() {
                return Err("Too many tags: at most one.".to_string());
            }
            tag = Some(rest.to_string());
        } else {
            kept.push(token);
        }
    }

    let title = kept.join(" ");
    let title = if title.is_empty() { None } else { Some(title) };
    Ok((tag, title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn income_with_title_and_tag() {
        let parsed = parse("+1000 salary #food").unwrap();
        assert_eq!(parsed.kind, TransactionType::Income);
        assert_eq!(parsed.amount, Money::new(100_000));
        assert_eq!(parsed.title, "salary");
        assert_eq!(parsed.category.as_deref(), Some("food"));
    }

    #[test]
    fn default_is_expense_and_tag_may_sit_anywhere() {
        let parsed = parse("12,50 #Food coffee and cake").unwrap();
        assert_eq!(parsed.kind, TransactionType::Expense);
        assert_eq!(parsed.amount, Money::new(1_250));
        assert_eq!(parsed.title, "coffee and cake");
        assert_eq!(parsed.category.as_deref(), Some("Food"));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse("").is_err());
        assert!(parse("+").is_err());
        assert!(parse("abc lunch").is_err());
        assert!(parse("0 lunch").is_err());
        assert!(parse("5").is_err());
        assert!(parse("5 lunch #a #b").is_err());
    }
}
