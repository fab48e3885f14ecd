//! Transaction primitives.
//!
//! A `Transaction` is one recorded money movement. The amount is always
//! positive; the direction lives in [`TransactionType`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine, categories::UNCATEGORIZED_NAME};

/// ISO 8601 calendar date format used on the wire and in storage.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }

    /// Returns the other variant.
    pub fn toggled(self) -> Self {
        match self {
            Self::Income => Self::Expense,
            Self::Expense => Self::Income,
        }
    }
}

impl TryFrom<&str> for TransactionType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidKind(other.to_string())),
        }
    }
}

/// Reference to a [`Category`](crate::Category) as seen from a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub title: String,
    pub amount: Money,
    pub category: Option<CategoryRef>,
    /// ISO date string. Kept raw: a malformed value still counts in all-time
    /// statistics but never matches a period.
    pub date: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl Transaction {
    /// Contribution of this transaction to a running total.
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    pub fn category_name(&self) -> &str {
        self.category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(UNCATEGORIZED_NAME)
    }

    pub fn category_id(&self) -> Option<i64> {
        self.category.as_ref().map(|c| c.id)
    }

    /// Merges `patch` into this record. A changed category id is resolved
    /// with `resolve_category`; unknown ids keep the id with an empty name.
    pub fn apply_patch<F>(&mut self, patch: &TransactionPatch, resolve_category: F)
    where
        F: Fn(i64) -> Option<String>,
    {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(date) = &patch.date {
            self.date = date.clone();
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(category_id) = patch.category_id {
            let name = resolve_category(category_id).unwrap_or_default();
            self.category = Some(CategoryRef {
                id: category_id,
                name,
            });
        }
    }
}

/// A transaction waiting for its store-assigned identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub title: String,
    pub amount: Money,
    pub category_id: Option<i64>,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl TransactionDraft {
    /// Validates and normalizes the draft (trimmed title).
    pub fn validated(mut self) -> ResultEngine<Self> {
        self.title = validate_title(&self.title)?;
        validate_amount(self.amount)?;
        parse_date(&self.date)?;
        Ok(self)
    }
}

/// The partial fields of an edit. Absent fields are left untouched and are
/// not serialized.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.amount.is_none()
            && self.category_id.is_none()
            && self.date.is_none()
            && self.kind.is_none()
    }

    /// Validates the present fields (trimmed title).
    pub fn validated(mut self) -> ResultEngine<Self> {
        if let Some(title) = &self.title {
            self.title = Some(validate_title(title)?);
        }
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        if let Some(date) = &self.date {
            parse_date(date)?;
        }
        Ok(self)
    }
}

pub fn validate_title(title: &str) -> ResultEngine<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(
            "title must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn validate_amount(amount: Money) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(
            "amount must be > 0".to_string(),
        ));
    }
    if amount > Money::MAX_TRANSACTION {
        return Err(EngineError::InvalidAmount(format!(
            "amount must be at most {}",
            Money::MAX_TRANSACTION
        )));
    }
    Ok(())
}

/// Parses a strict `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> ResultEngine<NaiveDate> {
    let invalid = || EngineError::InvalidDate(value.to_string());
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())?;
    // chrono accepts signs, spaces and unpadded fields; the prefix match on
    // periods needs the canonical form.
    if date.format(DATE_FORMAT).to_string() != value {
        return Err(invalid());
    }
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        Transaction {
            id: 1,
            title: "Lunch".to_string(),
            amount: Money::new(1_500),
            category: Some(CategoryRef {
                id: 1,
                name: "Food".to_string(),
            }),
            date: "2024-03-05".to_string(),
            kind: TransactionType::Expense,
        }
    }

    #[test]
    fn signed_amount_follows_type() {
        let mut tx = sample();
        assert_eq!(tx.signed_amount(), Money::new(-1_500));
        tx.kind = TransactionType::Income;
        assert_eq!(tx.signed_amount(), Money::new(1_500));
    }

    #[test]
    fn apply_patch_merges_only_present_fields() {
        let mut tx = sample();
        let patch = TransactionPatch {
            amount: Some(Money::new(2_000)),
            category_id: Some(7),
            ..Default::default()
        };
        tx.apply_patch(&patch, |id| (id == 7).then(|| "Bills".to_string()));

        assert_eq!(tx.title, "Lunch");
        assert_eq!(tx.amount, Money::new(2_000));
        assert_eq!(tx.category_name(), "Bills");
        assert_eq!(tx.category_id(), Some(7));
        assert_eq!(tx.date, "2024-03-05");
    }

    #[test]
    fn draft_validation_rejects_bad_input() {
        let draft = TransactionDraft {
            title: "  Salary ".to_string(),
            amount: Money::new(100_000),
            category_id: None,
            date: "2024-03-01".to_string(),
            kind: TransactionType::Income,
        };
        assert_eq!(draft.clone().validated().unwrap().title, "Salary");

        let mut bad = draft.clone();
        bad.amount = Money::ZERO;
        assert!(matches!(bad.validated(), Err(EngineError::InvalidAmount(_))));

        let mut bad = draft.clone();
        bad.title = "   ".to_string();
        assert!(matches!(bad.validated(), Err(EngineError::InvalidName(_))));

        let mut bad = draft.clone();
        bad.amount = Money::new(Money::MAX_TRANSACTION.cents() + 1);
        assert!(matches!(bad.validated(), Err(EngineError::InvalidAmount(_))));

        let mut at_limit = draft.clone();
        at_limit.amount = Money::MAX_TRANSACTION;
        assert!(at_limit.validated().is_ok());

        for date in ["2024-3-1", "+2024-3-05", " 2024-3-05", "2024-03-5 ", "2024-02-30"] {
            let mut bad = draft.clone();
            bad.date = date.to_string();
            assert!(
                matches!(bad.validated(), Err(EngineError::InvalidDate(_))),
                "{date:?} should be rejected"
            );
        }
    }

    #[test]
    fn patch_validation_applies_the_same_limits() {
        let patch = TransactionPatch {
            amount: Some(Money::new(Money::MAX_TRANSACTION.cents() + 1)),
            ..Default::default()
        };
        assert!(matches!(patch.validated(), Err(EngineError::InvalidAmount(_))));

        let patch = TransactionPatch {
            date: Some("+2024-3-05".to_string()),
            ..Default::default()
        };
        assert!(matches!(patch.validated(), Err(EngineError::InvalidDate(_))));
    }

    #[test]
    fn patch_serializes_only_changed_fields() {
        let patch = TransactionPatch {
            title: Some("Rent".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"title":"Rent"}"#
        );
        assert!(TransactionPatch::default().is_empty());
    }

    #[test]
    fn kind_round_trips_through_str() {
        assert_eq!(
            TransactionType::try_from("income").unwrap(),
            TransactionType::Income
        );
        assert!(TransactionType::try_from("transfer").is_err());
    }
}
