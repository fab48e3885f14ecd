//! Add/edit form state and its conversion into drafts and patches.

use chrono::NaiveDate;
use engine::{Category, Money, Transaction, TransactionDraft, TransactionPatch, TransactionType};

use crate::format::{DISPLAY_DATE_FORMAT, display_date, parse_input_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Amount,
    Date,
    Kind,
    Category,
}

impl FormField {
    pub const ORDER: [FormField; 5] = [
        FormField::Title,
        FormField::Amount,
        FormField::Date,
        FormField::Kind,
        FormField::Category,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Amount => "Amount",
            Self::Date => "Date",
            Self::Kind => "Type",
            Self::Category => "Category",
        }
    }

    fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(i64),
}

#[derive(Debug, Clone)]
pub struct TransactionForm {
    pub mode: FormMode,
    pub title: String,
    pub amount: String,
    pub date: String,
    pub kind: TransactionType,
    pub category_id: Option<i64>,
    pub focus: FormField,
    pub error: Option<String>,
}

impl TransactionForm {
    pub fn add(today: NaiveDate) -> Self {
        Self {
            mode: FormMode::Add,
            title: String::new(),
            amount: String::new(),
            date: today.format(DISPLAY_DATE_FORMAT).to_string(),
            kind: TransactionType::Expense,
            category_id: None,
            focus: FormField::Title,
            error: None,
        }
    }

    pub fn edit(tx: &Transaction) -> Self {
        Self {
            mode: FormMode::Edit(tx.id),
            title: tx.title.clone(),
            amount: tx.amount.to_string(),
            date: display_date(&tx.date),
            kind: tx.kind,
            category_id: tx.category_id(),
            focus: FormField::Title,
            error: None,
        }
    }

    /// The text buffer of the focused field, if it takes typed input.
    pub fn active_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Title => Some(&mut self.title),
            FormField::Amount => Some(&mut self.amount),
            FormField::Date => Some(&mut self.date),
            FormField::Kind | FormField::Category => None,
        }
    }

    /// Left/right on a choice field.
    pub fn cycle(&mut self, categories: &[Category], forward: bool) {
        match self.focus {
            FormField::Kind => self.kind = self.kind.toggled(),
            FormField::Category => self.cycle_category(categories, forward),
            _ => {}
        }
    }

    /// Steps through `None` followed by every category.
    fn cycle_category(&mut self, categories: &[Category], forward: bool) {
        let slots = categories.len() + 1;
        let current = self
            .category_id
            .and_then(|id| categories.iter().position(|c| c.id == id))
            .map_or(0, |idx| idx + 1);
        let next = if forward {
            (current + 1) % slots
        } else {
            (current + slots - 1) % slots
        };
        self.category_id = match next {
            0 => None,
            idx => categories.get(idx - 1).map(|c| c.id),
        };
    }

    pub fn category_label(&self, categories: &[Category]) -> String {
        match self.category_id {
            None => "(none)".to_string(),
            Some(id) => categories
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| format!("#{id}")),
        }
    }

    fn parsed_amount(&self) -> Result<Money, String> {
        self.amount
            .trim()
            .parse::<Money>()
            .map_err(|_| format!("Invalid amount \"{}\".", self.amount.trim()))
    }

    pub fn to_draft(&self) -> Result<TransactionDraft, String> {
        let draft = TransactionDraft {
            title: self.title.clone(),
            amount: self.parsed_amount()?,
            category_id: self.category_id,
            date: parse_input_date(&self.date)?,
            kind: self.kind,
        };
        draft.validated().map_err(|err| err.to_string())
    }

    /// Only the fields that differ from `original`.
    pub fn to_patch(&self, original: &Transaction) -> Result<TransactionPatch, String> {
        let title = self.title.trim();
        let amount = self.parsed_amount()?;
        let date = parse_input_date(&self.date)?;

        if self.category_id.is_none() && original.category.is_some() {
            return Err("A category cannot be removed once set.".to_string());
        }

        let patch = TransactionPatch {
            title: (title != original.title).then(|| title.to_string()),
            amount: (amount != original.amount).then_some(amount),
            category_id: self
                .category_id
                .filter(|id| Some(*id) != original.category_id()),
            date: (date != original.date).then_some(date),
            kind: (self.kind != original.kind).then_some(self.kind),
        };
        if patch.is_empty() {
            return Err("Nothing changed.".to_string());
        }
        patch.validated().map_err(|err| err.to_string())
    }
}
