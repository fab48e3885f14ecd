//! Read-only views derived from the transaction collection.
//!
//! Everything here is pure: the same input always yields the same output,
//! and an empty collection yields empty maps and zero totals.

use std::{borrow::Borrow, collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, Period, Transaction, TransactionType, util::collate};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SortKey {
    #[default]
    None,
    AmountAsc,
    AmountDesc,
    TitleAsc,
    TitleDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::None,
        SortKey::AmountAsc,
        SortKey::AmountDesc,
        SortKey::TitleAsc,
        SortKey::TitleDesc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::AmountAsc => "amount-asc",
            Self::AmountDesc => "amount-desc",
            Self::TitleAsc => "title-asc",
            Self::TitleDesc => "title-desc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "Date (newest first)",
            Self::AmountAsc => "Amount: Low → High",
            Self::AmountDesc => "Amount: High → Low",
            Self::TitleAsc => "Title: A → Z",
            Self::TitleDesc => "Title: Z → A",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "none" => Ok(Self::None),
            "amount-asc" => Ok(Self::AmountAsc),
            "amount-desc" => Ok(Self::AmountDesc),
            "title-asc" => Ok(Self::TitleAsc),
            "title-desc" => Ok(Self::TitleDesc),
            other => Err(EngineError::InvalidSortKey(other.to_string())),
        }
    }
}

impl TryFrom<String> for SortKey {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortKey> for String {
    fn from(value: SortKey) -> Self {
        value.as_str().to_string()
    }
}

/// All-time totals. `balance == income - expense` by construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub income: Money,
    pub expense: Money,
    pub balance: Money,
}

/// Transactions whose date falls inside `period`, in input order.
///
/// Records with a missing or malformed date are never included.
pub fn filter_by_period(transactions: &[Transaction], period: Period) -> Vec<&Transaction> {
    transactions
        .iter()
        .filter(|tx| period.contains(&tx.date))
        .collect()
}

/// Stable in-place sort. `SortKey::None` leaves the order untouched and
/// ties always keep their input order.
pub fn sort_transactions<T: Borrow<Transaction>>(items: &mut [T], key: SortKey) {
    match key {
        SortKey::None => {}
        SortKey::AmountAsc => items.sort_by(|a, b| a.borrow().amount.cmp(&b.borrow().amount)),
        SortKey::AmountDesc => items.sort_by(|a, b| b.borrow().amount.cmp(&a.borrow().amount)),
        SortKey::TitleAsc => {
            items.sort_by(|a, b| collate(&a.borrow().title, &b.borrow().title));
        }
        SortKey::TitleDesc => {
            items.sort_by(|a, b| collate(&b.borrow().title, &a.borrow().title));
        }
    }
}

/// Expense sum per category name. Categories without expenses are absent.
pub fn category_totals<'a, I>(transactions: I) -> BTreeMap<String, Money>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals: BTreeMap<String, Money> = BTreeMap::new();
    for tx in transactions
        .into_iter()
        .filter(|tx| tx.kind == TransactionType::Expense)
    {
        *totals.entry(tx.category_name().to_string()).or_default() += tx.amount;
    }
    totals.retain(|_, total| !total.is_zero());
    totals
}

/// Signed sum: income adds, expense subtracts.
pub fn period_net_total<'a, I>(transactions: I) -> Money
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .map(Transaction::signed_amount)
        .sum()
}

/// Income, expense and balance over the whole collection, dates ignored.
pub fn all_time_stats<'a, I>(transactions: I) -> Stats
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let (income, expense) =
        transactions
            .into_iter()
            .fold((Money::ZERO, Money::ZERO), |(income, expense), tx| match tx.kind {
                TransactionType::Income => (income + tx.amount, expense),
                TransactionType::Expense => (income, expense + tx.amount),
            });
    Stats {
        income,
        expense,
        balance: income - expense,
    }
}

/// Everything a monthly screen needs, computed in one go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeriodView {
    pub period: Period,
    pub sort: SortKey,
    /// Period transactions in display order.
    pub transactions: Vec<Transaction>,
    pub category_totals: BTreeMap<String, Money>,
    pub net_total: Money,
    /// Computed over the full collection, not the period.
    pub stats: Stats,
}

impl PeriodView {
    pub fn compute(transactions: &[Transaction], period: Period, sort: SortKey) -> Self {
        let mut filtered = filter_by_period(transactions, period);
        let category_totals = category_totals(filtered.iter().copied());
        let net_total = period_net_total(filtered.iter().copied());
        sort_transactions(&mut filtered, sort);

        Self {
            period,
            sort,
            transactions: filtered.into_iter().cloned().collect(),
            category_totals,
            net_total,
            stats: all_time_stats(transactions),
        }
    }
}

/// Caches the last [`PeriodView`] against its inputs.
///
/// The caller supplies a revision number that changes whenever the
/// collection changes; the view is recomputed only when the revision, the
/// period or the sort key differ from the cached ones.
#[derive(Debug, Default)]
pub struct ViewMemo {
    cached: Option<(u64, PeriodView)>,
    computations: u64,
}

impl ViewMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &mut self,
        revision: u64,
        transactions: &[Transaction],
        period: Period,
        sort: SortKey,
    ) -> &PeriodView {
        let fresh = matches!(
            &self.cached,
            Some((rev, view)) if *rev == revision && view.period == period && view.sort == sort
        );
        if !fresh {
            self.cached = None;
        }
        let computations = &mut self.computations;
        let (_, view) = self.cached.get_or_insert_with(|| {
            *computations += 1;
            (revision, PeriodView::compute(transactions, period, sort))
        });
        view
    }

    /// Number of times a view was actually computed.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}
