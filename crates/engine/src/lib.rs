//! Domain model and aggregation engine for Spendbook.
//!
//! The engine is I/O free: the server persists the types defined here and
//! the terminal client aggregates them for display.

pub use aggregate::{
    PeriodView, SortKey, Stats, ViewMemo, all_time_stats, category_totals, filter_by_period,
    period_net_total, sort_transactions,
};
pub use categories::{
    Category, DEFAULT_CATEGORIES, UNCATEGORIZED_NAME, contains_category, normalize_category_name,
};
pub use error::EngineError;
pub use money::Money;
pub use period::Period;
pub use transactions::{
    CategoryRef, DATE_FORMAT, Transaction, TransactionDraft, TransactionPatch, TransactionType,
    parse_date, validate_amount, validate_title,
};

mod aggregate;
mod categories;
mod error;
mod money;
mod period;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
