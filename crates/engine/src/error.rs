//! The module contains the errors the engine can throw.
//!
//! Every variant is a local validation failure: the engine never performs
//! I/O, so nothing here is transient.
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid transaction type: {0}")]
    InvalidKind(String),
    #[error("Invalid sort key: {0}")]
    InvalidSortKey(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
}
