//! Category registry.

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Group label for transactions without a category reference.
pub const UNCATEGORIZED_NAME: &str = "Uncategorized";

/// Categories seeded for a new user.
pub const DEFAULT_CATEGORIES: [&str; 4] = ["Food", "Transport", "Entertainment", "Bills"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Trims a category name and rejects empty ones. Case is preserved:
/// uniqueness is case-sensitive.
pub fn normalize_category_name(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(
            "category name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Exact, case-sensitive membership test.
pub fn contains_category(categories: &[Category], name: &str) -> bool {
    categories.iter().any(|c| c.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_check_is_case_sensitive() {
        let list = vec![Category {
            id: 1,
            name: "Food".to_string(),
        }];
        assert!(contains_category(&list, "Food"));
        assert!(!contains_category(&list, "food"));
    }

    #[test]
    fn normalize_trims_and_rejects_empty() {
        assert_eq!(normalize_category_name("  Gym ").unwrap(), "Gym");
        assert!(normalize_category_name(" \t").is_err());
    }
}
