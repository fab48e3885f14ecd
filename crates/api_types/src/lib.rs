//! JSON bodies exchanged between the server and its clients.

use serde::{Deserialize, Serialize};

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of successful update/delete responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

pub mod transaction {
    use super::*;
    use engine::{CategoryRef, Money, Transaction};

    pub use engine::{TransactionDraft as TransactionNew, TransactionPatch as TransactionUpdate};
    pub use engine::TransactionType;

    /// Embedded category of a listed transaction.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryName {
        pub name: String,
    }

    /// A stored transaction with its category joined in.
    ///
    /// `categories` is `null` when the transaction has no category.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i64,
        pub title: String,
        pub amount: Money,
        pub category_id: Option<i64>,
        #[serde(default)]
        pub categories: Option<CategoryName>,
        pub date: String,
        #[serde(rename = "type")]
        pub kind: TransactionType,
    }

    impl From<TransactionView> for Transaction {
        fn from(view: TransactionView) -> Self {
            let category = view.category_id.map(|id| CategoryRef {
                id,
                name: view.categories.map(|c| c.name).unwrap_or_default(),
            });
            Transaction {
                id: view.id,
                title: view.title,
                amount: view.amount,
                category,
                date: view.date,
                kind: view.kind,
            }
        }
    }

    impl From<Transaction> for TransactionView {
        fn from(tx: Transaction) -> Self {
            let (category_id, categories) = match tx.category {
                Some(CategoryRef { id, name }) => (Some(id), Some(CategoryName { name })),
                None => (None, None),
            };
            TransactionView {
                id: tx.id,
                title: tx.title,
                amount: tx.amount,
                category_id,
                categories,
                date: tx.date,
                kind: tx.kind,
            }
        }
    }
}

pub mod category {
    use super::*;

    pub use engine::Category as CategoryView;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
    }
}

#[cfg(test)]
mod tests {
    use super::transaction::*;
    use engine::{Money, Transaction};

    #[test]
    fn view_json_matches_wire_shape() {
        let json = r#"{
            "id": 3,
            "title": "Groceries",
            "amount": 42.5,
            "category_id": 1,
            "categories": { "name": "Food" },
            "date": "2024-03-05",
            "type": "expense"
        }"#;
        let view: TransactionView = serde_json::from_str(json).unwrap();
        let tx = Transaction::from(view);

        assert_eq!(tx.amount, Money::new(4_250));
        assert_eq!(tx.category_name(), "Food");
        assert_eq!(tx.kind, TransactionType::Expense);
    }

    #[test]
    fn view_without_category_maps_to_none() {
        let json = r#"{"id":1,"title":"Pay","amount":1000,"category_id":null,"date":"2024-03-01","type":"income"}"#;
        let view: TransactionView = serde_json::from_str(json).unwrap();
        let tx = Transaction::from(view.clone());

        assert!(tx.category.is_none());
        assert_eq!(TransactionView::from(tx), view);
    }
}
