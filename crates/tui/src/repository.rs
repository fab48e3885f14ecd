//! In-memory owner of the transaction collection and the category list.
//!
//! Mutations are applied locally first where possible, then confirmed
//! against the remote store. A failed confirmation never rolls back a single
//! field: the collection is refetched instead.

use engine::{
    Category, EngineError, Period, PeriodView, SortKey, Transaction, TransactionDraft,
    TransactionPatch, ViewMemo, contains_category, normalize_category_name,
};
use thiserror::Error;

use crate::{
    client::{ClientError, RemoteStore},
    local_state::{KeyValueStore, categories_key},
};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Invalid(#[from] EngineError),
    #[error("category \"{0}\" already exists")]
    DuplicateCategory(String),
    #[error("nothing to update")]
    EmptyPatch,
    #[error(transparent)]
    Remote(#[from] ClientError),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// What the view layer reads on every frame.
pub struct Snapshot<'a> {
    pub view: &'a PeriodView,
    pub categories: &'a [Category],
    pub ready: bool,
}

pub struct TransactionRepository<S, K> {
    remote: S,
    local: K,
    user: Option<String>,
    transactions: Vec<Transaction>,
    categories: Vec<Category>,
    ready: bool,
    revision: u64,
    memo: ViewMemo,
}

impl<S: RemoteStore, K: KeyValueStore> TransactionRepository<S, K> {
    pub fn new(remote: S, local: K) -> Self {
        Self {
            remote,
            local,
            user: None,
            transactions: Vec::new(),
            categories: Vec::new(),
            ready: false,
            revision: 0,
            memo: ViewMemo::new(),
        }
    }

    pub fn remote_mut(&mut self) -> &mut S {
        &mut self.remote
    }

    /// Switches the cache to `username` and drops the previous user's data.
    pub fn set_user(&mut self, username: &str) {
        if self.user.as_deref() == Some(username) {
            return;
        }
        self.user = Some(username.to_string());
        self.transactions.clear();
        self.categories = self.cached_categories().unwrap_or_default();
        self.ready = false;
        self.touch();
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn find(&self, id: i64) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id == id)
    }

    /// Fetches transactions and categories together and replaces the local
    /// copies. Categories fall back to the cached list when their fetch
    /// fails.
    pub async fn load(&mut self) -> RepositoryResult<()> {
        self.ready = false;
        let (transactions, categories) = tokio::join!(
            self.remote.list_transactions(),
            self.remote.list_categories()
        );

        match categories {
            Ok(categories) => self.replace_categories(categories),
            Err(err) => {
                tracing::warn!("failed to load categories, using cached list: {err}");
                if let Some(cached) = self.cached_categories() {
                    self.categories = cached;
                }
            }
        }

        let result = match transactions {
            Ok(transactions) => {
                tracing::info!("loaded {} transactions", transactions.len());
                self.transactions = transactions;
                self.touch();
                Ok(())
            }
            Err(err) => {
                tracing::error!("failed to load transactions: {err}");
                Err(err.into())
            }
        };

        self.ready = true;
        result
    }

    pub async fn add_transaction(&mut self, draft: TransactionDraft) -> RepositoryResult<()> {
        let draft = draft.validated()?;
        let created = self.remote.create_transaction(&draft).await.map_err(|err| {
            tracing::error!("failed to create transaction: {err}");
            err
        })?;

        tracing::info!("transaction {} created", created.id);
        self.transactions.insert(0, created);
        self.touch();
        Ok(())
    }

    pub async fn delete_transaction(&mut self, id: i64) -> RepositoryResult<()> {
        let before = self.transactions.len();
        self.transactions.retain(|tx| tx.id != id);
        if self.transactions.len() != before {
            self.touch();
        }

        if let Err(err) = self.remote.delete_transaction(id).await {
            tracing::error!("failed to delete transaction {id}: {err}");
            self.resync().await;
            return Err(err.into());
        }
        tracing::info!("transaction {id} deleted");
        Ok(())
    }

    pub async fn edit_transaction(
        &mut self,
        id: i64,
        patch: TransactionPatch,
    ) -> RepositoryResult<()> {
        if patch.is_empty() {
            return Err(RepositoryError::EmptyPatch);
        }
        let patch = patch.validated()?;

        let categories = &self.categories;
        let merged = match self.transactions.iter_mut().find(|tx| tx.id == id) {
            Some(tx) => {
                tx.apply_patch(&patch, |category_id| {
                    categories
                        .iter()
                        .find(|c| c.id == category_id)
                        .map(|c| c.name.clone())
                });
                true
            }
            None => false,
        };
        if merged {
            self.touch();
        }

        if let Err(err) = self.remote.update_transaction(id, &patch).await {
            tracing::error!("failed to update transaction {id}: {err}");
            self.resync().await;
            return Err(err.into());
        }
        tracing::info!("transaction {id} updated");
        Ok(())
    }

    /// Creates a category and returns it. Duplicates of a name already in
    /// the list are rejected without contacting the remote store.
    pub async fn add_category(&mut self, name: &str) -> RepositoryResult<Category> {
        let name = normalize_category_name(name)?;
        if contains_category(&self.categories, &name) {
            return Err(RepositoryError::DuplicateCategory(name));
        }

        match self.remote.create_category(&name).await {
            Ok(category) => {
                let at = self
                    .categories
                    .partition_point(|existing| existing.name < category.name);
                self.categories.insert(at, category.clone());
                self.persist_categories();
                tracing::info!("category {} created", category.id);
                Ok(category)
            }
            Err(err) => {
                tracing::error!("failed to create category {name}: {err}");
                match self.remote.list_categories().await {
                    Ok(categories) => self.replace_categories(categories),
                    Err(reload_err) => {
                        tracing::warn!("failed to reload categories: {reload_err}");
                    }
                }
                Err(err.into())
            }
        }
    }

    /// The derived view for `period`, recomputed only when the collection,
    /// the period or the sort key changed since the last call.
    pub fn view(&mut self, period: Period, sort: SortKey) -> &PeriodView {
        self.memo.get(self.revision, &self.transactions, period, sort)
    }

    pub fn snapshot(&mut self, period: Period, sort: SortKey) -> Snapshot<'_> {
        let view = self.memo.get(self.revision, &self.transactions, period, sort);
        Snapshot {
            view,
            categories: &self.categories,
            ready: self.ready,
        }
    }

    /// Compensating reload after a failed optimistic mutation.
    async fn resync(&mut self) {
        if let Err(err) = self.load().await {
            tracing::warn!("resync failed: {err}");
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn replace_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
        self.persist_categories();
    }

    fn persist_categories(&mut self) {
        let Some(user) = &self.user else {
            return;
        };
        let payload = match serde_json::to_string(&self.categories) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!("failed to encode categories: {err}");
                return;
            }
        };
        if let Err(err) = self.local.set(&categories_key(user), payload) {
            tracing::warn!("failed to cache categories: {err}");
        }
    }

    fn cached_categories(&self) -> Option<Vec<Category>> {
        let raw = self.local.get(&categories_key(self.user.as_deref()?))?;
        match serde_json::from_str(&raw) {
            Ok(categories) => Some(categories),
            Err(err) => {
                tracing::warn!("ignoring unreadable category cache: {err}");
                None
            }
        }
    }
}
