//! HTTP access to the remote store.

use api_types::{
    ErrorResponse, MessageResponse,
    category::{CategoryNew, CategoryView},
    transaction::TransactionView,
};
use engine::{Category, Transaction, TransactionDraft, TransactionPatch};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::{AppError, Result};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid credentials")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("server unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The operations the repository needs from the system of record.
pub trait RemoteStore {
    /// All transactions, newest date first.
    async fn list_transactions(&self) -> std::result::Result<Vec<Transaction>, ClientError>;
    /// Creates a transaction and returns the stored record.
    async fn create_transaction(
        &self,
        draft: &TransactionDraft,
    ) -> std::result::Result<Transaction, ClientError>;
    async fn update_transaction(
        &self,
        id: i64,
        patch: &TransactionPatch,
    ) -> std::result::Result<(), ClientError>;
    async fn delete_transaction(&self, id: i64) -> std::result::Result<(), ClientError>;
    /// All categories, ordered by name.
    async fn list_categories(&self) -> std::result::Result<Vec<Category>, ClientError>;
    async fn create_category(&self, name: &str) -> std::result::Result<Category, ClientError>;
}

#[derive(Debug, Clone)]
struct Credentials {
    username: String,
    password: String,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    credentials: Option<Credentials>,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|err| {
            AppError::Config(config::ConfigError::Message(format!(
                "invalid base_url: {err}"
            )))
        })?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
            credentials: None,
        })
    }

    pub fn set_credentials(&mut self, username: &str, password: &str) {
        self.credentials = Some(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        });
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))
    }

    /// Sends an authenticated request and decodes either the success body or
    /// the `{error}` body of a failure.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<T, ClientError> {
        let Some(credentials) = &self.credentials else {
            return Err(ClientError::Unauthorized);
        };

        let res = request
            .basic_auth(&credentials.username, Some(&credentials.password))
            .send()
            .await?;

        if res.status().is_success() {
            return Ok(res.json::<T>().await?);
        }

        let status = res.status();
        let body = res
            .json::<ErrorResponse>()
            .await
            .map(|err| err.error)
            .unwrap_or_else(|_| "unknown error".to_string());
        tracing::debug!("request failed with {status}: {body}");

        Err(error_for_status(status.as_u16(), body))
    }
}

fn error_for_status(status: u16, body: String) -> ClientError {
    match status {
        401 => ClientError::Unauthorized,
        404 => ClientError::NotFound,
        409 => ClientError::Conflict(body),
        422 => ClientError::Validation(body),
        _ => ClientError::Server(body),
    }
}

fn first<T>(created: Vec<T>) -> std::result::Result<T, ClientError> {
    created
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::Server("empty create response".to_string()))
}

impl RemoteStore for Client {
    async fn list_transactions(&self) -> std::result::Result<Vec<Transaction>, ClientError> {
        let request = self.http.get(self.endpoint("transactions")?);
        let views: Vec<TransactionView> = self.send(request).await?;
        Ok(views.into_iter().map(Transaction::from).collect())
    }

    async fn create_transaction(
        &self,
        draft: &TransactionDraft,
    ) -> std::result::Result<Transaction, ClientError> {
        let request = self.http.post(self.endpoint("transactions")?).json(draft);
        let created: Vec<TransactionView> = self.send(request).await?;
        first(created).map(Transaction::from)
    }

    async fn update_transaction(
        &self,
        id: i64,
        patch: &TransactionPatch,
    ) -> std::result::Result<(), ClientError> {
        let request = self
            .http
            .put(self.endpoint(&format!("transactions/{id}"))?)
            .json(patch);
        let _: MessageResponse = self.send(request).await?;
        Ok(())
    }

    async fn delete_transaction(&self, id: i64) -> std::result::Result<(), ClientError> {
        let request = self
            .http
            .delete(self.endpoint(&format!("transactions/{id}"))?);
        let _: MessageResponse = self.send(request).await?;
        Ok(())
    }

    async fn list_categories(&self) -> std::result::Result<Vec<Category>, ClientError> {
        let request = self.http.get(self.endpoint("categories")?);
        self.send::<Vec<CategoryView>>(request).await
    }

    async fn create_category(&self, name: &str) -> std::result::Result<Category, ClientError> {
        let payload = CategoryNew {
            name: name.to_string(),
        };
        let request = self.http.post(self.endpoint("categories")?).json(&payload);
        let created: Vec<CategoryView> = self.send(request).await?;
        first(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_error_kinds() {
        assert!(matches!(
            error_for_status(401, String::new()),
            ClientError::Unauthorized
        ));
        assert!(matches!(
            error_for_status(404, String::new()),
            ClientError::NotFound
        ));
        assert!(matches!(
            error_for_status(409, "dup".to_string()),
            ClientError::Conflict(msg) if msg == "dup"
        ));
        assert!(matches!(
            error_for_status(422, "bad".to_string()),
            ClientError::Validation(_)
        ));
        assert!(matches!(
            error_for_status(500, "boom".to_string()),
            ClientError::Server(_)
        ));
    }

    #[test]
    fn endpoints_join_base_url() {
        let client = Client::new("http://127.0.0.1:3000/").unwrap();
        assert_eq!(
            client.endpoint("transactions/4").unwrap().as_str(),
            "http://127.0.0.1:3000/transactions/4"
        );
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let err = Client::new("not a url").err().unwrap();
        assert!(matches!(err, AppError::Config(_)), "{err:?}");
        assert!(err.to_string().contains("invalid base_url"));
    }

    #[tokio::test]
    async fn requests_without_credentials_are_unauthorized() {
        let client = Client::new("http://127.0.0.1:9").unwrap();
        assert!(matches!(
            client.list_categories().await,
            Err(ClientError::Unauthorized)
        ));
    }
}
