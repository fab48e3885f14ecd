use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;
use sea_orm::{DbErr, SqlErr};

use api_types::ErrorResponse;
pub use server::{ServerState, router, run_with_listener};

mod categories;
mod server;
mod transactions;
mod user;

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Database(DbErr),
    /// Well-formed request that references something unusable, e.g. a
    /// category owned by another user.
    Validation(String),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidDate(_)
        | EngineError::InvalidPeriod(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidKind(_)
        | EngineError::InvalidSortKey(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn status_for_database_error(err: &DbErr) -> StatusCode {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StatusCode::CONFLICT,
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_database_error(status: StatusCode, err: DbErr) -> String {
    match status {
        StatusCode::CONFLICT => "already exists".to_string(),
        StatusCode::UNPROCESSABLE_ENTITY => "referenced record does not exist".to_string(),
        _ => {
            tracing::error!("database error: {err}");
            "internal server error".to_string()
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), err.to_string()),
            ServerError::Database(err) => {
                let status = status_for_database_error(&err);
                (status, message_for_database_error(status, err))
            }
            ServerError::Validation(err) => (StatusCode::UNPROCESSABLE_ENTITY, err),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<DbErr> for ServerError {
    fn from(value: DbErr) -> Self {
        Self::Database(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        for err in [
            EngineError::InvalidAmount("x".to_string()),
            EngineError::InvalidDate("x".to_string()),
            EngineError::InvalidName("x".to_string()),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn validation_maps_to_422() {
        let res = ServerError::Validation("unknown category".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn database_error_maps_to_500() {
        let res = ServerError::from(DbErr::Custom("boom".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
