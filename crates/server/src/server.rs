use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
    typed_header::TypedHeaderRejection,
};
use sea_orm::DatabaseConnection;

use crate::{categories, transactions, user};
use api_types::ErrorResponse;

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "invalid credentials".to_string(),
        }),
    )
        .into_response()
}

async fn auth(
    auth_header: Result<TypedHeader<Authorization<Basic>>, TypedHeaderRejection>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Ok(TypedHeader(auth_header)) = auth_header else {
        return unauthorized();
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return unauthorized();
    }

    let user = match user::authenticate(&state.db, auth_header.username(), auth_header.password())
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!("rejected credentials for {}", auth_header.username());
            return unauthorized();
        }
        Err(err) => {
            tracing::error!("failed to look up user: {err}");
            return unauthorized();
        }
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}

pub fn router(db: DatabaseConnection) -> Router {
    let state = ServerState { db };

    Router::new()
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/transactions/{id}",
            put(transactions::update).delete(transactions::delete),
        )
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run_with_listener(
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(db)).await
}
