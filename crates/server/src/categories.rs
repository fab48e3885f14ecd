//! Per-user category list.

use api_types::category::{CategoryNew, CategoryView};
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::{EngineError, normalize_category_name};
use sea_orm::{ActiveValue, QueryOrder, entity::prelude::*};

use crate::{ServerError, server::ServerState, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CategoryView {
    fn from(model: Model) -> Self {
        CategoryView {
            id: model.id,
            name: model.name,
        }
    }
}

/// The category `id` if it belongs to `username`.
pub(crate) async fn owned<C: ConnectionTrait>(
    db: &C,
    username: &str,
    id: i64,
) -> Result<Option<Model>, DbErr> {
    Entity::find_by_id(id)
        .filter(Column::UserId.eq(username))
        .one(db)
        .await
}

/// Rejects category ids the user cannot reference.
pub(crate) async fn ensure_owned<C: ConnectionTrait>(
    db: &C,
    username: &str,
    id: i64,
) -> Result<(), ServerError> {
    match owned(db, username, id).await? {
        Some(_) => Ok(()),
        None => Err(ServerError::Validation(format!("unknown category {id}"))),
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = Entity::find()
        .filter(Column::UserId.eq(&user.username))
        .order_by_asc(Column::Name)
        .all(&state.db)
        .await?;

    tracing::debug!("listing {} categories for {}", categories.len(), user.username);
    Ok(Json(categories.into_iter().map(CategoryView::from).collect()))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    payload: Result<Json<CategoryNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<CategoryView>>), ServerError> {
    let Json(payload) = payload.map_err(|err| ServerError::Generic(err.body_text()))?;
    let name = normalize_category_name(&payload.name)?;

    let existing = Entity::find()
        .filter(Column::UserId.eq(&user.username))
        .filter(Column::Name.eq(&name))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(EngineError::ExistingKey(name).into());
    }

    let category = ActiveModel {
        id: ActiveValue::NotSet,
        user_id: ActiveValue::Set(user.username.clone()),
        name: ActiveValue::Set(name),
    }
    .insert(&state.db)
    .await?;

    tracing::info!("category {} created for {}", category.id, user.username);
    Ok((StatusCode::CREATED, Json(vec![category.into()])))
}
