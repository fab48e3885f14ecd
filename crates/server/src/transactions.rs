//! Transaction records, scoped to the authenticated user.

use api_types::{
    MessageResponse,
    transaction::{CategoryName, TransactionNew, TransactionType, TransactionUpdate, TransactionView},
};
use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use engine::{EngineError, Money};
use sea_orm::{ActiveValue, QueryOrder, entity::prelude::*};

use crate::{ServerError, categories, server::ServerState, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub amount_minor: i64,
    pub category_id: Option<i64>,
    pub date: String,
    pub kind: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "categories::Entity",
        from = "Column::CategoryId",
        to = "categories::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    fn into_view(self, category: Option<categories::Model>) -> Result<TransactionView, ServerError> {
        let kind = TransactionType::try_from(self.kind.as_str())
            .map_err(|err| ServerError::Database(DbErr::Type(err.to_string())))?;

        Ok(TransactionView {
            id: self.id,
            title: self.title,
            amount: Money::new(self.amount_minor),
            category_id: self.category_id,
            categories: category.map(|c| CategoryName { name: c.name }),
            date: self.date,
            kind,
        })
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServerError> {
    payload
        .map(|Json(value)| value)
        .map_err(|err| ServerError::Generic(err.body_text()))
}

fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ServerError> {
    path.map(|Path(id)| id)
        .map_err(|err| ServerError::Generic(err.body_text()))
}

async fn find_owned(state: &ServerState, username: &str, id: i64) -> Result<Model, ServerError> {
    Entity::find_by_id(id)
        .filter(Column::UserId.eq(username))
        .one(&state.db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("transaction {id}")).into())
}

/// Lists the user's transactions, newest date first.
pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let rows = Entity::find()
        .filter(Column::UserId.eq(&user.username))
        .order_by_desc(Column::Date)
        .order_by_desc(Column::Id)
        .find_also_related(categories::Entity)
        .all(&state.db)
        .await?;

    tracing::debug!("listing {} transactions for {}", rows.len(), user.username);
    let transactions = rows
        .into_iter()
        .map(|(tx, category)| tx.into_view(category))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(transactions))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<TransactionView>>), ServerError> {
    let draft = body(payload)?.validated()?;

    let category = match draft.category_id {
        Some(id) => Some(
            categories::owned(&state.db, &user.username, id)
                .await?
                .ok_or_else(|| ServerError::Validation(format!("unknown category {id}")))?,
        ),
        None => None,
    };

    let created = ActiveModel {
        id: ActiveValue::NotSet,
        user_id: ActiveValue::Set(user.username.clone()),
        title: ActiveValue::Set(draft.title),
        amount_minor: ActiveValue::Set(draft.amount.into()),
        category_id: ActiveValue::Set(draft.category_id),
        date: ActiveValue::Set(draft.date),
        kind: ActiveValue::Set(draft.kind.as_str().to_string()),
    }
    .insert(&state.db)
    .await?;

    tracing::info!("transaction {} created for {}", created.id, user.username);
    Ok((StatusCode::CREATED, Json(vec![created.into_view(category)?])))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TransactionUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>, ServerError> {
    let id = path_id(path)?;
    let patch = body(payload)?;
    if patch.is_empty() {
        return Err(ServerError::Generic("nothing to update".to_string()));
    }
    let patch = patch.validated()?;

    let existing = find_owned(&state, &user.username, id).await?;
    if let Some(category_id) = patch.category_id {
        categories::ensure_owned(&state.db, &user.username, category_id).await?;
    }

    let mut tx: ActiveModel = existing.into();
    if let Some(title) = patch.title {
        tx.title = ActiveValue::Set(title);
    }
    if let Some(amount) = patch.amount {
        tx.amount_minor = ActiveValue::Set(amount.into());
    }
    if let Some(category_id) = patch.category_id {
        tx.category_id = ActiveValue::Set(Some(category_id));
    }
    if let Some(date) = patch.date {
        tx.date = ActiveValue::Set(date);
    }
    if let Some(kind) = patch.kind {
        tx.kind = ActiveValue::Set(kind.as_str().to_string());
    }
    tx.update(&state.db).await?;

    tracing::info!("transaction {id} updated for {}", user.username);
    Ok(Json(MessageResponse {
        message: "Updated successfully".to_string(),
    }))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ServerError> {
    let id = path_id(path)?;
    let result = Entity::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::UserId.eq(&user.username))
        .exec(&state.db)
        .await?;

    if result.rows_affected == 0 {
        return Err(EngineError::KeyNotFound(format!("transaction {id}")).into());
    }

    tracing::info!("transaction {id} deleted for {}", user.username);
    Ok(Json(MessageResponse {
        message: "Deleted successfully".to_string(),
    }))
}
