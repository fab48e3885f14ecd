use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use axum_extra::headers::{Authorization, HeaderMapExt};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DbBackend, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn setup() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    for (username, password) in [("alice", "secret"), ("bob", "hunter2")] {
        db.execute(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            [username.into(), password.into()],
        ))
        .await
        .unwrap();
    }

    server::router(db)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    credentials: Option<(&str, &str)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    if let Some((username, password)) = credentials {
        request
            .headers_mut()
            .typed_insert(Authorization::basic(username, password));
    }

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

const ALICE: Option<(&str, &str)> = Some(("alice", "secret"));
const BOB: Option<(&str, &str)> = Some(("bob", "hunter2"));

async fn create_category(app: &Router, who: Option<(&str, &str)>, name: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/categories",
        who,
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body[0]["id"].as_i64().unwrap()
}

async fn create_transaction(app: &Router, who: Option<(&str, &str)>, payload: Value) -> Value {
    let (status, body) = send(app, Method::POST, "/transactions", who, Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body[0].clone()
}

#[tokio::test]
async fn missing_or_wrong_credentials_are_rejected() {
    let app = setup().await;

    let (status, body) = send(&app, Method::GET, "/transactions", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        Method::GET,
        "/categories",
        Some(("alice", "wrong")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn categories_are_sorted_and_unique() {
    let app = setup().await;
    create_category(&app, ALICE, "Transport").await;
    create_category(&app, ALICE, "Bills").await;
    create_category(&app, ALICE, "food").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/categories",
        ALICE,
        Some(json!({ "name": " Bills " })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Bills"));

    let (status, body) = send(&app, Method::GET, "/categories", ALICE, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Bills", "Transport", "food"]);
}

#[tokio::test]
async fn blank_category_name_is_unprocessable() {
    let app = setup().await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/categories",
        ALICE,
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_and_list_transactions() {
    let app = setup().await;
    let food = create_category(&app, ALICE, "Food").await;

    let created = create_transaction(
        &app,
        ALICE,
        json!({
            "title": " Groceries ",
            "amount": 42.5,
            "category_id": food,
            "date": "2024-03-05",
            "type": "expense"
        }),
    )
    .await;
    assert_eq!(created["title"], "Groceries");
    assert_eq!(created["amount"], 42.5);
    assert_eq!(created["categories"]["name"], "Food");

    create_transaction(
        &app,
        ALICE,
        json!({
            "title": "Salary",
            "amount": "1000",
            "category_id": null,
            "date": "2024-03-01",
            "type": "income"
        }),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/transactions", ALICE, None).await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["date"], "2024-03-05");
    assert_eq!(list[1]["title"], "Salary");
    assert_eq!(list[1]["amount"], 1000);
    assert!(list[1]["categories"].is_null());
}

#[tokio::test]
async fn invalid_transactions_are_unprocessable() {
    let app = setup().await;
    let bobs = create_category(&app, BOB, "Food").await;

    for payload in [
        json!({ "title": "x", "amount": 0, "category_id": null, "date": "2024-03-01", "type": "expense" }),
        json!({ "title": "  ", "amount": 5, "category_id": null, "date": "2024-03-01", "type": "expense" }),
        json!({ "title": "x", "amount": 5, "category_id": null, "date": "2024-3-1", "type": "expense" }),
        json!({ "title": "x", "amount": 5, "category_id": null, "date": "+2024-3-05", "type": "expense" }),
        json!({ "title": "x", "amount": 5, "category_id": null, "date": " 2024-3-05", "type": "expense" }),
        json!({ "title": "x", "amount": 50000000000000000i64, "category_id": null, "date": "2024-03-01", "type": "income" }),
        json!({ "title": "x", "amount": 5, "category_id": bobs, "date": "2024-03-01", "type": "expense" }),
    ] {
        let (status, body) =
            send(&app, Method::POST, "/transactions", ALICE, Some(payload)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
    }
    let (_, list) = send(&app, Method::GET, "/transactions", ALICE, None).await;
    assert_eq!(list, json!([]));

    let (status, _) = send(
        &app,
        Method::POST,
        "/transactions",
        ALICE,
        Some(json!({ "title": "x" })),
    )
    .await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn update_and_delete_by_id() {
    let app = setup().await;
    let created = create_transaction(
        &app,
        ALICE,
        json!({ "title": "Lunch", "amount": 15, "category_id": null, "date": "2024-03-02", "type": "expense" }),
    )
    .await;
    let id = created["id"].as_i64().unwrap();
    let uri = format!("/transactions/{id}");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        ALICE,
        Some(json!({ "amount": 20, "title": "Dinner" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Updated successfully");

    let (_, list) = send(&app, Method::GET, "/transactions", ALICE, None).await;
    assert_eq!(list[0]["title"], "Dinner");
    assert_eq!(list[0]["amount"], 20);
    assert_eq!(list[0]["date"], "2024-03-02");

    let (status, _) = send(&app, Method::PUT, &uri, ALICE, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::DELETE, &uri, ALICE, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Deleted successfully");

    let (status, _) = send(&app, Method::DELETE, &uri, ALICE, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::PUT, &uri, ALICE, Some(json!({ "amount": 1 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn users_only_see_their_own_records() {
    let app = setup().await;
    let created = create_transaction(
        &app,
        ALICE,
        json!({ "title": "Rent", "amount": 1200, "category_id": null, "date": "2024-03-01", "type": "expense" }),
    )
    .await;
    let uri = format!("/transactions/{}", created["id"]);

    let (_, list) = send(&app, Method::GET, "/transactions", BOB, None).await;
    assert_eq!(list.as_array().unwrap().len(), 0);

    let (status, _) = send(&app, Method::DELETE, &uri, BOB, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&app, Method::GET, "/transactions", ALICE, None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}
