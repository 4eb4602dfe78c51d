use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    server::app(Arc::new(engine))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-actor-id", "nurse-7");
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn requests_without_actor_are_rejected() {
    let app = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/domains/medicine/balance")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn fund_cycle_over_http() {
    let app = test_app().await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/domains/medicine/funds/in",
        Some(json!({
            "amount_minor": 100_000,
            "purpose": "opening",
            "description": "seed",
            "transaction_date": "2026-06-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["direction"], "in");
    assert_eq!(body["created_by"], "nurse-7");

    let (status, body) = call(
        &app,
        Method::POST,
        "/domains/medicine/expenses",
        Some(json!({
            "amount_minor": 30_000,
            "category": "Rent",
            "transaction_date": "2026-06-02"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["category"], "Rent");
    assert!(
        body["transaction_number"]
            .as_str()
            .unwrap()
            .starts_with("MED-")
    );

    let (status, body) = call(
        &app,
        Method::POST,
        "/domains/medicine/funds/out",
        Some(json!({
            "amount_minor": 70_100,
            "purpose": "payout",
            "transaction_date": "2026-06-03"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "amount");

    let (status, body) = call(&app, Method::GET, "/domains/medicine/balance", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance_minor"], 70_000);
    assert_eq!(body["domain"], "medicine");
}

#[tokio::test]
async fn unknown_domain_is_404() {
    let app = test_app().await;
    let (status, _) = call(&app, Method::GET, "/domains/pharmacy/balance", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn validation_errors_carry_their_field() {
    let app = test_app().await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/domains/operation/income",
        Some(json!({
            "amount_minor": 500,
            "transaction_date": "2026-06-02"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "category");

    let (status, body) = call(
        &app,
        Method::POST,
        "/domains/operation/ledger",
        Some(json!({
            "date_from": "2026-06-10",
            "date_to": "2026-06-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "date_to");
}

#[tokio::test]
async fn impossible_dates_are_attributed_to_their_field() {
    let app = test_app().await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/domains/medicine/funds/in",
        Some(json!({
            "amount_minor": 100,
            "purpose": "seed",
            "transaction_date": "2026-02-30"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "transaction_date");

    let (status, body) = call(
        &app,
        Method::POST,
        "/domains/medicine/ledger",
        Some(json!({ "date_from": "yesterday" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "date_from");

    let (status, body) = call(
        &app,
        Method::GET,
        "/domains/medicine/reports/balance-sheet?as_of=2026-13-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "as_of");

    let (_, body) = call(&app, Method::GET, "/domains/medicine/balance", None).await;
    assert_eq!(body["balance_minor"], 0);
}

#[tokio::test]
async fn malformed_requests_get_a_json_error_body() {
    let app = test_app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/domains/medicine/funds/in")
        .header("x-actor-id", "nurse-7")
        .header("content-type", "application/json")
        .body(Body::from("{\"amount_minor\": "))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
    assert!(body["field"].is_null());

    let (status, body) = call(
        &app,
        Method::POST,
        "/domains/medicine/expenses",
        Some(json!({ "amount_minor": "ten", "transaction_date": "2026-06-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());

    let (status, body) = call(
        &app,
        Method::GET,
        "/domains/medicine/reports/monthly?year=2026",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn ledger_and_transactions_views() {
    let app = test_app().await;
    for (day, amount) in [("2026-06-01", 1000), ("2026-06-02", 2000), ("2026-06-03", 3000)] {
        let (status, _) = call(
            &app,
            Method::POST,
            "/domains/house_security/funds/in",
            Some(json!({
                "amount_minor": amount,
                "purpose": "seed",
                "transaction_date": day
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = call(
        &app,
        Method::POST,
        "/domains/house_security/ledger",
        Some(json!({ "page_size": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_rows"], 3);
    assert_eq!(body["final_balance_minor"], 6000);
    assert_eq!(body["rows"].as_array().unwrap().len(), 2);
    assert_eq!(body["rows"][0]["balance_minor"], 6000);
    assert_eq!(body["rows"][0]["record"]["transaction_date"], "2026-06-03");

    let (status, body) = call(
        &app,
        Method::POST,
        "/domains/house_security/transactions",
        Some(json!({ "limit": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"].as_array().unwrap().len(), 2);
    let cursor = body["next_cursor"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        Method::POST,
        "/domains/house_security/transactions",
        Some(json!({ "limit": 2, "cursor": cursor })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"][0]["transaction_date"], "2026-06-01");
    assert!(body["next_cursor"].is_null());

    let (status, _) = call(
        &app,
        Method::POST,
        "/domains/house_security/transactions",
        Some(json!({ "cursor": "%%%" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn report_endpoints() {
    let app = test_app().await;
    call(
        &app,
        Method::POST,
        "/domains/operation/funds/in",
        Some(json!({
            "amount_minor": 1_000_000,
            "purpose": "seed",
            "transaction_date": "2026-05-01"
        })),
    )
    .await;
    call(
        &app,
        Method::POST,
        "/domains/operation/income",
        Some(json!({
            "amount_minor": 200_000,
            "category": "Fees",
            "transaction_date": "2026-05-15"
        })),
    )
    .await;
    for (amount, category) in [(500_000, "Anesthesia"), (300_000, "Sutures")] {
        call(
            &app,
            Method::POST,
            "/domains/operation/expenses",
            Some(json!({
                "amount_minor": amount,
                "category": category,
                "transaction_date": "2026-06-10"
            })),
        )
        .await;
    }

    let (status, body) = call(
        &app,
        Method::GET,
        "/domains/operation/reports/monthly?year=2026&month=6",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expense_minor"], 800_000);
    assert_eq!(body["income_minor"], 0);
    assert_eq!(body["net_minor"], -800_000);
    assert_eq!(body["opening_minor"], 1_200_000);

    let (status, body) = call(
        &app,
        Method::GET,
        "/domains/operation/reports/categories?year=2026&month=6&kind=expense&sort=amount",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categories"][0]["label"], "Anesthesia");

    let (status, body) = call(
        &app,
        Method::GET,
        "/domains/operation/reports/trend?months=2&as_of=2026-06-30",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["months"][0]["income_minor"], 200_000);
    assert_eq!(body["months"][1]["expense_minor"], 800_000);

    let (status, body) = call(
        &app,
        Method::GET,
        "/domains/operation/reports/daily?year=2026&month=6",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["days"].as_array().unwrap().len(), 30);
    assert_eq!(body["days"][9]["outflow_minor"], 800_000);

    let (status, body) = call(
        &app,
        Method::GET,
        "/domains/operation/reports/balance-sheet?as_of=2026-05-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance_minor"], 1_200_000);
}

#[tokio::test]
async fn category_directory_endpoints() {
    let app = test_app().await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/categories",
        Some(json!({ "name": "Laundry" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    let (status, _) = call(
        &app,
        Method::POST,
        "/categories",
        Some(json!({ "name": "laundry" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/categories/{id}/active"),
        Some(json!({ "active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], false);

    let (_, body) = call(&app, Method::GET, "/categories", None).await;
    assert!(body["categories"].as_array().unwrap().is_empty());

    let (_, body) = call(&app, Method::GET, "/categories?include_inactive=true", None).await;
    assert_eq!(body["categories"][0]["name"], "Laundry");

    let (status, _) = call(
        &app,
        Method::POST,
        "/categories/999/active",
        Some(json!({ "active": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
