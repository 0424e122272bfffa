//! HTTP-level tests: the production router over an in-memory database,
//! driven with `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use apotheca_api::{router, AppState};
use apotheca_db::{Database, DbConfig};

async fn app() -> Router {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database");
    router(AppState::new(db))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, value)
}

/// Creates a 10-per-pack item with one batch of `quantity` base units.
/// Returns `(item_id, batch_id)`.
async fn stocked_item(app: &Router, code: &str, quantity: i64) -> (String, String) {
    let (status, item) = send(
        app,
        Method::POST,
        "/api/items",
        Some(json!({
            "code": code,
            "name": format!("Item {code}"),
            "item_type": "tablet",
            "unit_name": "strip",
            "sub_unit_name": "tablet",
            "units_per_pack": 10,
            "min_stock": 50
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{item}");
    let item_id = item["id"].as_str().unwrap().to_string();

    let (status, batch) = send(
        app,
        Method::POST,
        &format!("/api/items/{item_id}/batches"),
        Some(json!({
            "batch_number": format!("{code}-B1"),
            "quantity": quantity,
            "cost_price_cents": 150,
            "sell_price_cents": 250,
            "expiry_date": "2030-12-31"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{batch}");
    let batch_id = batch["id"].as_str().unwrap().to_string();

    (item_id, batch_id)
}

async fn batch_quantity(app: &Router, batch_id: &str) -> i64 {
    let (status, batch) = send(app, Method::GET, &format!("/api/batches/{batch_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    batch["quantity"].as_i64().unwrap()
}

async fn bank_account(app: &Router, opening: i64) -> String {
    let (status, account) = send(
        app,
        Method::POST,
        "/api/bank-accounts",
        Some(json!({
            "name": "Main",
            "account_number": "PK00-0001",
            "opening_balance_cents": opening
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{account}");
    account["id"].as_str().unwrap().to_string()
}

async fn balance(app: &Router, account_id: &str) -> i64 {
    let (_, account) = send(app, Method::GET, &format!("/api/bank-accounts/{account_id}"), None).await;
    account["balance_cents"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_sale_deducts_stock_and_delete_restores() {
    let app = app().await;
    let (item_id, batch_id) = stocked_item(&app, "PARA500", 100).await;

    // 2 strips + 3 loose tablets = 23 tablets
    let (status, sale) = send(
        &app,
        Method::POST,
        "/api/sales",
        Some(json!({
            "items": [{
                "item_id": item_id,
                "batch_id": batch_id,
                "unit_quantity": 2,
                "sub_unit_quantity": 3
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{sale}");
    assert_eq!(sale["items"][0]["base_units"], 23);
    assert_eq!(sale["sale"]["total_cents"], 575);
    assert!(sale["sale"]["invoice_number"]
        .as_str()
        .unwrap()
        .ends_with("-0001"));
    assert_eq!(batch_quantity(&app, &batch_id).await, 77);

    let sale_id = sale["sale"]["id"].as_str().unwrap();
    let (status, fetched) = send(&app, Method::GET, &format!("/api/sales/{sale_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["items"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/sales/{sale_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
    assert_eq!(batch_quantity(&app, &batch_id).await, 100);

    let (status, _) = send(&app, Method::GET, &format!("/api/sales/{sale_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_insufficient_stock_is_rejected_without_changes() {
    let app = app().await;
    let (item_id, batch_id) = stocked_item(&app, "AMOX250", 15).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/sales",
        Some(json!({
            "items": [
                { "item_id": item_id, "batch_id": batch_id, "unit_quantity": 1 },
                { "item_id": item_id, "batch_id": batch_id, "unit_quantity": 1 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    assert_eq!(batch_quantity(&app, &batch_id).await, 15);

    let (_, sales) = send(&app, Method::GET, "/api/sales", None).await;
    assert!(sales.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_bank_deposit_sale_moves_balance() {
    let app = app().await;
    let (item_id, batch_id) = stocked_item(&app, "ORS", 40).await;
    let account_id = bank_account(&app, 1_000).await;

    let (status, sale) = send(
        &app,
        Method::POST,
        "/api/sales",
        Some(json!({
            "payment_method": "bank_deposit",
            "bank_account_id": account_id,
            "discount_cents": 100,
            "items": [{ "item_id": item_id, "batch_id": batch_id, "unit_quantity": 2 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{sale}");
    assert_eq!(sale["sale"]["total_cents"], 400);
    assert_eq!(balance(&app, &account_id).await, 1_400);

    let sale_id = sale["sale"]["id"].as_str().unwrap();
    let (status, _) = send(&app, Method::DELETE, &format!("/api/sales/{sale_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(balance(&app, &account_id).await, 1_000);
}

#[tokio::test]
async fn test_bank_deposit_requires_account() {
    let app = app().await;
    let (item_id, batch_id) = stocked_item(&app, "ZINC", 10).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/sales",
        Some(json!({
            "payment_method": "bank_deposit",
            "items": [{ "item_id": item_id, "batch_id": batch_id, "unit_quantity": 1 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_not_found_shape() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::GET,
        "/api/items/550e8400-e29b-41d4-a716-446655440000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(body["message"].as_str().unwrap().contains("550e8400"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/items")
        .header("content-type", "application/json")
        .body(Body::from("{\"code\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_bad_date_query_is_bad_request() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/sales?from=yesterday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = send(&app, Method::GET, "/api/sales?from=2026-02-02&to=2026-02-01", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_duplicate_item_code() {
    let app = app().await;
    stocked_item(&app, "CETZ10", 10).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/items",
        Some(json!({ "code": "CETZ10", "name": "Another" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE");
}

#[tokio::test]
async fn test_low_stock_listing() {
    let app = app().await;
    let (item_id, _) = stocked_item(&app, "IBU400", 20).await;
    stocked_item(&app, "VITC", 500).await;

    let (status, low) = send(&app, Method::GET, "/api/items/low-stock", None).await;
    assert_eq!(status, StatusCode::OK);
    let low = low.as_array().unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0]["item_id"], item_id.as_str());
    assert_eq!(low[0]["total_quantity"], 20);
}

#[tokio::test]
async fn test_purchase_receives_stock() {
    let app = app().await;
    let (item_id, batch_id) = stocked_item(&app, "METF", 10).await;

    let (status, supplier) = send(
        &app,
        Method::POST,
        "/api/suppliers",
        Some(json!({ "name": "Karachi Pharma Distributors" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, purchase) = send(
        &app,
        Method::POST,
        "/api/purchases",
        Some(json!({
            "supplier_id": supplier["id"],
            "items": [{
                "item_id": item_id,
                "batch_number": "METF-B1",
                "unit_quantity": 3,
                "cost_price_cents": 150,
                "sell_price_cents": 250,
                "expiry_date": "2031-06-30"
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{purchase}");
    assert_eq!(purchase["purchase"]["total_cents"], 450);
    assert_eq!(batch_quantity(&app, &batch_id).await, 40);
}

#[tokio::test]
async fn test_report_summary() {
    let app = app().await;
    let (item_id, batch_id) = stocked_item(&app, "DICLO", 100).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/sales",
        Some(json!({
            "items": [{ "item_id": item_id, "batch_id": batch_id, "unit_quantity": 1 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, expense) = send(
        &app,
        Method::POST,
        "/api/expenses",
        Some(json!({ "category": "Utilities", "amount_cents": 30 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{expense}");

    let (status, summary) = send(&app, Method::GET, "/api/reports/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["sale_count"], 1);
    assert_eq!(summary["revenue_cents"], 250);
    assert_eq!(summary["cost_of_goods_cents"], 150);
    assert_eq!(summary["gross_profit_cents"], 100);
    assert_eq!(summary["expenses_cents"], 30);
    assert_eq!(summary["net_profit_cents"], 70);
}
