//! # Routes
//!
//! ```text
//! /health                              liveness + database ping
//! /api
//!  ├── /items            (?q=)         inventory.rs
//!  │    ├── /low-stock
//!  │    └── /{id}  ─── /batches
//!  ├── /batches/{id}, /batches/expiring?before=
//!  ├── /customers, /suppliers          parties.rs
//!  ├── /bank-accounts                  bank_accounts.rs
//!  ├── /sales          (?from=&to=)    sales.rs
//!  ├── /purchases      (?from=&to=)    purchases.rs
//!  ├── /expenses       (?from=&to=)    expenses.rs
//!  └── /reports/summary?from=&to=      reports.rs
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::AppState;

pub mod bank_accounts;
pub mod expenses;
pub mod inventory;
pub mod parties;
pub mod purchases;
pub mod reports;
pub mod sales;

/// All `/api` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(inventory::routes())
        .merge(parties::routes())
        .merge(bank_accounts::routes())
        .merge(sales::routes())
        .merge(purchases::routes())
        .merge(expenses::routes())
        .merge(reports::routes())
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// `?from=YYYY-MM-DD&to=YYYY-MM-DD`, both optional and inclusive.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Health check endpoint. 503 when the database does not answer.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "ok", "database": "ok" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "database": "unreachable" })),
        )
    }
}
