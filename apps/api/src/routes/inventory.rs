//! Inventory item and batch endpoints.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Days, NaiveDate, Utc};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use apotheca_core::{Batch, BatchInput, InventoryItem, InventoryItemInput, LowStockItem};

/// Window used by `/batches/expiring` when no `before` date is given.
const DEFAULT_EXPIRY_WINDOW_DAYS: u64 = 90;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/low-stock", get(low_stock))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/items/{id}/batches", get(list_batches).post(create_batch))
        .route("/batches/expiring", get(expiring))
        .route(
            "/batches/{id}",
            get(get_batch).put(update_batch).delete(delete_batch),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpiringQuery {
    pub before: Option<NaiveDate>,
}

// =============================================================================
// Items
// =============================================================================

async fn list_items(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<InventoryItem>>> {
    let Query(query) = query?;
    let items = state.db.inventory().list_items(query.q.as_deref()).await?;
    Ok(Json(items))
}

async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<InventoryItemInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<InventoryItem>)> {
    let Json(input) = payload?;
    let item = state.db.inventory().create_item(&input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<InventoryItem>> {
    state
        .db
        .inventory()
        .get_item(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Inventory item", &id))
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<InventoryItemInput>, JsonRejection>,
) -> ApiResult<Json<InventoryItem>> {
    let Json(input) = payload?;
    let item = state.db.inventory().update_item(&id, &input).await?;
    Ok(Json(item))
}

/// Soft delete.
async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.inventory().deactivate_item(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn low_stock(State(state): State<AppState>) -> ApiResult<Json<Vec<LowStockItem>>> {
    Ok(Json(state.db.inventory().low_stock().await?))
}

// =============================================================================
// Batches
// =============================================================================

async fn list_batches(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> ApiResult<Json<Vec<Batch>>> {
    Ok(Json(state.db.inventory().list_batches(&item_id).await?))
}

async fn create_batch(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    payload: Result<Json<BatchInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Batch>)> {
    let Json(input) = payload?;
    let batch = state.db.inventory().create_batch(&item_id, &input).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Batch>> {
    state
        .db
        .inventory()
        .get_batch(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Batch", &id))
}

async fn update_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<BatchInput>, JsonRejection>,
) -> ApiResult<Json<Batch>> {
    let Json(input) = payload?;
    Ok(Json(state.db.inventory().update_batch(&id, &input).await?))
}

async fn delete_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.inventory().delete_batch(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn expiring(
    State(state): State<AppState>,
    query: Result<Query<ExpiringQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Batch>>> {
    let Query(query) = query?;

    let before = match query.before {
        Some(date) => date,
        None => {
            let today = Utc::now().date_naive();
            today
                .checked_add_days(Days::new(DEFAULT_EXPIRY_WINDOW_DAYS))
                .unwrap_or(today)
        }
    };

    Ok(Json(state.db.inventory().expiring(before).await?))
}
