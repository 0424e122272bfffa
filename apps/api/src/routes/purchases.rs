//! Purchase (stock receipt) endpoints.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::{ApiError, ApiResult};
use crate::routes::DateRangeQuery;
use crate::AppState;
use apotheca_core::{NewPurchase, Purchase, PurchaseDetail};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/purchases", get(list).post(create))
        .route("/purchases/{id}", get(get_one).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Purchase>>> {
    let Query(range) = query?;
    Ok(Json(state.db.purchases().list(range.from, range.to).await?))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewPurchase>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PurchaseDetail>)> {
    let Json(input) = payload?;
    let detail = state.db.purchases().create(&input).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PurchaseDetail>> {
    state
        .db
        .purchases()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Purchase", &id))
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.db.purchases().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
