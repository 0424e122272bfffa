//! Sale endpoints.
//!
//! `POST /api/sales` and `DELETE /api/sales/{id}` each run as one database
//! transaction in apotheca-db; a failed request changes nothing.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::{ApiError, ApiResult};
use crate::routes::DateRangeQuery;
use crate::AppState;
use apotheca_core::{NewSale, Sale, SaleDetail};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list).post(create))
        .route("/sales/{id}", get(get_one).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Sale>>> {
    let Query(range) = query?;
    Ok(Json(state.db.sales().list(range.from, range.to).await?))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewSale>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SaleDetail>)> {
    let Json(input) = payload?;
    let detail = state.db.sales().create(&input).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SaleDetail>> {
    state
        .db
        .sales()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Sale", &id))
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.db.sales().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
