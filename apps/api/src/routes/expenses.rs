//! Expense endpoints. `from` / `to` filter on the expense date.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::{ApiError, ApiResult};
use crate::routes::DateRangeQuery;
use crate::AppState;
use apotheca_core::{Expense, NewExpense};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list).post(create))
        .route("/expenses/{id}", get(get_one).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Expense>>> {
    let Query(range) = query?;
    Ok(Json(state.db.expenses().list(range.from, range.to).await?))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewExpense>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Expense>)> {
    let Json(input) = payload?;
    let expense = state.db.expenses().create(&input).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Expense>> {
    state
        .db
        .expenses()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Expense", &id))
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.db.expenses().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
