//! Bank account endpoints. Balances are read-only here; they move only
//! through sales, purchases and expenses.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use apotheca_core::{BankAccount, BankAccountInput};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bank-accounts", get(list).post(create))
        .route("/bank-accounts/{id}", get(get_one).put(update).delete(remove))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<BankAccount>>> {
    Ok(Json(state.db.bank_accounts().list().await?))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<BankAccountInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BankAccount>)> {
    let Json(input) = payload?;
    let account = state.db.bank_accounts().create(&input).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<BankAccount>> {
    state
        .db
        .bank_accounts()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Bank account", &id))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<BankAccountInput>, JsonRejection>,
) -> ApiResult<Json<BankAccount>> {
    let Json(input) = payload?;
    Ok(Json(state.db.bank_accounts().update(&id, &input).await?))
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.db.bank_accounts().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
