//! Report endpoints.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Datelike, NaiveDate, Utc};

use crate::error::ApiResult;
use crate::routes::DateRangeQuery;
use crate::AppState;
use apotheca_core::FinancialSummary;

pub fn routes() -> Router<AppState> {
    Router::new().route("/reports/summary", get(summary))
}

/// `GET /api/reports/summary?from=&to=`
///
/// Defaults to month-to-date when either bound is missing.
async fn summary(
    State(state): State<AppState>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> ApiResult<Json<FinancialSummary>> {
    let Query(range) = query?;

    let today = Utc::now().date_naive();
    let to = range.to.unwrap_or(today);
    let from = range.from.unwrap_or_else(|| month_start(to));

    Ok(Json(state.db.reports().financial_summary(from, to).await?))
}

fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_start() {
        let day = NaiveDate::from_ymd_opt(2026, 2, 17).unwrap();
        assert_eq!(month_start(day), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
    }
}
