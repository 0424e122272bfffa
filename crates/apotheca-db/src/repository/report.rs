//! # Report Repository
//!
//! Profit and loss over a date range, computed with plain SQL sums.
//!
//! ```text
//! revenue        = Σ sales.total_cents        (after discounts)
//! cost of goods  = Σ sales.cost_cents
//! gross profit   = revenue - cost of goods
//! net profit     = gross profit - Σ expenses.amount_cents
//! ```
//! Purchases are reported alongside but do not enter profit: their cost is
//! recognised through cost of goods when the stock sells.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::created_at_bounds;
use apotheca_core::{FinancialSummary, Money};

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Summary for the inclusive day range `[from, to]` (UTC days).
    pub async fn financial_summary(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<FinancialSummary> {
        let (lower, upper) = created_at_bounds(Some(from), Some(to))?;

        debug!(%from, %to, "Computing financial summary");

        let (sale_count, revenue, discount, cost): (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(total_cents), 0),
                COALESCE(SUM(discount_cents), 0),
                COALESCE(SUM(cost_cents), 0)
            FROM sales
            WHERE created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(&lower)
        .bind(&upper)
        .fetch_one(&self.pool)
        .await?;

        let purchases: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_cents), 0) FROM purchases
            WHERE created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(&lower)
        .bind(&upper)
        .fetch_one(&self.pool)
        .await?;

        let expenses: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0) FROM expenses
            WHERE expense_date >= ?1 AND expense_date <= ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(FinancialSummary::from_totals(
            from,
            to,
            sale_count,
            Money::from_cents(revenue),
            Money::from_cents(discount),
            Money::from_cents(cost),
            Money::from_cents(purchases),
            Money::from_cents(expenses),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::test_support::{item_with_batch, test_db};
    use apotheca_core::{NewExpense, NewSale, NewSaleLine, PaymentMethod};
    use chrono::Utc;

    #[tokio::test]
    async fn test_summary_combines_sales_and_expenses() {
        let db = test_db().await;
        let today = Utc::now().date_naive();
        let (item, batch) = item_with_batch(&db, "A-1", None, 10).await;

        // 4 units at $2.50, cost $1.50, $1.00 discount
        db.sales()
            .create(&NewSale {
                customer_id: None,
                payment_method: PaymentMethod::Cash,
                bank_account_id: None,
                discount_cents: 100,
                notes: None,
                items: vec![NewSaleLine {
                    item_id: item.id.clone(),
                    batch_id: batch.id.clone(),
                    unit_quantity: 4,
                    sub_unit_quantity: 0,
                    unit_price_cents: None,
                }],
            })
            .await
            .unwrap();

        db.expenses()
            .create(&NewExpense {
                category: "rent".to_string(),
                description: None,
                amount_cents: 250,
                payment_method: PaymentMethod::Cash,
                bank_account_id: None,
                expense_date: Some(today),
            })
            .await
            .unwrap();

        let summary = db.reports().financial_summary(today, today).await.unwrap();

        assert_eq!(summary.sale_count, 1);
        assert_eq!(summary.revenue_cents, 900);
        assert_eq!(summary.discount_cents, 100);
        assert_eq!(summary.cost_of_goods_cents, 600);
        assert_eq!(summary.gross_profit_cents, 300);
        assert_eq!(summary.expenses_cents, 250);
        assert_eq!(summary.net_profit_cents, 50);
    }

    #[tokio::test]
    async fn test_empty_range_is_all_zero() {
        let db = test_db().await;
        let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

        let summary = db.reports().financial_summary(day, day).await.unwrap();
        assert_eq!(summary.sale_count, 0);
        assert_eq!(summary.net_profit_cents, 0);
    }

    #[tokio::test]
    async fn test_inverted_range_rejected() {
        let db = test_db().await;
        let err = db
            .reports()
            .financial_summary(
                NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(_)));
    }
}
