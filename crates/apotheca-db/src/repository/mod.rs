//! # Repository Module
//!
//! Database repository implementations for Apotheca POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  axum handler                                                           │
//! │       │                                                                 │
//! │       │  db.sales().create(&new_sale)                                   │
//! │       ▼                                                                 │
//! │  SaleRepository ──────────┐                                             │
//! │  PurchaseRepository ──────┼──► stock.rs   (batch take / return)         │
//! │  ExpenseRepository ───────┼──► bank.rs    (balance adjust)              │
//! │                           │                                             │
//! │       │  one sqlx::Transaction per mutation                             │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`InventoryRepository`](inventory::InventoryRepository) - Items, batches, stock reports
//! - [`CustomerRepository`](party::CustomerRepository) / [`SupplierRepository`](party::SupplierRepository)
//! - [`BankAccountRepository`](bank::BankAccountRepository) - Accounts and balance moves
//! - [`SaleRepository`](sale::SaleRepository) - Transactional sale create / delete
//! - [`PurchaseRepository`](purchase::PurchaseRepository) - Transactional stock receipt
//! - [`ExpenseRepository`](expense::ExpenseRepository)
//! - [`ReportRepository`](report::ReportRepository) - Financial summary

use chrono::NaiveDate;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::error::{DbError, DbResult};
use apotheca_core::ValidationError;

pub mod bank;
pub mod expense;
pub mod inventory;
pub mod party;
pub mod purchase;
pub mod report;
pub mod sale;
pub(crate) mod stock;

#[cfg(test)]
pub(crate) mod test_support;

/// Opens a transaction that holds the write lock from its first statement.
///
/// Stock and balance mutations read before they write. Under a deferred
/// `BEGIN` the first write fails with `SQLITE_BUSY` once another writer has
/// committed; `BEGIN IMMEDIATE` makes writers wait up to `busy_timeout`.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

/// Fails with `NotFound` unless `table` has a row with this id.
///
/// `table` is always a literal from this crate.
pub(crate) async fn ensure_exists(
    conn: &mut SqliteConnection,
    table: &'static str,
    entity: &'static str,
    id: &str,
) -> DbResult<()> {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE id = ?1");
    let count: i64 = sqlx::query_scalar(&sql).bind(id).fetch_one(&mut *conn).await?;

    if count == 0 {
        return Err(DbError::not_found(entity, id));
    }
    Ok(())
}

/// Text bounds for filtering RFC 3339 `created_at` columns by calendar day.
///
/// Returns the half-open range `[from, to + 1 day)`. Both ends are
/// optional; a missing end leaves that side unbounded.
pub(crate) fn created_at_bounds(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> DbResult<(String, String)> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(ValidationError::invalid("from", "must not be after 'to'").into());
        }
    }

    let lower = from
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "0000-01-01".to_string());
    let upper = to
        .and_then(|d| d.succ_opt())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "9999-12-31T23:59:59".to_string());

    Ok((lower, upper))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_at_bounds_are_half_open() {
        let from = NaiveDate::from_ymd_opt(2026, 3, 1);
        let to = NaiveDate::from_ymd_opt(2026, 3, 31);
        let (lower, upper) = created_at_bounds(from, to).unwrap();

        assert_eq!(lower, "2026-03-01");
        assert_eq!(upper, "2026-04-01");
        assert!("2026-03-31T23:59:59.999+00:00" < upper.as_str());
        assert!("2026-03-01T00:00:00+00:00" >= lower.as_str());
    }

    #[test]
    fn test_created_at_bounds_rejects_inverted_range() {
        let from = NaiveDate::from_ymd_opt(2026, 3, 2);
        let to = NaiveDate::from_ymd_opt(2026, 3, 1);
        assert!(created_at_bounds(from, to).is_err());
    }
}
