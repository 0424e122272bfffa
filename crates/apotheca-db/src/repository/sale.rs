//! # Sale Repository
//!
//! Sales are created and deleted as single transactions that move batch
//! stock and, for bank deposits, a bank account balance.
//!
//! ## Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       create(NewSale)                                   │
//! │                                                                         │
//! │  validate shape (no I/O)                                                │
//! │       │                                                                 │
//! │  BEGIN ─────────────────────────────────────────────────────────────┐   │
//! │  │  customer exists?  bank account exists?                         │   │
//! │  │                                                                 │   │
//! │  │  for each line, in order:                                       │   │
//! │  │     item ◄── batch   (batch must belong to item)                │   │
//! │  │     base units = units × per_pack + sub-units                   │   │
//! │  │     UPDATE batches ... WHERE quantity >= base units             │   │
//! │  │     price / cost prorated from the per-unit batch prices        │   │
//! │  │                                                                 │   │
//! │  │  total = subtotal - discount                                    │   │
//! │  │  INSERT sales, sale_items                                       │   │
//! │  │  bank deposit → balance += total                                │   │
//! │  COMMIT ◄───────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Any `?` before COMMIT drops the transaction: nothing is written.       │
//! │                                                                         │
//! │                       delete(id)                                        │
//! │  BEGIN → batches += line base units → balance -= total (bank deposit)   │
//! │        → DELETE sales (lines cascade) → COMMIT                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::{bank, begin_write, created_at_bounds, ensure_exists, stock};
use apotheca_core::inputs::clean;
use apotheca_core::{CoreError, Money, NewSale, Sale, SaleDetail, SaleItem, ValidationError};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a sale, deducting stock from each line's batch.
    ///
    /// ## Errors
    /// - `Domain(Validation)` - malformed input, bad quantities
    /// - `Domain(InsufficientStock)` - a batch cannot cover its line
    /// - `Domain(BatchItemMismatch)` - batch belongs to another item
    /// - `Domain(DiscountTooLarge)`
    /// - `NotFound` - item, batch, customer or bank account missing
    ///
    /// On any error the database is left exactly as it was.
    pub async fn create(&self, input: &NewSale) -> DbResult<SaleDetail> {
        input.validate()?;

        let mut tx = begin_write(&self.pool).await?;

        if let Some(customer_id) = &input.customer_id {
            ensure_exists(&mut tx, "customers", "Customer", customer_id).await?;
        }
        let bank_account_id = input.bank_account();
        if let Some(account_id) = bank_account_id {
            ensure_exists(&mut tx, "bank_accounts", "Bank account", account_id).await?;
        }

        let sale_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut items = Vec::with_capacity(input.items.len());
        let mut subtotal = Money::zero();
        let mut cost = Money::zero();

        for line in &input.items {
            let item = stock::fetch_item(&mut tx, &line.item_id).await?;
            let batch = stock::fetch_batch(&mut tx, &line.batch_id).await?;

            if batch.item_id != item.id {
                return Err(CoreError::BatchItemMismatch {
                    batch_id: batch.id,
                    item_id: item.id,
                }
                .into());
            }

            let packaging = item.packaging();
            let base_units =
                packaging.consumed_base_units(line.unit_quantity, line.sub_unit_quantity)?;

            // Lines are applied in order, so a batch repeated on a later line
            // is checked against what the earlier lines left.
            stock::take_from_batch(&mut tx, &batch.id, &item.name, base_units).await?;

            let unit_price = line
                .unit_price_cents
                .map(Money::from_cents)
                .unwrap_or_else(|| batch.sell_price());
            let line_total = packaging.price_for_base_units(unit_price, base_units)?;
            let line_cost = packaging.price_for_base_units(batch.cost_price(), base_units)?;

            subtotal = subtotal
                .checked_add(line_total)
                .ok_or_else(|| ValidationError::overflow("subtotal"))?;
            cost = cost
                .checked_add(line_cost)
                .ok_or_else(|| ValidationError::overflow("cost"))?;

            items.push(SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                item_id: item.id,
                batch_id: batch.id,
                item_name_snapshot: item.name,
                batch_number_snapshot: batch.batch_number,
                unit_quantity: line.unit_quantity,
                sub_unit_quantity: line.sub_unit_quantity,
                base_units,
                unit_price_cents: unit_price.cents(),
                line_total_cents: line_total.cents(),
                line_cost_cents: line_cost.cents(),
            });
        }

        let discount = Money::from_cents(input.discount_cents);
        if discount > subtotal {
            return Err(CoreError::DiscountTooLarge {
                discount: discount.cents(),
                subtotal: subtotal.cents(),
            }
            .into());
        }
        let total = subtotal - discount;

        let sale = Sale {
            id: sale_id,
            invoice_number: next_invoice_number(&mut tx, now).await?,
            customer_id: input.customer_id.clone(),
            payment_method: input.payment_method,
            bank_account_id: bank_account_id.map(str::to_string),
            subtotal_cents: subtotal.cents(),
            discount_cents: discount.cents(),
            total_cents: total.cents(),
            cost_cents: cost.cents(),
            notes: clean(&input.notes),
            created_at: now,
        };

        debug!(id = %sale.id, invoice_number = %sale.invoice_number, lines = items.len(), "Inserting sale");

        insert_sale(&mut tx, &sale).await?;
        for (line_no, item) in items.iter().enumerate() {
            insert_sale_item(&mut tx, item, line_no as i64 + 1).await?;
        }

        if let Some(account_id) = bank_account_id {
            bank::adjust_balance(&mut tx, account_id, total.cents()).await?;
        }

        tx.commit().await?;

        info!(
            id = %sale.id,
            invoice_number = %sale.invoice_number,
            total_cents = sale.total_cents,
            payment_method = ?sale.payment_method,
            "Sale recorded"
        );

        Ok(SaleDetail { sale, items })
    }

    /// Deletes a sale, returning its stock to the batches it came from and
    /// reversing any bank deposit.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = begin_write(&self.pool).await?;

        let sale = fetch_sale(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;
        let items = fetch_sale_items(&mut tx, id).await?;

        for item in &items {
            stock::return_to_batch(&mut tx, &item.batch_id, item.base_units).await?;
        }

        if sale.payment_method.uses_bank_account() {
            match &sale.bank_account_id {
                Some(account_id) => {
                    bank::adjust_balance(&mut tx, account_id, -sale.total_cents).await?
                }
                None => warn!(id = %id, "Bank deposit sale without bank account"),
            }
        }

        sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            id = %id,
            invoice_number = %sale.invoice_number,
            lines = items.len(),
            "Sale deleted and stock restored"
        );
        Ok(())
    }

    /// Gets a sale with its lines.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleDetail>> {
        let mut conn = self.pool.acquire().await?;

        let Some(sale) = fetch_sale(&mut conn, id).await? else {
            return Ok(None);
        };
        let items = fetch_sale_items(&mut conn, id).await?;

        Ok(Some(SaleDetail { sale, items }))
    }

    /// Lists sales created between `from` and `to` (inclusive calendar days,
    /// UTC), newest first.
    pub async fn list(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> DbResult<Vec<Sale>> {
        let (lower, upper) = created_at_bounds(from, to)?;

        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT * FROM sales
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at DESC
            "#,
        )
        .bind(lower)
        .bind(upper)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }
}

// =============================================================================
// Transaction Steps
// =============================================================================

async fn fetch_sale(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
    let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(sale)
}

async fn fetch_sale_items(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<Vec<SaleItem>> {
    let items = sqlx::query_as::<_, SaleItem>(
        "SELECT * FROM sale_items WHERE sale_id = ?1 ORDER BY line_no",
    )
    .bind(sale_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales (
            id, invoice_number, customer_id, payment_method, bank_account_id,
            subtotal_cents, discount_cents, total_cents, cost_cents,
            notes, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.invoice_number)
    .bind(&sale.customer_id)
    .bind(sale.payment_method)
    .bind(&sale.bank_account_id)
    .bind(sale.subtotal_cents)
    .bind(sale.discount_cents)
    .bind(sale.total_cents)
    .bind(sale.cost_cents)
    .bind(&sale.notes)
    .bind(sale.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn insert_sale_item(conn: &mut SqliteConnection, item: &SaleItem, line_no: i64) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, item_id, batch_id, line_no,
            item_name_snapshot, batch_number_snapshot,
            unit_quantity, sub_unit_quantity, base_units,
            unit_price_cents, line_total_cents, line_cost_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(&item.item_id)
    .bind(&item.batch_id)
    .bind(line_no)
    .bind(&item.item_name_snapshot)
    .bind(&item.batch_number_snapshot)
    .bind(item.unit_quantity)
    .bind(item.sub_unit_quantity)
    .bind(item.base_units)
    .bind(item.unit_price_cents)
    .bind(item.line_total_cents)
    .bind(item.line_cost_cents)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Next invoice number for the day of `now`, counted on the caller's
/// transaction so the number and the sale commit together.
async fn next_invoice_number(conn: &mut SqliteConnection, now: DateTime<Utc>) -> DbResult<String> {
    let day = now.date_naive();
    let prefix = format!("INV-{}-", day.format("%Y%m%d"));

    // "INV-YYYYMMDD-" is 13 characters; the sequence starts at 14.
    let last: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT MAX(CAST(substr(invoice_number, 14) AS INTEGER))
        FROM sales
        WHERE invoice_number LIKE ?1 || '%'
        "#,
    )
    .bind(&prefix)
    .fetch_one(&mut *conn)
    .await?;

    Ok(format_invoice_number(day, last.unwrap_or(0) + 1))
}

/// Formats an invoice number: `INV-YYYYMMDD-NNNN`.
///
/// ## Example
/// `INV-20260131-0007`
fn format_invoice_number(day: NaiveDate, sequence: i64) -> String {
    format!("INV-{}-{:04}", day.format("%Y%m%d"), sequence)
}

// =============================================================================
// Unit Tests
// =============================================================================
