//! # Purchase Repository
//!
//! Stock receipts from suppliers. The mirror image of a sale: lines add
//! base units to batches and a bank deposit payment debits the account.
//!
//! ## Batch Resolution
//! ```text
//! line (item PARA-500, batch "B-17", 12 strips)
//!      │
//!      ▼
//! batches WHERE item_id = PARA-500 AND batch_number = "B-17"
//!      │
//!      ├── found   → quantity += 12 × 10, prices and expiry refreshed
//!      └── missing → new batch with quantity 120
//! ```
//!
//! Deleting a purchase takes the received units back out with the same
//! conditional update a sale uses, so a purchase whose stock has already
//! been sold cannot be deleted.

use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::{bank, begin_write, created_at_bounds, ensure_exists, stock};
use apotheca_core::inputs::clean;
use apotheca_core::{
    Batch, Money, NewPurchase, NewPurchaseLine, Purchase, PurchaseDetail, PurchaseItem,
    ValidationError,
};

#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Receives stock in one transaction.
    pub async fn create(&self, input: &NewPurchase) -> DbResult<PurchaseDetail> {
        input.validate()?;

        let mut tx = begin_write(&self.pool).await?;

        ensure_exists(&mut tx, "suppliers", "Supplier", &input.supplier_id).await?;
        let bank_account_id = input.bank_account();
        if let Some(account_id) = bank_account_id {
            ensure_exists(&mut tx, "bank_accounts", "Bank account", account_id).await?;
        }

        let purchase_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut items = Vec::with_capacity(input.items.len());
        let mut total = Money::zero();

        for line in &input.items {
            let item = stock::fetch_item(&mut tx, &line.item_id).await?;
            let base_units = line.unit_quantity * item.packaging().factor();

            let batch = receive_into_batch(&mut tx, line, base_units).await?;

            let line_total = Money::from_cents(line.cost_price_cents)
                .multiply_quantity(line.unit_quantity)
                .ok_or_else(|| ValidationError::overflow("line_total"))?;
            total = total
                .checked_add(line_total)
                .ok_or_else(|| ValidationError::overflow("total"))?;

            items.push(PurchaseItem {
                id: Uuid::new_v4().to_string(),
                purchase_id: purchase_id.clone(),
                item_id: item.id,
                batch_id: batch.id,
                batch_number: batch.batch_number,
                unit_quantity: line.unit_quantity,
                base_units,
                cost_price_cents: line.cost_price_cents,
                sell_price_cents: line.sell_price_cents,
                expiry_date: line.expiry_date,
                line_total_cents: line_total.cents(),
            });
        }

        let purchase = Purchase {
            id: purchase_id,
            supplier_id: input.supplier_id.clone(),
            reference: clean(&input.reference),
            payment_method: input.payment_method,
            bank_account_id: bank_account_id.map(str::to_string),
            total_cents: total.cents(),
            notes: clean(&input.notes),
            created_at: now,
        };

        insert_purchase(&mut tx, &purchase).await?;
        for (line_no, item) in items.iter().enumerate() {
            insert_purchase_item(&mut tx, item, line_no as i64 + 1).await?;
        }

        if let Some(account_id) = bank_account_id {
            bank::adjust_balance(&mut tx, account_id, -total.cents()).await?;
        }

        tx.commit().await?;

        info!(
            id = %purchase.id,
            supplier_id = %purchase.supplier_id,
            total_cents = purchase.total_cents,
            lines = items.len(),
            "Purchase received"
        );

        Ok(PurchaseDetail { purchase, items })
    }

    /// Deletes a purchase, removing its units from the batches and
    /// re-crediting a bank deposit payment.
    ///
    /// Fails with `InsufficientStock` when any batch no longer holds the
    /// units this purchase added.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = begin_write(&self.pool).await?;

        let purchase = fetch_purchase(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Purchase", id))?;
        let items = fetch_purchase_items(&mut tx, id).await?;

        for line in &items {
            let item = stock::fetch_item(&mut tx, &line.item_id).await?;
            stock::take_from_batch(&mut tx, &line.batch_id, &item.name, line.base_units).await?;
        }

        if purchase.payment_method.uses_bank_account() {
            match &purchase.bank_account_id {
                Some(account_id) => {
                    bank::adjust_balance(&mut tx, account_id, purchase.total_cents).await?
                }
                None => warn!(id = %id, "Bank deposit purchase without bank account"),
            }
        }

        sqlx::query("DELETE FROM purchases WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id = %id, lines = items.len(), "Purchase deleted and stock removed");
        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PurchaseDetail>> {
        let mut conn = self.pool.acquire().await?;

        let Some(purchase) = fetch_purchase(&mut conn, id).await? else {
            return Ok(None);
        };
        let items = fetch_purchase_items(&mut conn, id).await?;

        Ok(Some(PurchaseDetail { purchase, items }))
    }

    /// Lists purchases by calendar day range, newest first.
    pub async fn list(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> DbResult<Vec<Purchase>> {
        let (lower, upper) = created_at_bounds(from, to)?;

        let purchases = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT * FROM purchases
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at DESC
            "#,
        )
        .bind(lower)
        .bind(upper)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }
}

// =============================================================================
// Transaction Steps
// =============================================================================

/// Tops up the line's batch, creating it on first receipt.
async fn receive_into_batch(
    conn: &mut SqliteConnection,
    line: &NewPurchaseLine,
    base_units: i64,
) -> DbResult<Batch> {
    let batch_number = line.batch_number.trim();
    let now = Utc::now();

    let existing = sqlx::query_as::<_, Batch>(
        "SELECT * FROM batches WHERE item_id = ?1 AND batch_number = ?2",
    )
    .bind(&line.item_id)
    .bind(batch_number)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(batch) = existing {
        debug!(batch_id = %batch.id, base_units, "Topping up batch");

        sqlx::query(
            r#"
            UPDATE batches SET
                quantity = quantity + ?2,
                cost_price_cents = ?3,
                sell_price_cents = ?4,
                expiry_date = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&batch.id)
        .bind(base_units)
        .bind(line.cost_price_cents)
        .bind(line.sell_price_cents)
        .bind(line.expiry_date)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        return stock::fetch_batch(conn, &batch.id).await;
    }

    let batch = Batch {
        id: Uuid::new_v4().to_string(),
        item_id: line.item_id.clone(),
        batch_number: batch_number.to_string(),
        quantity: base_units,
        cost_price_cents: line.cost_price_cents,
        sell_price_cents: line.sell_price_cents,
        expiry_date: line.expiry_date,
        created_at: now,
        updated_at: now,
    };

    debug!(batch_id = %batch.id, batch_number = %batch.batch_number, "Creating batch from purchase");

    sqlx::query(
        r#"
        INSERT INTO batches (
            id, item_id, batch_number, quantity,
            cost_price_cents, sell_price_cents, expiry_date,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&batch.id)
    .bind(&batch.item_id)
    .bind(&batch.batch_number)
    .bind(batch.quantity)
    .bind(batch.cost_price_cents)
    .bind(batch.sell_price_cents)
    .bind(batch.expiry_date)
    .bind(batch.created_at)
    .bind(batch.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(batch)
}

async fn fetch_purchase(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Purchase>> {
    let purchase = sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(purchase)
}

async fn fetch_purchase_items(
    conn: &mut SqliteConnection,
    purchase_id: &str,
) -> DbResult<Vec<PurchaseItem>> {
    let items = sqlx::query_as::<_, PurchaseItem>(
        "SELECT * FROM purchase_items WHERE purchase_id = ?1 ORDER BY line_no",
    )
    .bind(purchase_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

async fn insert_purchase(conn: &mut SqliteConnection, purchase: &Purchase) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO purchases (
            id, supplier_id, reference, payment_method, bank_account_id,
            total_cents, notes, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&purchase.id)
    .bind(&purchase.supplier_id)
    .bind(&purchase.reference)
    .bind(purchase.payment_method)
    .bind(&purchase.bank_account_id)
    .bind(purchase.total_cents)
    .bind(&purchase.notes)
    .bind(purchase.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn insert_purchase_item(
    conn: &mut SqliteConnection,
    item: &PurchaseItem,
    line_no: i64,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO purchase_items (
            id, purchase_id, item_id, batch_id, line_no, batch_number,
            unit_quantity, base_units, cost_price_cents, sell_price_cents,
            expiry_date, line_total_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&item.id)
    .bind(&item.purchase_id)
    .bind(&item.item_id)
    .bind(&item.batch_id)
    .bind(line_no)
    .bind(&item.batch_number)
    .bind(item.unit_quantity)
    .bind(item.base_units)
    .bind(item.cost_price_cents)
    .bind(item.sell_price_cents)
    .bind(item.expiry_date)
    .bind(item.line_total_cents)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{
        balance, bank_account, batch_quantity, item_input, item_with_batch, supplier, test_db,
    };
    use apotheca_core::{CoreError, NewSale, NewSaleLine, PaymentMethod};

    fn purchase_line(item_id: &str, batch_number: &str, units: i64) -> NewPurchaseLine {
        NewPurchaseLine {
            item_id: item_id.to_string(),
            batch_number: batch_number.to_string(),
            unit_quantity: units,
            cost_price_cents: 180,
            sell_price_cents: 260,
            expiry_date: NaiveDate::from_ymd_opt(2031, 6, 30).unwrap(),
        }
    }

    fn purchase(supplier_id: &str, items: Vec<NewPurchaseLine>) -> NewPurchase {
        NewPurchase {
            supplier_id: supplier_id.to_string(),
            reference: Some("DN-1001".to_string()),
            payment_method: PaymentMethod::Cash,
            bank_account_id: None,
            notes: None,
            items,
        }
    }

    #[tokio::test]
    async fn test_purchase_creates_new_batch_in_base_units() {
        let db = test_db().await;
        let s = supplier(&db).await;
        let item = db
            .inventory()
            .create_item(&item_input("PARA-500", Some(10)))
            .await
            .unwrap();

        let detail = db
            .purchases()
            .create(&purchase(&s.id, vec![purchase_line(&item.id, "NEW-1", 12)]))
            .await
            .unwrap();

        assert_eq!(detail.items[0].base_units, 120);
        assert_eq!(detail.purchase.total_cents, 12 * 180);
        assert_eq!(batch_quantity(&db, &detail.items[0].batch_id).await, 120);
    }

    #[tokio::test]
    async fn test_purchase_tops_up_existing_batch_and_refreshes_prices() {
        let db = test_db().await;
        let s = supplier(&db).await;
        let (item, batch) = item_with_batch(&db, "AMOX-250", None, 7).await;

        let detail = db
            .purchases()
            .create(&purchase(
                &s.id,
                vec![purchase_line(&item.id, &batch.batch_number, 5)],
            ))
            .await
            .unwrap();

        assert_eq!(detail.items[0].batch_id, batch.id);
        let refreshed = db.inventory().get_batch(&batch.id).await.unwrap().unwrap();
        assert_eq!(refreshed.quantity, 12);
        assert_eq!(refreshed.sell_price_cents, 260);
    }

    #[tokio::test]
    async fn test_bank_deposit_purchase_debits_and_delete_recredits() {
        let db = test_db().await;
        let s = supplier(&db).await;
        let (item, batch) = item_with_batch(&db, "A-1", None, 0).await;
        let account = bank_account(&db, 10_000).await;

        let mut p = purchase(&s.id, vec![purchase_line(&item.id, &batch.batch_number, 10)]);
        p.payment_method = PaymentMethod::BankDeposit;
        p.bank_account_id = Some(account.id.clone());

        let detail = db.purchases().create(&p).await.unwrap();
        assert_eq!(balance(&db, &account.id).await, 10_000 - 1_800);
        assert_eq!(batch_quantity(&db, &batch.id).await, 10);

        db.purchases().delete(&detail.purchase.id).await.unwrap();
        assert_eq!(balance(&db, &account.id).await, 10_000);
        assert_eq!(batch_quantity(&db, &batch.id).await, 0);
    }

    #[tokio::test]
    async fn test_delete_after_partial_sale_is_rejected() {
        let db = test_db().await;
        let s = supplier(&db).await;
        let (item, batch) = item_with_batch(&db, "A-1", None, 0).await;
        let account = bank_account(&db, 5_000).await;

        let mut p = purchase(&s.id, vec![purchase_line(&item.id, &batch.batch_number, 10)]);
        p.payment_method = PaymentMethod::BankDeposit;
        p.bank_account_id = Some(account.id.clone());
        let detail = db.purchases().create(&p).await.unwrap();

        db.sales()
            .create(&NewSale {
                customer_id: None,
                payment_method: PaymentMethod::Cash,
                bank_account_id: None,
                discount_cents: 0,
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

        let balance_before = balance(&db, &account.id).await;
        let err = db.purchases().delete(&detail.purchase.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock {
                available: 6,
                requested: 10,
                ..
            })
        ));

        assert_eq!(batch_quantity(&db, &batch.id).await, 6);
        assert_eq!(balance(&db, &account.id).await, balance_before);
        assert!(db
            .purchases()
            .get_by_id(&detail.purchase.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_missing_supplier_or_item_aborts() {
        let db = test_db().await;
        let s = supplier(&db).await;
        let (item, batch) = item_with_batch(&db, "A-1", None, 3).await;
        let ghost = Uuid::new_v4().to_string();

        let err = db
            .purchases()
            .create(&purchase(&ghost, vec![purchase_line(&item.id, "X-1", 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        // The first line's batch must not survive a failure on the second.
        let err = db
            .purchases()
            .create(&purchase(
                &s.id,
                vec![
                    purchase_line(&item.id, &batch.batch_number, 2),
                    purchase_line(&ghost, "X-2", 1),
                ],
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(batch_quantity(&db, &batch.id).await, 3);
    }

    #[tokio::test]
    async fn test_supplier_with_purchases_cannot_be_deleted() {
        let db = test_db().await;
        let s = supplier(&db).await;
        let (item, _) = item_with_batch(&db, "A-1", None, 0).await;

        db.purchases()
            .create(&purchase(&s.id, vec![purchase_line(&item.id, "L-9", 1)]))
            .await
            .unwrap();

        let err = db.suppliers().delete(&s.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(db.purchases().list(None, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_oversized_cost_price_is_rejected() {
        let db = test_db().await;
        let s = supplier(&db).await;
        let account = bank_account(&db, 50_000).await;
        let item = db
            .inventory()
            .create_item(&item_input("BIG-1", None))
            .await
            .unwrap();

        let mut line = purchase_line(&item.id, "HUGE-1", 2);
        line.cost_price_cents = i64::MAX;
        let mut input = purchase(&s.id, vec![line]);
        input.payment_method = PaymentMethod::BankDeposit;
        input.bank_account_id = Some(account.id.clone());

        let err = db.purchases().create(&input).await.unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        assert_eq!(balance(&db, &account.id).await, 50_000);
        assert!(db.purchases().list(None, None).await.unwrap().is_empty());
        assert!(db.inventory().list_batches(&item.id).await.unwrap().is_empty());
    }
}
