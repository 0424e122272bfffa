//! # Inventory Repository
//!
//! Inventory items, their batches, and the two stock reports.
//!
//! ## Where Stock Lives
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  inventory_items  PARA-500  "Paracetamol 500mg"  10 tablets / strip     │
//! │       │                                                                 │
//! │       ├── batch B-17   quantity 120 (base units)   expires 2027-03-01   │
//! │       └── batch B-22   quantity  45                expires 2027-09-01   │
//! │                                                                         │
//! │  On hand = SUM(batches.quantity) = 165 tablets = 16 strips + 5 tablets  │
//! │                                                                         │
//! │  Sales and purchases move batch quantities inside their own             │
//! │  transactions (see sale.rs / purchase.rs); this repository only edits   │
//! │  batch quantities as a manual stock-count correction.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use apotheca_core::inputs::clean;
use apotheca_core::{Batch, BatchInput, InventoryItem, InventoryItemInput, LowStockItem};

/// Repository for items and batches.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.inventory();
///
/// let item = repo.create_item(&input).await?;
/// let batch = repo.create_batch(&item.id, &batch_input).await?;
/// let short = repo.low_stock().await?;
/// ```
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Creates an item. Duplicate codes fail with `UniqueViolation`.
    pub async fn create_item(&self, input: &InventoryItemInput) -> DbResult<InventoryItem> {
        input.validate()?;

        let now = Utc::now();
        let item = InventoryItem {
            id: Uuid::new_v4().to_string(),
            code: input.code.trim().to_string(),
            name: input.name.trim().to_string(),
            item_type: input.item_type,
            unit_name: clean(&input.unit_name),
            sub_unit_name: clean(&input.sub_unit_name),
            units_per_pack: input.units_per_pack,
            min_stock: input.min_stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %item.id, code = %item.code, "Creating inventory item");

        sqlx::query(
            r#"
            INSERT INTO inventory_items (
                id, code, name, item_type,
                unit_name, sub_unit_name, units_per_pack, min_stock,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&item.id)
        .bind(&item.code)
        .bind(&item.name)
        .bind(item.item_type)
        .bind(&item.unit_name)
        .bind(&item.sub_unit_name)
        .bind(item.units_per_pack)
        .bind(item.min_stock)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("code", &item.code))?;

        Ok(item)
    }

    /// Gets an item by ID, including deactivated ones.
    pub async fn get_item(&self, id: &str) -> DbResult<Option<InventoryItem>> {
        let item = sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Lists active items ordered by name.
    ///
    /// `query` filters on a substring of code or name (case-insensitive for
    /// ASCII); blank means no filter.
    pub async fn list_items(&self, query: Option<&str>) -> DbResult<Vec<InventoryItem>> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());

        debug!(query = ?query, "Listing inventory items");

        let items = match query {
            Some(q) => {
                let pattern = format!("%{}%", q);
                sqlx::query_as::<_, InventoryItem>(
                    r#"
                    SELECT * FROM inventory_items
                    WHERE is_active = 1 AND (code LIKE ?1 OR name LIKE ?1)
                    ORDER BY name
                    "#,
                )
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, InventoryItem>(
                    "SELECT * FROM inventory_items WHERE is_active = 1 ORDER BY name",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(items)
    }

    /// Replaces an item's editable fields.
    pub async fn update_item(&self, id: &str, input: &InventoryItemInput) -> DbResult<InventoryItem> {
        input.validate()?;

        let code = input.code.trim();
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE inventory_items SET
                code = ?2,
                name = ?3,
                item_type = ?4,
                unit_name = ?5,
                sub_unit_name = ?6,
                units_per_pack = ?7,
                min_stock = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(code)
        .bind(input.name.trim())
        .bind(input.item_type)
        .bind(clean(&input.unit_name))
        .bind(clean(&input.sub_unit_name))
        .bind(input.units_per_pack)
        .bind(input.min_stock)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("code", code))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Inventory item", id));
        }

        self.get_item(id)
            .await?
            .ok_or_else(|| DbError::not_found("Inventory item", id))
    }

    /// Soft-deletes an item. Its batches and sale history stay intact.
    pub async fn deactivate_item(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE inventory_items SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Inventory item", id));
        }

        info!(id = %id, "Inventory item deactivated");
        Ok(())
    }

    // =========================================================================
    // Batches
    // =========================================================================

    /// Creates a batch under an item with an opening quantity.
    pub async fn create_batch(&self, item_id: &str, input: &BatchInput) -> DbResult<Batch> {
        input.validate()?;

        if self.get_item(item_id).await?.is_none() {
            return Err(DbError::not_found("Inventory item", item_id));
        }

        let now = Utc::now();
        let batch = Batch {
            id: Uuid::new_v4().to_string(),
            item_id: item_id.to_string(),
            batch_number: input.batch_number.trim().to_string(),
            quantity: input.quantity,
            cost_price_cents: input.cost_price_cents,
            sell_price_cents: input.sell_price_cents,
            expiry_date: input.expiry_date,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %batch.id, item_id = %item_id, batch_number = %batch.batch_number, "Creating batch");

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
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("batch_number", &batch.batch_number))?;

        Ok(batch)
    }

    pub async fn get_batch(&self, id: &str) -> DbResult<Option<Batch>> {
        let batch = sqlx::query_as::<_, Batch>("SELECT * FROM batches WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(batch)
    }

    /// Lists an item's batches, earliest expiry first.
    pub async fn list_batches(&self, item_id: &str) -> DbResult<Vec<Batch>> {
        if self.get_item(item_id).await?.is_none() {
            return Err(DbError::not_found("Inventory item", item_id));
        }

        let batches = sqlx::query_as::<_, Batch>(
            "SELECT * FROM batches WHERE item_id = ?1 ORDER BY expiry_date, batch_number",
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(batches)
    }

    /// Updates a batch. `quantity` here is a stock-count correction.
    ///
    /// The count is written as an absolute value, last writer wins: units
    /// sold between reading the batch and saving the correction are
    /// overwritten, not re-applied.
    pub async fn update_batch(&self, id: &str, input: &BatchInput) -> DbResult<Batch> {
        input.validate()?;

        let batch_number = input.batch_number.trim();

        let result = sqlx::query(
            r#"
            UPDATE batches SET
                batch_number = ?2,
                quantity = ?3,
                cost_price_cents = ?4,
                sell_price_cents = ?5,
                expiry_date = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(batch_number)
        .bind(input.quantity)
        .bind(input.cost_price_cents)
        .bind(input.sell_price_cents)
        .bind(input.expiry_date)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("batch_number", batch_number))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Batch", id));
        }

        self.get_batch(id)
            .await?
            .ok_or_else(|| DbError::not_found("Batch", id))
    }

    /// Deletes a batch. Refused with `ForeignKeyViolation` while any sale or
    /// purchase line points at it.
    pub async fn delete_batch(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM batches WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Batch", id));
        }

        info!(id = %id, "Batch deleted");
        Ok(())
    }

    // =========================================================================
    // Stock Reports
    // =========================================================================

    /// Active items whose stock across all batches is below `min_stock`.
    pub async fn low_stock(&self) -> DbResult<Vec<LowStockItem>> {
        let items = sqlx::query_as::<_, LowStockItem>(
            r#"
            SELECT
                i.id AS item_id,
                i.code,
                i.name,
                i.min_stock,
                COALESCE(SUM(b.quantity), 0) AS total_quantity
            FROM inventory_items i
            LEFT JOIN batches b ON b.item_id = i.id
            WHERE i.is_active = 1
            GROUP BY i.id, i.code, i.name, i.min_stock
            HAVING COALESCE(SUM(b.quantity), 0) < i.min_stock
            ORDER BY i.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Batches still holding stock that expire on or before `before`.
    pub async fn expiring(&self, before: NaiveDate) -> DbResult<Vec<Batch>> {
        let batches = sqlx::query_as::<_, Batch>(
            r#"
            SELECT * FROM batches
            WHERE quantity > 0 AND expiry_date <= ?1
            ORDER BY expiry_date, batch_number
            "#,
        )
        .bind(before)
        .fetch_all(&self.pool)
        .await?;

        Ok(batches)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{batch_input, item_input, test_db};
    use apotheca_core::{NewSale, NewSaleLine, PaymentMethod};

    #[tokio::test]
    async fn test_item_crud_and_soft_delete() {
        let db = test_db().await;
        let repo = db.inventory();

        let item = repo.create_item(&item_input("PARA-500", Some(10))).await.unwrap();
        assert!(item.is_active);

        let mut input = item_input("PARA-500", Some(10));
        input.name = "Paracetamol 500mg Tablets".to_string();
        let updated = repo.update_item(&item.id, &input).await.unwrap();
        assert_eq!(updated.name, "Paracetamol 500mg Tablets");

        assert_eq!(repo.list_items(None).await.unwrap().len(), 1);
        repo.deactivate_item(&item.id).await.unwrap();
        assert!(repo.list_items(None).await.unwrap().is_empty());

        // Still fetchable for history.
        let fetched = repo.get_item(&item.id).await.unwrap().unwrap();
        assert!(!fetched.is_active);
    }

    #[tokio::test]
    async fn test_duplicate_item_code() {
        let db = test_db().await;
        let repo = db.inventory();

        repo.create_item(&item_input("AMOX-250", None)).await.unwrap();
        let err = repo.create_item(&item_input("AMOX-250", None)).await.unwrap_err();

        assert_eq!(err.to_string(), "Duplicate code: 'AMOX-250' already exists");
    }

    #[tokio::test]
    async fn test_search_matches_code_and_name() {
        let db = test_db().await;
        let repo = db.inventory();

        repo.create_item(&item_input("PARA-500", Some(10))).await.unwrap();
        repo.create_item(&item_input("IBU-400", Some(10))).await.unwrap();

        let found = repo.list_items(Some("para")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, "PARA-500");

        assert_eq!(repo.list_items(Some("  ")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_batch_number_unique_per_item() {
        let db = test_db().await;
        let repo = db.inventory();

        let a = repo.create_item(&item_input("A-1", None)).await.unwrap();
        let b = repo.create_item(&item_input("B-1", None)).await.unwrap();

        repo.create_batch(&a.id, &batch_input("LOT-1", 10)).await.unwrap();
        // Same number under another item is fine.
        repo.create_batch(&b.id, &batch_input("LOT-1", 10)).await.unwrap();

        let err = repo.create_batch(&a.id, &batch_input("LOT-1", 5)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_batch_for_missing_item() {
        let db = test_db().await;
        let err = db
            .inventory()
            .create_batch(&Uuid::new_v4().to_string(), &batch_input("LOT-1", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_low_stock_sums_batches() {
        let db = test_db().await;
        let repo = db.inventory();

        let mut input = item_input("PARA-500", Some(10));
        input.min_stock = 100;
        let item = repo.create_item(&input).await.unwrap();

        repo.create_batch(&item.id, &batch_input("B-1", 40)).await.unwrap();
        repo.create_batch(&item.id, &batch_input("B-2", 50)).await.unwrap();

        let short = repo.low_stock().await.unwrap();
        assert_eq!(short.len(), 1);
        assert_eq!(short[0].total_quantity, 90);

        repo.create_batch(&item.id, &batch_input("B-3", 10)).await.unwrap();
        assert!(repo.low_stock().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expiring_skips_empty_batches() {
        let db = test_db().await;
        let repo = db.inventory();
        let item = repo.create_item(&item_input("SYR-1", None)).await.unwrap();

        let mut soon = batch_input("SOON", 5);
        soon.expiry_date = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        repo.create_batch(&item.id, &soon).await.unwrap();

        let mut empty = batch_input("EMPTY", 0);
        empty.expiry_date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        repo.create_batch(&item.id, &empty).await.unwrap();

        let mut later = batch_input("LATER", 5);
        later.expiry_date = NaiveDate::from_ymd_opt(2027, 6, 30).unwrap();
        repo.create_batch(&item.id, &later).await.unwrap();

        let expiring = repo
            .expiring(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap())
            .await
            .unwrap();
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].batch_number, "SOON");
    }

    #[tokio::test]
    async fn test_update_and_delete_unreferenced_batch() {
        let db = test_db().await;
        let repo = db.inventory();
        let item = repo.create_item(&item_input("CRM-1", None)).await.unwrap();
        let batch = repo.create_batch(&item.id, &batch_input("C-1", 3)).await.unwrap();

        let mut input = batch_input("C-1", 7);
        input.sell_price_cents = 999;
        let updated = repo.update_batch(&batch.id, &input).await.unwrap();
        assert_eq!(updated.quantity, 7);
        assert_eq!(updated.sell_price_cents, 999);

        repo.delete_batch(&batch.id).await.unwrap();
        assert!(repo.get_batch(&batch.id).await.unwrap().is_none());

        let err = repo.delete_batch(&batch.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_stock_count_correction_overwrites_interleaved_sale() {
        let db = test_db().await;
        let repo = db.inventory();
        let item = repo.create_item(&item_input("CNT-1", None)).await.unwrap();
        let batch = repo.create_batch(&item.id, &batch_input("K-1", 20)).await.unwrap();

        // Counted shelf stock is 18; a sale of 5 lands before the count is saved
        let counted = batch_input("K-1", 18);
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
                    unit_quantity: 5,
                    sub_unit_quantity: 0,
                    unit_price_cents: None,
                }],
            })
            .await
            .unwrap();

        let updated = repo.update_batch(&batch.id, &counted).await.unwrap();
        assert_eq!(updated.quantity, 18);
    }
}
