//! # Stock Movements
//!
//! Batch quantity changes shared by the sale and purchase transactions.
//! Every function here takes the transaction's connection; none of them
//! touch the pool.
//!
//! ## Non-negative Stock
//! ```text
//! UPDATE batches SET quantity = quantity - :units
//! WHERE id = :batch AND quantity >= :units
//!        │
//!        ├── 1 row  → taken
//!        └── 0 rows → re-read quantity → InsufficientStock
//! ```
//! The `CHECK (quantity >= 0)` constraint backs this up for any other writer.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::warn;

use crate::error::{DbError, DbResult};
use apotheca_core::{Batch, CoreError, InventoryItem};

pub(crate) async fn fetch_item(conn: &mut SqliteConnection, id: &str) -> DbResult<InventoryItem> {
    sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Inventory item", id))
}

pub(crate) async fn fetch_batch(conn: &mut SqliteConnection, id: &str) -> DbResult<Batch> {
    sqlx::query_as::<_, Batch>("SELECT * FROM batches WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Batch", id))
}

/// Removes `units` base units from a batch, or fails with
/// [`CoreError::InsufficientStock`] leaving the batch untouched.
///
/// `item_label` only feeds the error message.
pub(crate) async fn take_from_batch(
    conn: &mut SqliteConnection,
    batch_id: &str,
    item_label: &str,
    units: i64,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE batches SET
            quantity = quantity - ?2,
            updated_at = ?3
        WHERE id = ?1 AND quantity >= ?2
        "#,
    )
    .bind(batch_id)
    .bind(units)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(());
    }

    // Either the batch vanished or it is short; report which.
    let batch = fetch_batch(conn, batch_id).await?;

    warn!(
        batch_id = %batch_id,
        available = batch.quantity,
        requested = units,
        "Insufficient stock"
    );

    Err(CoreError::InsufficientStock {
        item: item_label.to_string(),
        batch: batch.batch_number,
        available: batch.quantity,
        requested: units,
    }
    .into())
}

/// Adds `units` base units back to a batch.
pub(crate) async fn return_to_batch(
    conn: &mut SqliteConnection,
    batch_id: &str,
    units: i64,
) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE batches SET quantity = quantity + ?2, updated_at = ?3 WHERE id = ?1",
    )
    .bind(batch_id)
    .bind(units)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Batch", batch_id));
    }

    Ok(())
}
