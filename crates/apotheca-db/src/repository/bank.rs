//! # Bank Account Repository
//!
//! Account records plus the single balance-moving primitive used by the
//! sale, purchase and expense transactions.
//!
//! ## Balance Movements
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Event                               delta on balance_cents             │
//! │  ─────────────────────────────────   ──────────────────────             │
//! │  sale (bank deposit) created         + sale total                       │
//! │  sale (bank deposit) deleted         - sale total                       │
//! │  purchase (bank deposit) created     - purchase total                   │
//! │  purchase (bank deposit) deleted     + purchase total                   │
//! │  expense (bank deposit) created      - amount                           │
//! │  expense (bank deposit) deleted      + amount                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Nothing else writes `balance_cents` after the opening balance.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use apotheca_core::{BankAccount, BankAccountInput};

#[derive(Debug, Clone)]
pub struct BankAccountRepository {
    pool: SqlitePool,
}

impl BankAccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BankAccountRepository { pool }
    }

    /// Opens an account with `opening_balance_cents`.
    pub async fn create(&self, input: &BankAccountInput) -> DbResult<BankAccount> {
        input.validate()?;

        let now = Utc::now();
        let account = BankAccount {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            account_number: input.account_number.trim().to_string(),
            balance_cents: input.opening_balance_cents,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %account.id, "Creating bank account");

        sqlx::query(
            r#"
            INSERT INTO bank_accounts (id, name, account_number, balance_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&account.id)
        .bind(&account.name)
        .bind(&account.account_number)
        .bind(account.balance_cents)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("account_number", &account.account_number))?;

        Ok(account)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<BankAccount>> {
        let account = sqlx::query_as::<_, BankAccount>("SELECT * FROM bank_accounts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    pub async fn list(&self) -> DbResult<Vec<BankAccount>> {
        let accounts = sqlx::query_as::<_, BankAccount>("SELECT * FROM bank_accounts ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(accounts)
    }

    /// Renames / renumbers an account. The balance is left alone.
    pub async fn update(&self, id: &str, input: &BankAccountInput) -> DbResult<BankAccount> {
        input.validate()?;

        let account_number = input.account_number.trim();

        let result = sqlx::query(
            "UPDATE bank_accounts SET name = ?2, account_number = ?3, updated_at = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(account_number)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("account_number", account_number))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Bank account", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Bank account", id))
    }

    /// Deletes an account. Refused while sales, purchases or expenses
    /// reference it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM bank_accounts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Bank account", id));
        }

        info!(id = %id, "Bank account deleted");
        Ok(())
    }
}

/// Moves an account balance by `delta_cents` on the caller's transaction.
///
/// A missing account is `NotFound`, which aborts the enclosing transaction.
pub(crate) async fn adjust_balance(
    conn: &mut SqliteConnection,
    account_id: &str,
    delta_cents: i64,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE bank_accounts SET
            balance_cents = balance_cents + ?2,
            updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(account_id)
    .bind(delta_cents)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Bank account", account_id));
    }

    debug!(account_id = %account_id, delta_cents, "Bank balance adjusted");
    Ok(())
}
