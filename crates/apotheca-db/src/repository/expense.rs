//! # Expense Repository
//!
//! Operating costs (rent, salaries, utilities). Bank deposit expenses debit
//! the chosen account in the same transaction as the insert; deletion
//! credits it back.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::{bank, begin_write, ensure_exists};
use apotheca_core::inputs::clean;
use apotheca_core::{Expense, NewExpense, ValidationError};

#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    pub async fn create(&self, input: &NewExpense) -> DbResult<Expense> {
        input.validate()?;

        let now = Utc::now();
        let bank_account_id = input.bank_account();

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            category: input.category.trim().to_string(),
            description: clean(&input.description),
            amount_cents: input.amount_cents,
            payment_method: input.payment_method,
            bank_account_id: bank_account_id.map(str::to_string),
            expense_date: input.expense_date.unwrap_or_else(|| now.date_naive()),
            created_at: now,
        };

        let mut tx = begin_write(&self.pool).await?;

        if let Some(account_id) = bank_account_id {
            ensure_exists(&mut tx, "bank_accounts", "Bank account", account_id).await?;
        }

        debug!(id = %expense.id, category = %expense.category, "Inserting expense");

        sqlx::query(
            r#"
            INSERT INTO expenses (
                id, category, description, amount_cents,
                payment_method, bank_account_id, expense_date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.category)
        .bind(&expense.description)
        .bind(expense.amount_cents)
        .bind(expense.payment_method)
        .bind(&expense.bank_account_id)
        .bind(expense.expense_date)
        .bind(expense.created_at)
        .execute(&mut *tx)
        .await?;

        if let Some(account_id) = bank_account_id {
            bank::adjust_balance(&mut tx, account_id, -expense.amount_cents).await?;
        }

        tx.commit().await?;

        info!(id = %expense.id, amount_cents = expense.amount_cents, "Expense recorded");
        Ok(expense)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>("SELECT * FROM expenses WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(expense)
    }

    /// Lists expenses whose `expense_date` falls within `[from, to]`,
    /// latest first.
    pub async fn list(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> DbResult<Vec<Expense>> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(ValidationError::invalid("from", "must not be after 'to'").into());
            }
        }

        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT * FROM expenses
            WHERE (?1 IS NULL OR expense_date >= ?1)
              AND (?2 IS NULL OR expense_date <= ?2)
            ORDER BY expense_date DESC, created_at DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    /// Deletes an expense and credits a bank deposit back.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = begin_write(&self.pool).await?;

        let expense = sqlx::query_as::<_, Expense>("SELECT * FROM expenses WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Expense", id))?;

        if expense.payment_method.uses_bank_account() {
            if let Some(account_id) = &expense.bank_account_id {
                bank::adjust_balance(&mut tx, account_id, expense.amount_cents).await?;
            }
        }

        sqlx::query("DELETE FROM expenses WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id = %id, "Expense deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{balance, bank_account, test_db};
    use apotheca_core::{CoreError, PaymentMethod};

    fn expense(amount_cents: i64, method: PaymentMethod, bank: Option<&str>) -> NewExpense {
        NewExpense {
            category: "utilities".to_string(),
            description: Some("Electricity, March".to_string()),
            amount_cents,
            payment_method: method,
            bank_account_id: bank.map(str::to_string),
            expense_date: NaiveDate::from_ymd_opt(2026, 3, 15),
        }
    }

    #[tokio::test]
    async fn test_bank_expense_moves_balance_symmetrically() {
        let db = test_db().await;
        let account = bank_account(&db, 20_000).await;

        let created = db
            .expenses()
            .create(&expense(7_500, PaymentMethod::BankDeposit, Some(&account.id)))
            .await
            .unwrap();
        assert_eq!(balance(&db, &account.id).await, 12_500);

        db.expenses().delete(&created.id).await.unwrap();
        assert_eq!(balance(&db, &account.id).await, 20_000);
        assert!(db.expenses().get_by_id(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cash_expense_leaves_balance() {
        let db = test_db().await;
        let account = bank_account(&db, 1_000).await;

        let created = db
            .expenses()
            .create(&expense(300, PaymentMethod::Cash, Some(&account.id)))
            .await
            .unwrap();

        assert_eq!(created.bank_account_id, None);
        assert_eq!(balance(&db, &account.id).await, 1_000);
    }

    #[tokio::test]
    async fn test_missing_account_writes_nothing() {
        let db = test_db().await;
        let ghost = Uuid::new_v4().to_string();

        let err = db
            .expenses()
            .create(&expense(300, PaymentMethod::BankDeposit, Some(&ghost)))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert!(db.expenses().list(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let db = test_db().await;
        let err = db
            .expenses()
            .create(&expense(0, PaymentMethod::Cash, None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_by_expense_date() {
        let db = test_db().await;
        db.expenses()
            .create(&expense(100, PaymentMethod::Cash, None))
            .await
            .unwrap();

        let mut april = expense(200, PaymentMethod::Cash, None);
        april.expense_date = NaiveDate::from_ymd_opt(2026, 4, 2);
        db.expenses().create(&april).await.unwrap();

        let march = db
            .expenses()
            .list(
                NaiveDate::from_ymd_opt(2026, 3, 1),
                NaiveDate::from_ymd_opt(2026, 3, 31),
            )
            .await
            .unwrap();
        assert_eq!(march.len(), 1);
        assert_eq!(march[0].amount_cents, 100);

        assert_eq!(db.expenses().list(None, None).await.unwrap().len(), 2);
    }
}
