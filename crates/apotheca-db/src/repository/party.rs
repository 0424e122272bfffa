//! # Customer & Supplier Repositories
//!
//! Plain CRUD. Deletes are hard deletes; the foreign keys from `sales` and
//! `purchases` are `ON DELETE RESTRICT`, so a party with history cannot be
//! removed and the caller gets `ForeignKeyViolation`.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use apotheca_core::inputs::clean;
use apotheca_core::{Customer, CustomerInput, Supplier, SupplierInput};

// =============================================================================
// Customers
// =============================================================================

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn create(&self, input: &CustomerInput) -> DbResult<Customer> {
        input.validate()?;

        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            phone: clean(&input.phone),
            email: clean(&input.email),
            address: clean(&input.address),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %customer.id, "Creating customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, phone, email, address, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    pub async fn update(&self, id: &str, input: &CustomerInput) -> DbResult<Customer> {
        input.validate()?;

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2, phone = ?3, email = ?4, address = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(clean(&input.phone))
        .bind(clean(&input.email))
        .bind(clean(&input.address))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        info!(id = %id, "Customer deleted");
        Ok(())
    }
}

// =============================================================================
// Suppliers
// =============================================================================

#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    pub async fn create(&self, input: &SupplierInput) -> DbResult<Supplier> {
        input.validate()?;

        let now = Utc::now();
        let supplier = Supplier {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            contact_person: clean(&input.contact_person),
            phone: clean(&input.phone),
            email: clean(&input.email),
            address: clean(&input.address),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %supplier.id, "Creating supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, name, contact_person, phone, email, address, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_person)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(supplier)
    }

    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(suppliers)
    }

    pub async fn update(&self, id: &str, input: &SupplierInput) -> DbResult<Supplier> {
        input.validate()?;

        let result = sqlx::query(
            r#"
            UPDATE suppliers SET
                name = ?2, contact_person = ?3, phone = ?4, email = ?5, address = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(clean(&input.contact_person))
        .bind(clean(&input.phone))
        .bind(clean(&input.email))
        .bind(clean(&input.address))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        info!(id = %id, "Supplier deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{customer, supplier, test_db};

    #[tokio::test]
    async fn test_customer_roundtrip_cleans_blanks() {
        let db = test_db().await;
        let repo = db.customers();

        let created = repo
            .create(&CustomerInput {
                name: "  Ayesha  ".to_string(),
                phone: Some("   ".to_string()),
                email: Some("ayesha@example.com".to_string()),
                address: None,
            })
            .await
            .unwrap();

        assert_eq!(created.name, "Ayesha");
        assert_eq!(created.phone, None);

        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.email.as_deref(), Some("ayesha@example.com"));
    }

    #[tokio::test]
    async fn test_update_and_delete_customer() {
        let db = test_db().await;
        let c = customer(&db).await;

        let updated = db
            .customers()
            .update(
                &c.id,
                &CustomerInput {
                    name: "Jane Regular".to_string(),
                    phone: None,
                    email: None,
                    address: Some("12 Mall Road".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Jane Regular");

        db.customers().delete(&c.id).await.unwrap();
        assert!(db.customers().get_by_id(&c.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_supplier_list_and_missing_update() {
        let db = test_db().await;
        supplier(&db).await;

        assert_eq!(db.suppliers().list().await.unwrap().len(), 1);

        let err = db
            .suppliers()
            .update(
                "missing",
                &SupplierInput {
                    name: "X".to_string(),
                    contact_person: None,
                    phone: None,
                    email: None,
                    address: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
