//! Fixtures shared by the repository tests.

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::pool::{Database, DbConfig};
use apotheca_core::{
    BankAccount, BankAccountInput, Batch, BatchInput, Customer, CustomerInput, InventoryItem,
    InventoryItemInput, ItemType, Supplier, SupplierInput,
};

pub(crate) async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// File-backed database with a multi-connection pool, so transactions can
/// actually overlap. The file and its WAL side files are removed on drop.
pub(crate) struct FileDb {
    pub db: Database,
    path: PathBuf,
}

impl Drop for FileDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

pub(crate) async fn file_db(max_connections: u32) -> FileDb {
    let path = std::env::temp_dir().join(format!("apotheca-test-{}.db", uuid::Uuid::new_v4()));
    let db = Database::new(DbConfig::new(&path).max_connections(max_connections))
        .await
        .unwrap();
    FileDb { db, path }
}

pub(crate) fn item_input(code: &str, units_per_pack: Option<i64>) -> InventoryItemInput {
    InventoryItemInput {
        code: code.to_string(),
        name: format!("Item {code}"),
        item_type: ItemType::Tablet,
        unit_name: Some("strip".to_string()),
        sub_unit_name: units_per_pack.map(|_| "tablet".to_string()),
        units_per_pack,
        min_stock: 0,
    }
}

/// Batch priced at $2.50 sell / $1.50 cost per unit, expiring end of 2030.
pub(crate) fn batch_input(batch_number: &str, quantity: i64) -> BatchInput {
    BatchInput {
        batch_number: batch_number.to_string(),
        quantity,
        cost_price_cents: 150,
        sell_price_cents: 250,
        expiry_date: NaiveDate::from_ymd_opt(2030, 12, 31).unwrap(),
    }
}

pub(crate) async fn item_with_batch(
    db: &Database,
    code: &str,
    units_per_pack: Option<i64>,
    quantity: i64,
) -> (InventoryItem, Batch) {
    let repo = db.inventory();
    let item = repo.create_item(&item_input(code, units_per_pack)).await.unwrap();
    let batch = repo
        .create_batch(&item.id, &batch_input(&format!("{code}-B1"), quantity))
        .await
        .unwrap();
    (item, batch)
}

pub(crate) async fn bank_account(db: &Database, opening_balance_cents: i64) -> BankAccount {
    db.bank_accounts()
        .create(&BankAccountInput {
            name: "Main Account".to_string(),
            account_number: format!("ACC-{}", uuid::Uuid::new_v4().simple()),
            opening_balance_cents,
        })
        .await
        .unwrap()
}

pub(crate) async fn customer(db: &Database) -> Customer {
    db.customers()
        .create(&CustomerInput {
            name: "Jane Walk-in".to_string(),
            phone: Some("0300-1234567".to_string()),
            email: None,
            address: None,
        })
        .await
        .unwrap()
}

pub(crate) async fn supplier(db: &Database) -> Supplier {
    db.suppliers()
        .create(&SupplierInput {
            name: "MedSupply Ltd".to_string(),
            contact_person: Some("R. Khan".to_string()),
            phone: None,
            email: Some("orders@medsupply.example".to_string()),
            address: None,
        })
        .await
        .unwrap()
}

pub(crate) async fn batch_quantity(db: &Database, batch_id: &str) -> i64 {
    db.inventory().get_batch(batch_id).await.unwrap().unwrap().quantity
}

pub(crate) async fn balance(db: &Database, account_id: &str) -> i64 {
    db.bank_accounts()
        .get_by_id(account_id)
        .await
        .unwrap()
        .unwrap()
        .balance_cents
}
