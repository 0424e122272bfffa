//! # apotheca-db: Database Layer for Apotheca POS
//!
//! SQLite persistence through sqlx, plus the transactional sale, purchase
//! and expense logic that keeps batch stock and bank balances consistent.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  pool.rs        DbConfig, Database ── one accessor per repository       │
//! │  migrations.rs  embedded migrations/sqlite/*.sql                        │
//! │  error.rs       DbError (sqlx failures + CoreError from transactions)   │
//! │                                                                         │
//! │  repository/                                                            │
//! │    inventory    items, batches, low stock, expiring                     │
//! │    sale         create / delete move stock + bank balance atomically    │
//! │    purchase     receive stock into batches, reverse a receipt           │
//! │    expense      money out of a bank account                             │
//! │    bank, party  accounts, customers, suppliers                          │
//! │    report       period totals                                           │
//! │    stock        conditional batch decrement shared by sale / purchase   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use apotheca_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("apotheca.db")).await?;
//!
//! let detail = db.sales().create(&new_sale).await?;
//! db.sales().delete(&detail.sale.id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig};

pub use repository::bank::BankAccountRepository;
pub use repository::expense::ExpenseRepository;
pub use repository::inventory::InventoryRepository;
pub use repository::party::{CustomerRepository, SupplierRepository};
pub use repository::purchase::PurchaseRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
