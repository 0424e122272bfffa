//! # Domain Types
//!
//! Records persisted by apotheca-db and returned by the API.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  InventoryItem 1 ──── * Batch          (stock lives on batches)         │
//! │       │                  │                                              │
//! │       │                  │                                              │
//! │  SaleItem * ─────────────┘             PurchaseItem * ── Batch          │
//! │       │                                      │                          │
//! │  Sale ──── ? Customer                   Purchase ──── Supplier          │
//! │    │                                         │                          │
//! │    └──── ? BankAccount ◄──── Expense ────────┘                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity has a UUID v4 `id`. Business identifiers (item code, batch
//! number, invoice number, account number) are human-readable and unique in
//! their scope.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::packaging::Packaging;

// =============================================================================
// Inventory Item
// =============================================================================

/// Dosage form / kind of item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Tablet,
    Capsule,
    Syrup,
    Injection,
    Cream,
    Drops,
    Device,
    Other,
}

impl Default for ItemType {
    fn default() -> Self {
        ItemType::Other
    }
}

/// A product the pharmacy stocks.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryItem {
    pub id: String,

    /// Business code, unique across items (e.g. "PARA-500").
    pub code: String,

    pub name: String,

    pub item_type: ItemType,

    /// Name of the sellable pack (e.g. "strip").
    pub unit_name: Option<String>,

    /// Name of the loose unit inside a pack (e.g. "tablet").
    pub sub_unit_name: Option<String>,

    /// Sub-units contained in one unit. `None` or 1 means no conversion.
    pub units_per_pack: Option<i64>,

    /// Low-stock threshold in base units.
    pub min_stock: i64,

    /// Soft delete flag.
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Packaging conversion for this item.
    #[inline]
    pub fn packaging(&self) -> Packaging {
        Packaging::new(self.units_per_pack)
    }
}

// =============================================================================
// Batch
// =============================================================================

/// A received lot of an item with its own expiry and remaining quantity.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Batch {
    pub id: String,
    pub item_id: String,

    /// Manufacturer lot number, unique per item.
    pub batch_number: String,

    /// Remaining stock in base units. Never negative.
    pub quantity: i64,

    /// Cost of one unit (pack).
    pub cost_price_cents: i64,

    /// Sell price of one unit (pack).
    pub sell_price_cents: i64,

    #[ts(as = "String")]
    pub expiry_date: NaiveDate,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Batch {
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }

    #[inline]
    pub fn sell_price(&self) -> Money {
        Money::from_cents(self.sell_price_cents)
    }

    /// A batch is expired on its expiry date.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date <= today
    }
}

// =============================================================================
// Parties
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Bank Account
// =============================================================================

/// A bank account whose balance moves with bank-deposit payments.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BankAccount {
    pub id: String,
    pub name: String,
    pub account_number: String,
    pub balance_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl BankAccount {
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    /// Money lands in (or leaves) one of our bank accounts.
    BankDeposit,
}

impl PaymentMethod {
    /// Whether this method moves a bank account balance.
    #[inline]
    pub fn uses_bank_account(&self) -> bool {
        matches!(self, PaymentMethod::BankDeposit)
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

// =============================================================================
// Sale
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// Human-readable number: INV-YYYYMMDD-NNNN.
    pub invoice_number: String,
    pub customer_id: Option<String>,
    pub payment_method: PaymentMethod,
    /// Set only when `payment_method` is bank deposit.
    pub bank_account_id: Option<String>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    /// Cost of goods sold, for profit reporting.
    pub cost_cents: i64,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A sale line. Item name and batch number are frozen at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub item_id: String,
    pub batch_id: String,
    pub item_name_snapshot: String,
    pub batch_number_snapshot: String,
    pub unit_quantity: i64,
    pub sub_unit_quantity: i64,
    /// Base units taken from the batch; what deletion gives back.
    pub base_units: i64,
    /// Price of one unit applied on this line.
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub line_cost_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDetail {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Purchase
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Purchase {
    pub id: String,
    pub supplier_id: String,
    /// Supplier invoice / delivery note reference.
    pub reference: Option<String>,
    pub payment_method: PaymentMethod,
    pub bank_account_id: Option<String>,
    pub total_cents: i64,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseItem {
    pub id: String,
    pub purchase_id: String,
    pub item_id: String,
    pub batch_id: String,
    pub batch_number: String,
    pub unit_quantity: i64,
    /// Base units added to the batch; what deletion takes back.
    pub base_units: i64,
    pub cost_price_cents: i64,
    pub sell_price_cents: i64,
    #[ts(as = "String")]
    pub expiry_date: NaiveDate,
    pub line_total_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseDetail {
    pub purchase: Purchase,
    pub items: Vec<PurchaseItem>,
}

// =============================================================================
// Expense
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Expense {
    pub id: String,
    /// Free-form grouping, e.g. "rent", "utilities", "salaries".
    pub category: String,
    pub description: Option<String>,
    pub amount_cents: i64,
    pub payment_method: PaymentMethod,
    pub bank_account_id: Option<String>,
    #[ts(as = "String")]
    pub expense_date: NaiveDate,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Reports
// =============================================================================

/// An item whose stock across all batches is below its threshold.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LowStockItem {
    pub item_id: String,
    pub code: String,
    pub name: String,
    pub min_stock: i64,
    pub total_quantity: i64,
}

/// Profit and loss over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinancialSummary {
    #[ts(as = "String")]
    pub from: NaiveDate,
    #[ts(as = "String")]
    pub to: NaiveDate,
    pub sale_count: i64,
    pub revenue_cents: i64,
    pub discount_cents: i64,
    pub cost_of_goods_cents: i64,
    pub gross_profit_cents: i64,
    pub purchases_cents: i64,
    pub expenses_cents: i64,
    pub net_profit_cents: i64,
}

impl FinancialSummary {
    /// Builds the summary from raw sums, deriving the profit lines.
    #[allow(clippy::too_many_arguments)]
    pub fn from_totals(
        from: NaiveDate,
        to: NaiveDate,
        sale_count: i64,
        revenue: Money,
        discount: Money,
        cost_of_goods: Money,
        purchases: Money,
        expenses: Money,
    ) -> Self {
        let gross_profit = revenue - cost_of_goods;
        let net_profit = gross_profit - expenses;

        FinancialSummary {
            from,
            to,
            sale_count,
            revenue_cents: revenue.cents(),
            discount_cents: discount.cents(),
            cost_of_goods_cents: cost_of_goods.cents(),
            gross_profit_cents: gross_profit.cents(),
            purchases_cents: purchases.cents(),
            expenses_cents: expenses.cents(),
            net_profit_cents: net_profit.cents(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_bank_flag() {
        assert!(PaymentMethod::BankDeposit.uses_bank_account());
        assert!(!PaymentMethod::Cash.uses_bank_account());
        assert!(!PaymentMethod::Card.uses_bank_account());
    }

    #[test]
    fn test_payment_method_serde() {
        let json = serde_json::to_string(&PaymentMethod::BankDeposit).unwrap();
        assert_eq!(json, "\"bank_deposit\"");
        let parsed: PaymentMethod = serde_json::from_str("\"card\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Card);
    }

    #[test]
    fn test_batch_expiry() {
        let now = Utc::now();
        let batch = Batch {
            id: "b".to_string(),
            item_id: "i".to_string(),
            batch_number: "B-1".to_string(),
            quantity: 10,
            cost_price_cents: 100,
            sell_price_cents: 150,
            expiry_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            created_at: now,
            updated_at: now,
        };
        assert!(!batch.is_expired(NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()));
        assert!(batch.is_expired(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()));
    }

    #[test]
    fn test_financial_summary_profit_lines() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let summary = FinancialSummary::from_totals(
            day,
            day,
            3,
            Money::from_cents(10_000),
            Money::from_cents(500),
            Money::from_cents(6_000),
            Money::from_cents(20_000),
            Money::from_cents(1_500),
        );
        assert_eq!(summary.gross_profit_cents, 4_000);
        assert_eq!(summary.net_profit_cents, 2_500);
    }
}
