//! # Inputs
//!
//! Payloads for creating and updating records. The API deserializes request
//! bodies straight into these; repositories call `validate()` before opening
//! a transaction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{ItemType, PaymentMethod};
use crate::validation::{
    validate_account_number, validate_amount_cents, validate_balance_cents, validate_batch_number,
    validate_code, validate_name, validate_optional_email, validate_optional_text,
    validate_optional_uuid, validate_price_cents, validate_stock_quantity,
    validate_units_per_pack, validate_uuid, ValidationResult,
};
use crate::{MAX_LINE_ITEMS, MAX_UNIT_QUANTITY};

/// Trims an optional string, mapping blank to `None`.
pub fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn validate_line_count(count: usize) -> CoreResult<()> {
    if count == 0 {
        return Err(ValidationError::required("items").into());
    }
    if count > MAX_LINE_ITEMS {
        return Err(CoreError::TooManyLines { max: MAX_LINE_ITEMS });
    }
    Ok(())
}

fn validate_bank_reference(method: PaymentMethod, bank_account_id: Option<&str>) -> CoreResult<()> {
    validate_optional_uuid("bank_account_id", bank_account_id)?;
    if method.uses_bank_account() && bank_account_id.is_none() {
        return Err(CoreError::BankAccountRequired);
    }
    Ok(())
}

// =============================================================================
// Inventory
// =============================================================================

/// Create / update payload for an inventory item.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryItemInput {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub item_type: ItemType,
    #[serde(default)]
    pub unit_name: Option<String>,
    #[serde(default)]
    pub sub_unit_name: Option<String>,
    #[serde(default)]
    pub units_per_pack: Option<i64>,
    #[serde(default)]
    pub min_stock: i64,
}

impl InventoryItemInput {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_code(&self.code)?;
        validate_name("name", &self.name)?;
        validate_optional_text("unit_name", self.unit_name.as_deref())?;
        validate_optional_text("sub_unit_name", self.sub_unit_name.as_deref())?;
        validate_units_per_pack(self.units_per_pack)?;
        validate_stock_quantity("min_stock", self.min_stock)?;
        Ok(())
    }
}

/// Create / update payload for a batch.
///
/// `quantity` on update is a stock-count correction in base units.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BatchInput {
    pub batch_number: String,
    #[serde(default)]
    pub quantity: i64,
    pub cost_price_cents: i64,
    pub sell_price_cents: i64,
    #[ts(as = "String")]
    pub expiry_date: NaiveDate,
}

impl BatchInput {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_batch_number(&self.batch_number)?;
        validate_stock_quantity("quantity", self.quantity)?;
        validate_price_cents("cost_price_cents", self.cost_price_cents)?;
        validate_price_cents("sell_price_cents", self.sell_price_cents)?;
        Ok(())
    }
}

// =============================================================================
// Parties
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerInput {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl CustomerInput {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        validate_optional_text("phone", self.phone.as_deref())?;
        validate_optional_email(self.email.as_deref())?;
        validate_optional_text("address", self.address.as_deref())?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierInput {
    pub name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl SupplierInput {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        validate_optional_text("contact_person", self.contact_person.as_deref())?;
        validate_optional_text("phone", self.phone.as_deref())?;
        validate_optional_email(self.email.as_deref())?;
        validate_optional_text("address", self.address.as_deref())?;
        Ok(())
    }
}

// =============================================================================
// Bank Accounts
// =============================================================================

/// Create / update payload for a bank account.
///
/// `opening_balance_cents` only applies on create; balances afterwards move
/// exclusively through sales, purchases and expenses.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BankAccountInput {
    pub name: String,
    pub account_number: String,
    #[serde(default)]
    pub opening_balance_cents: i64,
}

impl BankAccountInput {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        validate_account_number(&self.account_number)?;
        validate_balance_cents("opening_balance_cents", self.opening_balance_cents)?;
        Ok(())
    }
}

// =============================================================================
// Sales
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSaleLine {
    pub item_id: String,
    pub batch_id: String,
    /// Whole packs.
    #[serde(default)]
    pub unit_quantity: i64,
    /// Loose sub-units on top of the packs.
    #[serde(default)]
    pub sub_unit_quantity: i64,
    /// Overrides the batch sell price (price of one unit).
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub bank_account_id: Option<String>,
    #[serde(default)]
    pub discount_cents: i64,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<NewSaleLine>,
}

impl NewSale {
    /// Shape checks only; stock and references are checked in the transaction.
    pub fn validate(&self) -> CoreResult<()> {
        validate_line_count(self.items.len())?;
        validate_optional_uuid("customer_id", self.customer_id.as_deref())?;
        validate_bank_reference(self.payment_method, self.bank_account_id.as_deref())?;
        validate_price_cents("discount_cents", self.discount_cents)?;
        validate_optional_text("notes", self.notes.as_deref())?;

        for line in &self.items {
            validate_uuid("item_id", &line.item_id)?;
            validate_uuid("batch_id", &line.batch_id)?;
            if let Some(price) = line.unit_price_cents {
                validate_price_cents("unit_price_cents", price)?;
            }
        }

        Ok(())
    }

    /// Bank account to credit, if the payment method moves one.
    pub fn bank_account(&self) -> Option<&str> {
        if self.payment_method.uses_bank_account() {
            self.bank_account_id.as_deref()
        } else {
            None
        }
    }
}

// =============================================================================
// Purchases
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPurchaseLine {
    pub item_id: String,
    /// Existing batch numbers are topped up, new ones are created.
    pub batch_number: String,
    /// Whole packs received.
    pub unit_quantity: i64,
    pub cost_price_cents: i64,
    pub sell_price_cents: i64,
    #[ts(as = "String")]
    pub expiry_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPurchase {
    pub supplier_id: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub bank_account_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<NewPurchaseLine>,
}

impl NewPurchase {
    pub fn validate(&self) -> CoreResult<()> {
        validate_line_count(self.items.len())?;
        validate_uuid("supplier_id", &self.supplier_id)?;
        validate_bank_reference(self.payment_method, self.bank_account_id.as_deref())?;
        validate_optional_text("reference", self.reference.as_deref())?;
        validate_optional_text("notes", self.notes.as_deref())?;

        for line in &self.items {
            validate_uuid("item_id", &line.item_id)?;
            validate_batch_number(&line.batch_number)?;
            if line.unit_quantity <= 0 {
                return Err(ValidationError::MustBePositive {
                    field: "unit_quantity".to_string(),
                }
                .into());
            }
            if line.unit_quantity > MAX_UNIT_QUANTITY {
                return Err(ValidationError::OutOfRange {
                    field: "unit_quantity".to_string(),
                    min: 1,
                    max: MAX_UNIT_QUANTITY,
                }
                .into());
            }
            validate_price_cents("cost_price_cents", line.cost_price_cents)?;
            validate_price_cents("sell_price_cents", line.sell_price_cents)?;
        }

        Ok(())
    }

    /// Bank account to debit, if the payment method moves one.
    pub fn bank_account(&self) -> Option<&str> {
        if self.payment_method.uses_bank_account() {
            self.bank_account_id.as_deref()
        } else {
            None
        }
    }
}

// =============================================================================
// Expenses
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewExpense {
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount_cents: i64,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub bank_account_id: Option<String>,
    /// Defaults to today.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expense_date: Option<NaiveDate>,
}

impl NewExpense {
    pub fn validate(&self) -> CoreResult<()> {
        validate_name("category", &self.category)?;
        validate_optional_text("description", self.description.as_deref())?;
        validate_amount_cents("amount_cents", self.amount_cents)?;
        validate_bank_reference(self.payment_method, self.bank_account_id.as_deref())?;
        Ok(())
    }

    pub fn bank_account(&self) -> Option<&str> {
        if self.payment_method.uses_bank_account() {
            self.bank_account_id.as_deref()
        } else {
            None
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
