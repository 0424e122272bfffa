//! # Validation Module
//!
//! Input validation utilities for Apotheca POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: JSON deserialization (axum extractor)                         │
//! │  ├── Types, required fields, enum values                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (called from inputs::*::validate)                 │
//! │  ├── Lengths, formats, signs                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Inside the DB transaction                                     │
//! │  ├── Referenced rows exist, stock is sufficient                         │
//! │  └── UNIQUE / FOREIGN KEY / CHECK constraints                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::MAX_PRICE_CENTS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_CODE_LEN: usize = 50;
const MAX_NAME_LEN: usize = 200;
const MAX_TEXT_LEN: usize = 1000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item code.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ```rust
/// use apotheca_core::validation::validate_code;
///
/// assert!(validate_code("PARA-500").is_ok());
/// assert!(validate_code("").is_err());
/// assert!(validate_code("has space").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    validate_identifier("code", code)
}

/// Validates a batch number. Same character rules as item codes, plus '/'
/// and '.', which show up on manufacturer lot labels.
pub fn validate_batch_number(batch_number: &str) -> ValidationResult<()> {
    let value = batch_number.trim();

    if value.is_empty() {
        return Err(ValidationError::required("batch_number"));
    }
    if value.len() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "batch_number".to_string(),
            max: MAX_CODE_LEN,
        });
    }
    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '/' | '.'))
    {
        return Err(ValidationError::invalid(
            "batch_number",
            "must contain only letters, numbers, and - _ / .",
        ));
    }

    Ok(())
}

/// Validates a bank account number.
pub fn validate_account_number(account_number: &str) -> ValidationResult<()> {
    let value = account_number.trim();

    if value.is_empty() {
        return Err(ValidationError::required("account_number"));
    }
    if value.len() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "account_number".to_string(),
            max: MAX_CODE_LEN,
        });
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ' ') {
        return Err(ValidationError::invalid(
            "account_number",
            "must contain only letters, digits, spaces and hyphens",
        ));
    }

    Ok(())
}

fn validate_identifier(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.len() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_CODE_LEN,
        });
    }

    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::invalid(
            field,
            "must contain only letters, numbers, hyphens, and underscores",
        ));
    }

    Ok(())
}

/// Validates a required display name (item, customer, supplier, account).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an optional free-text field.
pub fn validate_optional_text(field: &str, value: Option<&str>) -> ValidationResult<()> {
    match value {
        Some(text) if text.len() > MAX_TEXT_LEN => Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        }),
        _ => Ok(()),
    }
}

/// Loose email check: something@something.something.
pub fn validate_optional_email(email: Option<&str>) -> ValidationResult<()> {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(());
    };

    let valid = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'))
        .unwrap_or(false);

    if !valid {
        return Err(ValidationError::invalid("email", "must be a valid email address"));
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price or amount in cents.
///
/// Zero is allowed (free samples).
///
/// ```rust
/// use apotheca_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("sell_price", 1099).is_ok());
/// assert!(validate_price_cents("sell_price", 0).is_ok());
/// assert!(validate_price_cents("sell_price", -100).is_err());
/// assert!(validate_price_cents("sell_price", i64::MAX).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if cents > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates an opening balance. Overdrawn accounts may open negative.
pub fn validate_balance_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(-MAX_PRICE_CENTS..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: -MAX_PRICE_CENTS,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a strictly positive amount (expenses, payments).
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    if cents > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a stock quantity or threshold.
pub fn validate_stock_quantity(field: &str, quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a packaging factor.
pub fn validate_units_per_pack(units_per_pack: Option<i64>) -> ValidationResult<()> {
    match units_per_pack {
        Some(n) if !(1..=10_000).contains(&n) => Err(ValidationError::OutOfRange {
            field: "units_per_pack".to_string(),
            min: 1,
            max: 10_000,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ```rust
/// use apotheca_core::validation::validate_uuid;
///
/// assert!(validate_uuid("item_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("item_id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    uuid::Uuid::parse_str(id)
        .map_err(|_| ValidationError::invalid(field, "must be a valid UUID"))?;

    Ok(())
}

/// Validates an optional UUID reference.
pub fn validate_optional_uuid(field: &str, id: Option<&str>) -> ValidationResult<()> {
    match id {
        Some(id) => validate_uuid(field, id),
        None => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
