//! # Error Types
//!
//! Domain-specific error types for apotheca-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  apotheca-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  apotheca-db errors                                                     │
//! │  └── DbError          - Database failures (wraps CoreError raised       │
//! │                         inside a transaction)                           │
//! │                                                                         │
//! │  apotheca-api errors                                                    │
//! │  └── ApiError         - JSON body + HTTP status                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Batch does not hold enough stock for the requested line.
    ///
    /// ## User Workflow
    /// ```text
    /// Sell 2 strips of PARA-500 (batch B-17)
    ///      │
    ///      ▼
    /// consumed = 2 × 10 = 20 tablets, batch has 12
    ///      │
    ///      ▼
    /// InsufficientStock { item: "PARA-500", batch: "B-17", available: 12, requested: 20 }
    ///      │
    ///      ▼
    /// Transaction rolled back, nothing changes
    /// ```
    #[error("Insufficient stock for {item} (batch {batch}): available {available}, requested {requested}")]
    InsufficientStock {
        item: String,
        batch: String,
        available: i64,
        requested: i64,
    },

    /// Line references a batch that belongs to another item.
    #[error("Batch {batch_id} does not belong to item {item_id}")]
    BatchItemMismatch { batch_id: String, item_id: String },

    /// Bank deposit chosen without an account to deposit into.
    #[error("Payment method bank_deposit requires a bank account")]
    BankAccountRequired,

    /// Discount exceeds the amount it applies to.
    #[error("Discount {discount} exceeds subtotal {subtotal}")]
    DiscountTooLarge { discount: i64, subtotal: i64 },

    /// Too many lines on one document.
    #[error("Cannot have more than {max} line items")]
    TooManyLines { max: usize },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before any database work starts.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A computed amount does not fit in 64-bit cents.
    #[error("{field} is too large")]
    Overflow { field: String },
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn overflow(field: &str) -> Self {
        ValidationError::Overflow {
            field: field.to_string(),
        }
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
