//! # apotheca-core: Pure Business Logic for Apotheca POS
//!
//! This crate holds the pharmacy domain as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Apotheca POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Dashboard (separate repo)                      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apotheca-api (axum)                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ apotheca-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ packaging │  │ validation│  │   │
//! │  │   │   Item    │  │   Money   │  │ base units│  │   rules   │  │   │
//! │  │   │   Batch   │  │  prorate  │  │ sub-units │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               apotheca-db (SQLite, transactions)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (InventoryItem, Batch, Sale, BankAccount, ...)
//! - [`inputs`] - Create/update payloads with their validation
//! - [`money`] - Money type with integer arithmetic
//! - [`packaging`] - Unit / sub-unit conversion to base units
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use apotheca_core::packaging::Packaging;
//! use apotheca_core::Money;
//!
//! // 10 tablets per strip, strip sells for $2.50
//! let pack = Packaging::new(Some(10));
//! let units = pack.consumed_base_units(2, 3).unwrap(); // 2 strips + 3 tablets
//! assert_eq!(units, 23);
//!
//! let price = pack.price_for_base_units(Money::from_cents(250), units).unwrap();
//! assert_eq!(price.cents(), 575);
//! ```

pub mod error;
pub mod inputs;
pub mod money;
pub mod packaging;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use inputs::*;
pub use money::Money;
pub use types::*;

/// Maximum line items allowed on a single sale or purchase.
pub const MAX_LINE_ITEMS: usize = 200;

/// Maximum packs on a single line.
///
/// Catches typos like 1000 instead of 10 at the counter.
pub const MAX_UNIT_QUANTITY: i64 = 10_000;

/// Largest accepted price, discount or opening balance: 1,000,000,000.00.
///
/// A full sale at this price (`MAX_LINE_ITEMS` lines of `MAX_UNIT_QUANTITY`
/// packs) still fits in an `i64` of cents.
pub const MAX_PRICE_CENTS: i64 = 100_000_000_000;
