//! # Packaging Conversion
//!
//! Stock is stored in base units (the smallest thing we can hand over the
//! counter). Items sold in packs carry a containment factor.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Paracetamol 500mg: unit = strip, sub-unit = tablet, 10 per strip       │
//! │                                                                         │
//! │  Sell 2 strips + 3 tablets                                              │
//! │     consumed = 2 × 10 + 3 = 23 base units                               │
//! │                                                                         │
//! │  Cough syrup: no sub-unit                                               │
//! │  Sell 2 bottles                                                         │
//! │     consumed = 2 base units                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Prices on a batch are per unit (per strip); loose sub-units are priced
//! proportionally.

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::MAX_UNIT_QUANTITY;

/// Containment factor for an inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Packaging {
    units_per_pack: Option<i64>,
}

impl Packaging {
    /// Creates packaging from an item's `units_per_pack`.
    ///
    /// Factors of 0 or 1 mean "no conversion": the unit is the base unit.
    pub fn new(units_per_pack: Option<i64>) -> Self {
        Packaging {
            units_per_pack: units_per_pack.filter(|n| *n > 1),
        }
    }

    /// Whether sub-units can be sold separately.
    #[inline]
    pub fn has_conversion(&self) -> bool {
        self.units_per_pack.is_some()
    }

    /// Base units in one unit.
    #[inline]
    pub fn factor(&self) -> i64 {
        self.units_per_pack.unwrap_or(1)
    }

    /// Total base units consumed by a line of `unit_qty` packs plus
    /// `sub_unit_qty` loose sub-units.
    ///
    /// ## Rules
    /// - Neither quantity may be negative, and at least one must be non-zero
    /// - Sub-units are only valid for items with a conversion
    /// - `sub_unit_qty` must be below the pack size (otherwise it is a pack)
    ///
    /// ```rust
    /// use apotheca_core::packaging::Packaging;
    ///
    /// assert_eq!(Packaging::new(Some(10)).consumed_base_units(2, 3).unwrap(), 23);
    /// assert_eq!(Packaging::new(None).consumed_base_units(4, 0).unwrap(), 4);
    /// assert!(Packaging::new(None).consumed_base_units(1, 2).is_err());
    /// ```
    pub fn consumed_base_units(&self, unit_qty: i64, sub_unit_qty: i64) -> CoreResult<i64> {
        if unit_qty < 0 {
            return Err(ValidationError::MustNotBeNegative {
                field: "unit_quantity".to_string(),
            }
            .into());
        }
        if sub_unit_qty < 0 {
            return Err(ValidationError::MustNotBeNegative {
                field: "sub_unit_quantity".to_string(),
            }
            .into());
        }
        if unit_qty == 0 && sub_unit_qty == 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }
        if unit_qty > MAX_UNIT_QUANTITY {
            return Err(ValidationError::OutOfRange {
                field: "unit_quantity".to_string(),
                min: 0,
                max: MAX_UNIT_QUANTITY,
            }
            .into());
        }

        match self.units_per_pack {
            Some(per_pack) => {
                if sub_unit_qty >= per_pack {
                    return Err(ValidationError::OutOfRange {
                        field: "sub_unit_quantity".to_string(),
                        min: 0,
                        max: per_pack - 1,
                    }
                    .into());
                }
                Ok(unit_qty * per_pack + sub_unit_qty)
            }
            None => {
                if sub_unit_qty != 0 {
                    return Err(ValidationError::invalid(
                        "sub_unit_quantity",
                        "item is not sold in sub-units",
                    )
                    .into());
                }
                Ok(unit_qty)
            }
        }
    }

    /// Price of `base_units` given the price of one unit.
    pub fn price_for_base_units(&self, unit_price: Money, base_units: i64) -> CoreResult<Money> {
        unit_price
            .prorate(base_units, self.factor())
            .ok_or_else(|| ValidationError::overflow("line_total").into())
    }

    /// Splits base units back into (units, sub-units) for display.
    pub fn split_base_units(&self, base_units: i64) -> (i64, i64) {
        let factor = self.factor();
        (base_units / factor, base_units % factor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
