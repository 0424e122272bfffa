//! # Money Module
//!
//! Signed integer cents for prices, line totals and bank balances.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Pharmacy pricing is per pack, but we sell loose tablets too:           │
//! │                                                                         │
//! │    strip of 10 = $2.55, customer buys 3 tablets                         │
//! │    float:  2.55 / 10 * 3 = 0.7649999999999999                           │
//! │    cents:  255 * 3 / 10  = 76.5 → 77 cents (half up, explicit)          │
//! │                                                                         │
//! │  Every amount is stored and summed in cents; rounding happens once,    │
//! │  at the point a pack price is split into base units.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use apotheca_core::money::Money;
//!
//! let strip = Money::from_cents(255);        // $2.55 per strip of 10
//! let three_tablets = strip.prorate(3, 10).unwrap();  // 76.5 → 77
//! assert_eq!((strip * 2 + three_tablets).cents(), 587);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// Signed so reversals (deleting a sale, refunding an expense) can be
/// expressed as negative deltas against a bank balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use apotheca_core::money::Money;
    ///
    /// let balance = Money::from_cents(-4_250);
    /// assert_eq!(balance.cents(), -4_250);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity. `None` on overflow.
    ///
    /// ```rust
    /// use apotheca_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).unwrap().cents(), 897);
    /// assert!(Money::from_cents(i64::MAX).multiply_quantity(2).is_none());
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts. `None` on overflow.
    ///
    /// Totals built from request data go through this rather than `+`.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Scales the amount by `numerator / denominator`, rounding half away
    /// from zero.
    ///
    /// Used to price loose sub-units from a pack price:
    /// `pack_price.prorate(base_units, units_per_pack)`.
    ///
    /// ```rust
    /// use apotheca_core::money::Money;
    ///
    /// // 3 tablets from a $2.55 strip of 10
    /// assert_eq!(Money::from_cents(255).prorate(3, 10).unwrap().cents(), 77);
    /// ```
    ///
    /// A zero denominator yields zero. `None` when the result does not fit
    /// in an `i64`.
    pub fn prorate(&self, numerator: i64, denominator: i64) -> Option<Money> {
        if denominator == 0 {
            return Some(Money::zero());
        }

        // i128 so the intermediate product cannot overflow
        let scaled = self.0 as i128 * numerator as i128;
        let den = denominator as i128;
        let magnitude = (scaled.abs() + den.abs() / 2) / den.abs();
        let rounded = if (scaled < 0) != (den < 0) {
            -magnitude
        } else {
            magnitude
        };
        i64::try_from(rounded).ok().map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// For logs and debugging; the dashboard formats money itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let inhaler = Money::from_cents(2_345);
        assert_eq!(inhaler.cents(), 2_345);
        assert_eq!(inhaler.dollars(), 23);
        assert_eq!(inhaler.cents_part(), 45);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(2_345).to_string(), "$23.45");
        assert_eq!(Money::from_cents(7).to_string(), "$0.07");
        assert_eq!(Money::from_cents(-1_200).to_string(), "-$12.00");
        assert_eq!(format!("{}", Money::zero()), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let subtotal = Money::from_cents(1_250);
        let discount = Money::from_cents(300);

        assert_eq!((subtotal - discount).cents(), 950);
        assert_eq!((subtotal + discount).cents(), 1_550);
        assert_eq!((discount * 4).cents(), 1_200);
        assert_eq!((-subtotal).cents(), -1_250);

        let mut balance = Money::zero();
        balance += subtotal;
        balance -= discount;
        assert_eq!(balance.cents(), 950);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 650].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 1000);
    }

    #[test]
    fn test_prorate_exact() {
        // 2 full strips of 10 at $2.50
        assert_eq!(Money::from_cents(250).prorate(20, 10).unwrap().cents(), 500);
    }

    #[test]
    fn test_prorate_rounds_half_up() {
        // 255 * 3 / 10 = 76.5 → 77
        assert_eq!(Money::from_cents(255).prorate(3, 10).unwrap().cents(), 77);
        // 255 * 1 / 10 = 25.5 → 26
        assert_eq!(Money::from_cents(255).prorate(1, 10).unwrap().cents(), 26);
        // 254 * 1 / 10 = 25.4 → 25
        assert_eq!(Money::from_cents(254).prorate(1, 10).unwrap().cents(), 25);
    }

    #[test]
    fn test_prorate_negative_rounds_away_from_zero() {
        assert_eq!(Money::from_cents(-255).prorate(1, 10).unwrap().cents(), -26);
    }

    #[test]
    fn test_prorate_zero_denominator() {
        assert!(Money::from_cents(100).prorate(5, 0).unwrap().is_zero());
    }

    #[test]
    fn test_checked_arithmetic_overflow() {
        let huge = Money::from_cents(i64::MAX);
        assert!(huge.checked_add(Money::from_cents(1)).is_none());
        assert!(huge.multiply_quantity(2).is_none());
        assert_eq!(
            Money::from_cents(250).checked_add(Money::from_cents(100)),
            Some(Money::from_cents(350))
        );
    }

    #[test]
    fn test_prorate_overflow_is_none() {
        // 30 tablets at a strip price of i64::MAX per 10
        assert!(Money::from_cents(i64::MAX).prorate(30, 10).is_none());
        assert_eq!(
            Money::from_cents(i64::MAX).prorate(10, 10),
            Some(Money::from_cents(i64::MAX))
        );
    }
}
