//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Cart of [{price: 20, qty: 2}, {price: 5, qty: 3}] + $5.99 delivery    │
//! │    in floats: 55 + 5.99 = 60.99 today, 60.989999... tomorrow            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    5500 + 599 = 6099 cents, always                                      │
//! │                                                                         │
//! │  The store speaks decimals ("699.99"). They are converted ONCE, at the │
//! │  boundary, with `Money::from_decimal`. Everything after that is i64.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price = Money::from_cents(2000); // $20.00
//! let line = price * 2i64;             // $40.00
//! let total = line + Money::from_cents(599);
//! assert_eq!(total.to_string(), "$45.99");
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: discounts are subtracted, so intermediate values may
///   go negative even though prices never do
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Single currency**: the storefront prices everything in dollars
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► CartItem line total ──► PriceSummary.subtotal
///                                                │
///                     apply_promo(code) ──► PriceSummary.discount
///                                                │
///                     delivery fee ──────► PriceSummary.total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let price = Money::from_cents(599); // $5.99
    /// assert_eq!(price.cents(), 599);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount in dollars into cents.
    ///
    /// Sub-cent digits are rounded half away from zero, so `19.995`
    /// becomes `$20.00`.
    ///
    /// ## Example
    /// ```rust
    /// use std::str::FromStr;
    /// use rust_decimal::Decimal;
    /// use storefront_core::money::Money;
    ///
    /// let price = Money::from_decimal(Decimal::from_str("699.99").unwrap()).unwrap();
    /// assert_eq!(price.cents(), 69_999);
    /// ```
    pub fn from_decimal(amount: Decimal) -> CoreResult<Self> {
        amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|cents| cents.to_i64())
            .map(Money)
            .ok_or_else(|| CoreError::AmountOutOfRange(amount.to_string()))
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(500); // $5.00
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 1500);
    /// ```
    ///
    /// Saturates at the `i64` bounds instead of overflowing.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Returns `bps` basis points of this amount (1000 bps = 10%).
    ///
    /// ## Implementation
    /// Integer math with half-up rounding: `(amount * bps + 5000) / 10000`.
    /// i128 keeps large carts from overflowing.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(5500); // $55.00
    /// assert_eq!(subtotal.percentage(1000).cents(), 550); // 10% = $5.50
    /// ```
    pub fn percentage(&self, bps: u32) -> Money {
        let cents = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money(cents.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly dollar formatting. The front-end localizes for display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
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
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_decimal_rounds_to_cents() {
        let cases = [
            ("5.99", 599),
            ("20", 2000),
            ("699.99", 69_999),
            ("19.995", 2000),
            ("0.004", 0),
        ];

        for (input, expected) in cases {
            let money = Money::from_decimal(Decimal::from_str(input).unwrap()).unwrap();
            assert_eq!(money.cents(), expected, "input {input}");
        }
    }

    #[test]
    fn test_from_decimal_rejects_overflow() {
        let err = Money::from_decimal(Decimal::MAX).unwrap_err();
        assert!(matches!(err, CoreError::AmountOutOfRange(_)));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(6099)), "$60.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3i64).cents(), 3000);

        let total: Money = [a, b, Money::from_cents(99)].into_iter().sum();
        assert_eq!(total.cents(), 1599);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let price = Money::from_cents(500);

        assert_eq!(price * (i64::MAX / 2), Money::from_cents(i64::MAX));
        assert_eq!(price.multiply_quantity(i64::MAX), Money::from_cents(i64::MAX));

        let total: Money = [Money::from_cents(i64::MAX), price].into_iter().sum();
        assert_eq!(total, Money::from_cents(i64::MAX));
        assert_eq!(Money::from_cents(i64::MIN) - price, Money::from_cents(i64::MIN));
    }

    #[test]
    fn test_percentage() {
        assert_eq!(Money::from_cents(10_000).percentage(1000).cents(), 1000);
        // $0.05 at 10% = 0.5 cent, rounds half up
        assert_eq!(Money::from_cents(5).percentage(1000).cents(), 1);
        assert_eq!(Money::zero().percentage(1000), Money::zero());
    }
}
