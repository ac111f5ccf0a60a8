//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  An order total compared against a running payment sum with floats     │
//! │  needs an epsilon fudge factor. With integer cents the comparison is   │
//! │  exact: paid >= total, full stop.                                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every monetary value in Vendra - product prices, order totals, payment
//! amounts, expense amounts - is stored and computed in cents (i64).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and corrections
/// - **Single field tuple struct**: Zero-cost abstraction over i64
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
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
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity (line totals).
    ///
    /// Saturates at the i64 bounds rather than wrapping, so an absurd
    /// price × quantity pair can never come out negative.
    ///
    /// ## Example
    /// ```rust
    /// use vendra_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(10_000); // 100.00
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 30_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Saturating subtraction floored at zero.
    ///
    /// Used for "remaining payable" arithmetic where a fully paid order
    /// must report zero remaining, never a negative amount.
    #[inline]
    pub const fn remaining_after(&self, paid: Money) -> Self {
        let rest = self.0 - paid.0;
        if rest < 0 {
            Money(0)
        } else {
            Money(rest)
        }
    }
}

/// Computes an order total from `(quantity, unit_price_cents)` lines.
///
/// Totals are always server-computed from the lines; client-submitted
/// totals are ignored to prevent tampering. Line and sum arithmetic
/// saturate at the i64 bounds.
pub fn order_total(lines: &[(i64, i64)]) -> Money {
    Money::from_cents(
        lines
            .iter()
            .map(|(qty, price)| qty.saturating_mul(*price))
            .fold(0i64, i64::saturating_add),
    )
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// For debugging and audit-log text. UI formatting/localization is the
/// frontend's job.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
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

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply_quantity(3).cents(), 3000);
    }

    #[test]
    fn test_remaining_after_floors_at_zero() {
        let total = Money::from_cents(30_000);
        assert_eq!(total.remaining_after(Money::from_cents(10_000)).cents(), 20_000);
        assert_eq!(total.remaining_after(Money::from_cents(30_000)).cents(), 0);
        assert_eq!(total.remaining_after(Money::from_cents(40_000)).cents(), 0);
    }

    #[test]
    fn test_order_total_from_lines() {
        // 3 × 100.00 + 5 × 50.00 = 550.00
        let lines = vec![(3, 10_000), (5, 5_000)];
        assert_eq!(order_total(&lines).cents(), 55_000);
    }

    #[test]
    fn test_order_total_empty() {
        assert!(order_total(&[]).is_zero());
    }

    #[test]
    fn test_multiplication_saturates_instead_of_wrapping() {
        let absurd = Money::from_cents(i64::MAX);
        assert_eq!(absurd.multiply_quantity(2).cents(), i64::MAX);
        assert!(!absurd.multiply_quantity(1_000).is_negative());

        let total = order_total(&[(2, i64::MAX), (3, i64::MAX)]);
        assert_eq!(total.cents(), i64::MAX);
    }
}
