//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  0.1 + 0.2 == 0.30000000000000004 in IEEE-754                          │
//! │                                                                         │
//! │  HTTP body          Money (inside)         SQLite column                │
//! │  ─────────          ──────────────         ─────────────                │
//! │  100.0      ──►     10000 cents    ──►     total_amount_cents = 10000  │
//! │  19.99      ──►      1999 cents    ──►     price_cents = 1999          │
//! │                                                                         │
//! │  Floats exist only in JSON. Everything past the API edge is cents.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use orderly_core::money::Money;
//!
//! let price = Money::from_cents(1099);
//! assert_eq!(price.to_string(), "$10.99");
//!
//! // Converting from a JSON number rounds to the nearest cent
//! assert_eq!(Money::from_decimal(19.999).unwrap().cents(), 2000);
//! assert!(Money::from_decimal(f64::NAN).is_none());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest whole-unit amount accepted from a float.
///
/// Above 2^53 cents an f64 can no longer represent every cent exactly.
const MAX_DECIMAL: f64 = 90_071_992_547_409.0;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: non-negativity of stored amounts is a validation
///   rule, not a type rule
/// - **Single field tuple struct**: Zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use orderly_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a decimal amount in major units.
    ///
    /// Rounds half away from zero to the nearest cent. Returns `None` for
    /// NaN, infinities and magnitudes an f64 cannot carry to the cent.
    ///
    /// ## Example
    /// ```rust
    /// use orderly_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(50.0).unwrap().cents(), 5000);
    /// assert_eq!(Money::from_decimal(0.125).unwrap().cents(), 13);
    /// assert!(Money::from_decimal(f64::INFINITY).is_none());
    /// ```
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() || amount.abs() > MAX_DECIMAL {
            return None;
        }

        Some(Money((amount * 100.0).round() as i64))
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value as a decimal amount in major units.
    ///
    /// Only for serialization at the API edge; never compute with the result.
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

/// Formats as `$10.99` / `-$5.50` for log lines and event messages.
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

// =============================================================================
// Unit Tests
// =============================================================================
