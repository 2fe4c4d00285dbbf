//! # Validation Module
//!
//! Input validation for Orderly requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractors (axum)                                       │
//! │  ├── JSON shape and field types (deserialization)                      │
//! │  └── Malformed body / query → 422 before any handler runs              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Order service                                                │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use orderly_core::validation::{validate_amount, validate_quantity};
//!
//! let total = validate_amount("total_amount", 100.0).unwrap();
//! assert_eq!(total.cents(), 10_000);
//!
//! validate_quantity(2).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_LINE_QUANTITY, MAX_PAGE_LIMIT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_CUSTOMER_NAME_LEN: usize = 200;
const MAX_PRODUCT_NAME_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 2000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty or whitespace only
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use orderly_core::validation::validate_customer_name;
///
/// assert_eq!(validate_customer_name("  Ada ").unwrap(), "Ada");
/// assert!(validate_customer_name("   ").is_err());
/// ```
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    required_text("customer_name", name, MAX_CUSTOMER_NAME_LEN)
}

/// Validates a product name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    required_text("name", name, MAX_PRODUCT_NAME_LEN)
}

/// Validates an optional product description. Missing becomes empty.
pub fn validate_description(description: Option<&str>) -> ValidationResult<String> {
    let description = description.unwrap_or_default().trim();

    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    Ok(description.to_string())
}

fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a monetary amount received as a JSON number.
///
/// ## Rules
/// - Must be finite (no NaN / infinity)
/// - Must not be negative (zero is allowed)
///
/// ## Flow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  POST /orders/ {"total_amount": 100.0}                                  │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_amount("total_amount", 100.0) ← THIS FUNCTION                 │
/// │       │                                                                 │
/// │       ├── not finite?  → InvalidFormat                                  │
/// │       ├── < 0?         → MustNotBeNegative                              │
/// │       └── OK           → Money(10000)                                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_amount(field: &str, amount: f64) -> ValidationResult<Money> {
    let money = Money::from_decimal(amount).ok_or_else(|| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a finite amount".to_string(),
    })?;

    if money.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(money)
}

/// Validates an order line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a listing page size.
pub fn validate_page_limit(limit: u32) -> ValidationResult<()> {
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: i64::from(MAX_PAGE_LIMIT),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
