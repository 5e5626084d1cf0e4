//! # Validation Module
//!
//! Input validation utilities for the storefront.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation (screens / CLI)                                 │
//! │  ├── Form checks before a call is attempted                            │
//! │  └── e.g. validate_full_name before sign-up                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Domain constructors (THIS MODULE via types.rs)               │
//! │  ├── quantity >= 1, price >= 0, rating within 0..=5                    │
//! │  └── Applied to remote payloads as well as local input                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Remote store                                                 │
//! │  ├── Credential checks (duplicate account, bad password)               │
//! │  └── Table constraints                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_full_name, validate_quantity};
//!
//! assert!(validate_full_name("Ada Lovelace").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Highest rating a product can carry.
pub const MAX_RATING: f32 = 5.0;

/// Largest quantity a single cart line may hold.
pub const MAX_QUANTITY: i64 = 9_999;

// =============================================================================
// String Validators
// =============================================================================

/// Rejects empty or whitespace-only values.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates the display name collected on the sign-up form.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
///
/// The session manager does not call this; the form does, before
/// `sign_up` is attempted.
pub fn validate_full_name(full_name: &str) -> ValidationResult<()> {
    let full_name = full_name.trim();
    validate_required("full_name", full_name)?;

    if full_name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "full_name".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Light shape check for an email address (`local@domain`).
///
/// The credential service is the authority; the CLI runs this before
/// sign-in and sign-up to catch typos without a round trip.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    validate_required("email", email)?;

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && domain.contains('.')
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected an address like name@example.com".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query and returns it trimmed.
///
/// ## Rules
/// - Can be empty (no results)
/// - Maximum 100 characters
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be at least 1. Decrementing below 1 is rejected, never zeroed;
///   removing a line is a separate action.
/// - At most [`MAX_QUANTITY`].
///
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart: [-] 1 [+]                                                        │
/// │                                                                         │
/// │  tap [-]  →  set_quantity(item, 0)                                      │
/// │                 │                                                       │
/// │                 ▼                                                       │
/// │  validate_quantity(0) → Err(MustBePositive) → no-op, still shows 1     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 1 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price. Zero is allowed (free items).
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a star rating (0.0 to 5.0 inclusive).
pub fn validate_rating(rating: f32) -> ValidationResult<()> {
    if !(0.0..=MAX_RATING).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 0,
            max: MAX_RATING as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_full_name() {
        assert!(validate_full_name("Ada Lovelace").is_ok());
        assert!(validate_full_name("").is_err());
        assert!(validate_full_name("   ").is_err());
        assert!(validate_full_name(&"A".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email(" ada@example.com ").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("ada").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ada@localhost").is_err());
        assert!(validate_email("ada@@example.com").is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  phone ").unwrap(), "phone");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(250).is_ok());
        assert!(validate_quantity(MAX_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert_eq!(
            validate_quantity(MAX_QUANTITY + 1),
            Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: MAX_QUANTITY,
            })
        );
        assert!(validate_quantity(i64::MAX / 2).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("price", Money::zero()).is_ok());
        assert!(validate_price("price", Money::from_cents(599)).is_ok());
        assert!(validate_price("price", Money::from_cents(-100)).is_err());
    }

    #[test]
    fn test_validate_rating() {
        assert!(validate_rating(0.0).is_ok());
        assert!(validate_rating(4.8).is_ok());
        assert!(validate_rating(5.0).is_ok());
        assert!(validate_rating(5.01).is_err());
        assert!(validate_rating(f32::NAN).is_err());
    }
}
