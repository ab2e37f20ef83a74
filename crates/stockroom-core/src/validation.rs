//! # Validation Module
//!
//! Pure input validation for Stockroom.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI (clap)                                                   │
//! │  ├── Type parsing (integers, Money strings)                            │
//! │  └── Re-prompting / exit codes are presentation concerns               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Names, prices, quantities, report parameters                      │
//! │  └── Returns Ok / Err, never loops, never prints                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 0), CHECK (quantity > 0)                       │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::validation::{validate_product_name, validate_quantity};
//!
//! assert!(validate_product_name("Laptop").is_ok());
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::{MAX_NAME_LEN, MAX_NOTES_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a product name: non-empty after trimming, at most 100 characters.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_name("product name", name)
}

/// Validates a category name: non-empty after trimming, at most 100 characters.
///
/// ```rust
/// use stockroom_core::validation::validate_category_name;
///
/// assert!(validate_category_name("Electronics").is_ok());
/// assert!(validate_category_name("  ").is_err());
/// ```
pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    validate_name("category name", name)
}

/// Validates optional transaction notes.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    match notes {
        Some(text) if text.chars().count() > MAX_NOTES_LEN => Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LEN,
        }),
        _ => Ok(()),
    }
}

/// Normalizes free text: trims it and turns blank input into `None`.
pub fn normalize_optional_text(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a movement magnitude.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// ## User Workflow
/// ```text
/// stockroom sale 1 0
///      │
///      ▼
/// validate_quantity(0) ← THIS FUNCTION
///      │
///      ├── qty <= 0? → InvalidQuantity
///      │
///      └── OK → plan the movement
/// ```
pub fn validate_quantity(qty: i64) -> CoreResult<()> {
    if qty <= 0 {
        return Err(CoreError::invalid_quantity(
            "quantity",
            qty,
            "must be a positive number of units",
        ));
    }

    Ok(())
}

/// Validates an absolute stock level (opening stock or a `set` target).
pub fn validate_stock_level(qty: i64) -> CoreResult<()> {
    if qty < 0 {
        return Err(CoreError::invalid_quantity(
            "stock level",
            qty,
            "inventory cannot be negative",
        ));
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(120_000).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a report row limit (0 is allowed and yields an empty report).
pub fn validate_limit(limit: i64) -> ValidationResult<usize> {
    usize::try_from(limit).map_err(|_| ValidationError::MustNotBeNegative {
        field: "limit".to_string(),
    })
}

/// Validates a sales window length in days.
///
/// ## Rules
/// - 0 ..= 36500 (zero means "just now", the upper bound keeps date math sane)
pub fn validate_window_days(days: i64) -> ValidationResult<()> {
    if !(0..=36_500).contains(&days) {
        return Err(ValidationError::OutOfRange {
            field: "window days".to_string(),
            min: 0,
            max: 36_500,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
