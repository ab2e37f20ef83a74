//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockroom-db errors (separate crate)                                  │
//! │  └── DbError          - Store failures, wraps CoreError                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → CLI (anyhow)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `CoreError` is raised before anything is written, so a caller that
//! receives one knows the store is untouched.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Category cannot be found.
    ///
    /// ## When This Occurs
    /// - Assigning a product to a category id that doesn't exist
    /// - Deleting a category that was already removed
    #[error("Category not found: {0}")]
    CategoryNotFound(i64),

    /// A sale (or downward adjustment) would drive stock below zero.
    ///
    /// ## User Workflow
    /// ```text
    /// stockroom sale 1 150
    ///      │
    ///      ▼
    /// Read stock: current=100
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 1, current: 100, requested: 150 }
    ///      │
    ///      ▼
    /// Nothing written, quantity stays 100
    /// ```
    #[error("Insufficient stock for product {product_id}: current {current}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        current: i64,
        requested: i64,
    },

    /// A quantity is zero or negative where a positive magnitude is required,
    /// or a target level is negative.
    #[error("Invalid {field} {value}: {reason}")]
    InvalidQuantity {
        field: String,
        value: i64,
        reason: String,
    },

    /// A monetary or unit total does not fit in 64 bits.
    ///
    /// Raised by the reports when `price × quantity`, or a sum of such
    /// values, overflows. Stored data is left as it is.
    #[error("Amount out of range while computing {context}")]
    AmountOverflow { context: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidQuantity error.
    pub fn invalid_quantity(field: impl Into<String>, value: i64, reason: impl Into<String>) -> Self {
        CoreError::InvalidQuantity {
            field: field.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Creates an AmountOverflow error.
    pub fn overflow(context: impl Into<String>) -> Self {
        CoreError::AmountOverflow {
            context: context.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
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

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., a price with three decimals).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
