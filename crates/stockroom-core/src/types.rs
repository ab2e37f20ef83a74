//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐        ┌─────────────────┐                        │
//! │  │    Category     │ 1    N │     Product     │                        │
//! │  │  ─────────────  │◄───────│  ─────────────  │                        │
//! │  │  id             │        │  id             │                        │
//! │  │  name           │        │  name           │                        │
//! │  │  description    │        │  price_cents    │                        │
//! │  └─────────────────┘        │  category_id    │                        │
//! │                             └────────┬────────┘                        │
//! │                          1:1         │        1:N                       │
//! │                  ┌───────────────────┴──────────────────┐              │
//! │                  ▼                                      ▼              │
//! │  ┌─────────────────────────┐        ┌──────────────────────────────┐   │
//! │  │     InventoryLevel      │        │       StockTransaction       │   │
//! │  │  ─────────────────────  │        │  ──────────────────────────  │   │
//! │  │  product_id (unique)    │        │  quantity (> 0)              │   │
//! │  │  quantity (>= 0)        │        │  transaction_type            │   │
//! │  └─────────────────────────┘        │  transaction_date, notes     │   │
//! │                                     └──────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Row types derive `sqlx::FromRow` behind the `sqlx` feature so the
//! database crate can decode them directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A category together with the number of products assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CategoryListing {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub product_count: i64,
}

/// Input for creating a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// A product tracked by the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Store-assigned identifier.
    pub id: i64,

    /// Display name (never empty).
    pub name: String,

    /// Optional free-text description.
    pub description: Option<String>,

    /// Current unit price in cents. Not historized: reports always use
    /// the price as it is when the report runs.
    pub price_cents: i64,

    /// Owning category, if any.
    pub category_id: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// A product joined with its category name and current stock.
///
/// `category_name` is `None` for categoryless products and `quantity` is
/// `None` for products that never received stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductListing {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub quantity: Option<i64>,
}

impl ProductListing {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub category_id: Option<i64>,
}

/// Partial product update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub category_id: Option<i64>,
}

impl ProductUpdate {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category_id.is_none()
    }
}

// =============================================================================
// Inventory Level
// =============================================================================

/// The current on-hand quantity of one product.
///
/// ## Invariant
/// `quantity >= 0`, always. Only the inventory ledger changes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryLevel {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub last_updated: DateTime<Utc>,
}

// =============================================================================
// Transaction Type
// =============================================================================

/// Direction of a recorded stock movement.
///
/// The sign lives here, never in `StockTransaction::quantity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Stock left the building.
    Sale,
    /// Stock was replenished.
    Restock,
}

impl TransactionType {
    /// Returns `quantity` with the sign this type implies.
    ///
    /// ```rust
    /// use stockroom_core::TransactionType;
    ///
    /// assert_eq!(TransactionType::Sale.signed(5), -5);
    /// assert_eq!(TransactionType::Restock.signed(5), 5);
    /// ```
    #[inline]
    pub const fn signed(&self, quantity: i64) -> i64 {
        match self {
            TransactionType::Sale => -quantity,
            TransactionType::Restock => quantity,
        }
    }

    /// Lowercase name as stored in the database.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Sale => "sale",
            TransactionType::Restock => "restock",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Stock Transaction
// =============================================================================

/// An append-only record of one stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockTransaction {
    pub id: i64,
    pub product_id: i64,
    /// Magnitude of the change, always > 0.
    pub quantity: i64,
    pub transaction_type: TransactionType,
    pub transaction_date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl StockTransaction {
    /// The movement as a signed delta.
    #[inline]
    pub fn signed_quantity(&self) -> i64 {
        self.transaction_type.signed(self.quantity)
    }
}

/// A transaction joined with its product name, for history listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionListing {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub transaction_type: TransactionType,
    pub transaction_date: DateTime<Utc>,
    pub notes: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
