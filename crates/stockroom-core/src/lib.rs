//! # stockroom-core: Pure Inventory Logic for Stockroom
//!
//! This crate is the **heart** of Stockroom. It decides how stock quantities
//! may change and how reports are derived, as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    stockroom CLI (apps/cli)                     │   │
//! │  │    products ──► sale / restock ──► report ──► table / JSON      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockroom-db (Database Layer)                   │   │
//! │  │       SQLite transactions, repositories, inventory ledger       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ plans & aggregates                     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ stockroom-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   stock   │  │  report   │  │ validation│  │   │
//! │  │   │  Product  │  │  planner  │  │ low stock │  │   rules   │  │   │
//! │  │   │  Category │  │  replay   │  │ valuation │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Category, Product, InventoryLevel, StockTransaction)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//! - [`stock`] - Stock movement planning and transaction replay
//! - [`report`] - Low stock, high value, sales, category and valuation views
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::stock::{plan_delta, StockChangeKind};
//! use stockroom_core::TransactionType;
//!
//! // 20 laptops on hand, sell 5
//! let movement = plan_delta(1, 20, 5, StockChangeKind::Sale).unwrap();
//! assert_eq!(movement.new_quantity, 15);
//!
//! let entry = movement.entry.unwrap();
//! assert_eq!(entry.transaction_type, TransactionType::Sale);
//! assert_eq!(entry.quantity, 5);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod report;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Products with fewer units than this appear in the low stock report.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Number of rows in the high value report.
pub const DEFAULT_HIGH_VALUE_LIMIT: usize = 10;

/// Length of the sales summary window, in days.
pub const DEFAULT_SALES_WINDOW_DAYS: i64 = 30;

/// Number of rows in the recent transactions listing.
pub const DEFAULT_RECENT_TRANSACTIONS: usize = 50;

/// Longest accepted category or product name.
pub const MAX_NAME_LEN: usize = 100;

/// Longest accepted transaction note.
pub const MAX_NOTES_LEN: usize = 500;
