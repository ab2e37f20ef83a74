//! # Repository Module
//!
//! Database repository implementations for Stockroom.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Writes What                                      │
//! │                                                                         │
//! │  CategoryRepository ───► categories                                    │
//! │  ProductRepository ────► products, inventory (opening stock, delete)   │
//! │  InventoryRepository ──► inventory + transactions, always together     │
//! │  TransactionRepository ► read-only                                     │
//! │  ReportRepository ─────► read-only                                     │
//! │                                                                         │
//! │  Rules live in stockroom-core; repositories fetch, hand rows to the    │
//! │  core, and persist the result inside one SQLite transaction.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CategoryRepository`](category::CategoryRepository) - Category CRUD
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD with opening stock
//! - [`InventoryRepository`](inventory::InventoryRepository) - The stock ledger
//! - [`TransactionRepository`](transaction::TransactionRepository) - Transaction history
//! - [`ReportRepository`](report::ReportRepository) - Derived reports

pub mod category;
pub mod inventory;
pub mod product;
pub mod report;
pub mod transaction;

use sqlx::SqliteConnection;

use crate::error::DbResult;
use stockroom_core::CoreError;

/// Fails with `ProductNotFound` unless the product row exists.
pub(crate) async fn ensure_product(conn: &mut SqliteConnection, product_id: i64) -> DbResult<()> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_optional(conn)
        .await?;

    match found {
        Some(_) => Ok(()),
        None => Err(CoreError::ProductNotFound(product_id).into()),
    }
}

/// Fails with `CategoryNotFound` unless the category row exists.
pub(crate) async fn ensure_category(conn: &mut SqliteConnection, category_id: i64) -> DbResult<()> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?1")
        .bind(category_id)
        .fetch_optional(conn)
        .await?;

    match found {
        Some(_) => Ok(()),
        None => Err(CoreError::CategoryNotFound(category_id).into()),
    }
}
