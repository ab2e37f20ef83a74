//! # Report Repository
//!
//! Fetches the flat rows the reports need and hands them to
//! `stockroom_core::report`. Nothing here writes.
//!
//! ```text
//! ┌──────────────────────┐      ┌───────────────────────────────────────┐
//! │ products             │      │ StockSnapshot (one row per product)   │
//! │  ⟕ categories        │ ───► │   low_stock / high_value / valuation  │
//! │  ⟕ inventory         │      │   category_summary (with categories)  │
//! ├──────────────────────┤      ├───────────────────────────────────────┤
//! │ transactions         │ ───► │ SaleEntry (sales since window start)  │
//! │  WHERE type = 'sale' │      │   sales_summary                       │
//! └──────────────────────┘      └───────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::category::CategoryRepository;
use stockroom_core::report::{
    self, CategorySummaryLine, InventoryValuation, LowStockLine, SaleEntry, SalesSummary,
    SalesWindow, StockSnapshot, ValuationLine,
};
use stockroom_core::validation::{validate_limit, validate_window_days};
use stockroom_core::TransactionType;

/// Repository for derived, read-only views.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Products (with a category) holding fewer than `threshold` units.
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<LowStockLine>> {
        let snapshots = fetch_snapshots(&self.pool).await?;
        let lines = report::low_stock(&snapshots, threshold);

        debug!(threshold, count = lines.len(), "Low stock report");
        Ok(lines)
    }

    /// The `limit` most valuable stock positions.
    pub async fn high_value(&self, limit: i64) -> DbResult<Vec<ValuationLine>> {
        let limit = validate_limit(limit)?;
        let snapshots = fetch_snapshots(&self.pool).await?;
        Ok(report::high_value(&snapshots, limit)?)
    }

    /// Sales over the last `window_days` days, valued at current prices.
    pub async fn sales_summary(&self, window_days: i64) -> DbResult<SalesSummary> {
        self.sales_summary_at(Utc::now(), window_days).await
    }

    /// [`sales_summary`](Self::sales_summary) with an explicit "now".
    pub async fn sales_summary_at(
        &self,
        now: DateTime<Utc>,
        window_days: i64,
    ) -> DbResult<SalesSummary> {
        validate_window_days(window_days)?;
        let window = SalesWindow::ending_at(now, window_days);

        let snapshots = fetch_snapshots(&self.pool).await?;
        let sales = sqlx::query_as::<_, SaleEntry>(
            r#"
            SELECT product_id, quantity, transaction_date
            FROM transactions
            WHERE transaction_type = ?1 AND transaction_date >= ?2
            ORDER BY id
            "#,
        )
        .bind(TransactionType::Sale)
        .bind(window.since)
        .fetch_all(&self.pool)
        .await?;

        debug!(window_days, sales = sales.len(), "Sales summary");
        Ok(report::sales_summary(&snapshots, &sales, window)?)
    }

    /// Per-category product count, units and value; empty categories as zeros.
    pub async fn category_summary(&self) -> DbResult<Vec<CategorySummaryLine>> {
        let categories = CategoryRepository::new(self.pool.clone()).list().await?;
        let snapshots = fetch_snapshots(&self.pool).await?;
        Ok(report::category_summary(&categories, &snapshots)?)
    }

    /// Every stock position and the grand total.
    pub async fn inventory_valuation(&self) -> DbResult<InventoryValuation> {
        let snapshots = fetch_snapshots(&self.pool).await?;
        Ok(report::inventory_valuation(&snapshots)?)
    }
}

/// One row per product, joined with category and inventory.
pub(crate) async fn fetch_snapshots(pool: &SqlitePool) -> DbResult<Vec<StockSnapshot>> {
    let snapshots = sqlx::query_as::<_, StockSnapshot>(
        r#"
        SELECT
            p.id AS product_id,
            p.name AS product_name,
            p.price_cents,
            p.category_id,
            c.name AS category_name,
            i.quantity
        FROM products p
        LEFT JOIN categories c ON c.id = p.category_id
        LEFT JOIN inventory i ON i.product_id = p.id
        ORDER BY p.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(snapshots)
}

// =============================================================================
// Unit Tests
// =============================================================================
