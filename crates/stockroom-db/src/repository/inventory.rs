//! # Inventory Repository
//!
//! The stock ledger: the only code that writes `inventory.quantity`, and it
//! never does so without appending the matching `transactions` row.
//!
//! ## One Movement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_sale(product 1, 5)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │    product exists?                 no ──► ProductNotFound, ROLLBACK    │
//! │    SELECT quantity  ─► 20                                              │
//! │    plan_delta(20, 5, Sale)         rejected ──► InsufficientStock /    │
//! │       │                                        InvalidQuantity, ROLLBACK│
//! │       ▼                                                                 │
//! │    UPDATE inventory SET quantity = 15                                  │
//! │      WHERE product_id = 1 AND quantity = 20   (compare-and-swap)       │
//! │       │   0 rows ──► ConcurrentModification, ROLLBACK                  │
//! │       ▼                                                                 │
//! │    INSERT transactions (1, 5, 'sale')                                  │
//! │       │   fails ──► PartialWrite { stage: "append_transaction" }       │
//! │       ▼                                                                 │
//! │  COMMIT                                                                 │
//! │       │   fails ──► PartialWrite { stage: "commit" }                   │
//! │       ▼                                                                 │
//! │  StockUpdate { new_quantity: 15, transaction: Some(#n) }               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A product without an inventory row counts as holding zero units. A
//! restock (or upward correction) creates the row; a sale against it is
//! `InsufficientStock`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::report::fetch_snapshots;
use crate::repository::transaction::{self, TransactionRepository};
use crate::repository::ensure_product;
use stockroom_core::report::{inventory_valuation, ValuationLine};
use stockroom_core::stock::{
    plan_delta, plan_set, reconcile, Reconciliation, StockChangeKind, StockMovement, StockRequest,
};
use stockroom_core::validation::{normalize_optional_text, validate_notes, validate_quantity};
use stockroom_core::{CoreResult, InventoryLevel, StockTransaction};

/// Result of a committed (or no-op) stock change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdate {
    pub movement: StockMovement,
    /// The appended row; `None` for a zero net change.
    pub transaction: Option<StockTransaction>,
}

impl StockUpdate {
    #[inline]
    pub fn new_quantity(&self) -> i64 {
        self.movement.new_quantity
    }
}

/// Repository for stock levels and the movements that change them.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Applies a relative change.
    ///
    /// * `Sale` / `Restock` - `|delta|` units out / in; zero is `InvalidQuantity`
    /// * `Adjustment` - signed; zero is a silent no-op
    pub async fn apply_delta(
        &self,
        product_id: i64,
        delta: i64,
        kind: StockChangeKind,
        notes: Option<&str>,
    ) -> DbResult<StockUpdate> {
        let mut request = StockRequest::new(product_id, delta, kind);
        request.notes = notes.map(str::to_string);
        self.apply_movement(request).await
    }

    /// Applies a fully specified request, including its timestamp.
    pub async fn apply_movement(&self, request: StockRequest) -> DbResult<StockUpdate> {
        let StockRequest {
            product_id,
            delta,
            kind,
            notes,
            recorded_at,
        } = request;

        self.execute(product_id, notes, recorded_at, |current| {
            plan_delta(product_id, current, delta, kind)
        })
        .await
    }

    /// Sets the level to an absolute value.
    ///
    /// A non-zero net change is recorded as a restock (up) or sale (down) so
    /// the log still replays to the stored level.
    pub async fn set_quantity(
        &self,
        product_id: i64,
        new_quantity: i64,
        notes: Option<&str>,
    ) -> DbResult<StockUpdate> {
        self.execute(product_id, notes.map(str::to_string), None, |current| {
            plan_set(product_id, current, new_quantity)
        })
        .await
    }

    /// Sells `quantity` (> 0) units. Never clamps: an oversell fails whole.
    pub async fn record_sale(
        &self,
        product_id: i64,
        quantity: i64,
        notes: Option<&str>,
    ) -> DbResult<StockUpdate> {
        validate_quantity(quantity)?;
        self.apply_delta(product_id, quantity, StockChangeKind::Sale, notes)
            .await
    }

    /// Restocks `quantity` (> 0) units.
    pub async fn record_restock(
        &self,
        product_id: i64,
        quantity: i64,
        notes: Option<&str>,
    ) -> DbResult<StockUpdate> {
        validate_quantity(quantity)?;
        self.apply_delta(product_id, quantity, StockChangeKind::Restock, notes)
            .await
    }

    async fn execute<F>(
        &self,
        product_id: i64,
        notes: Option<String>,
        recorded_at: Option<DateTime<Utc>>,
        plan: F,
    ) -> DbResult<StockUpdate>
    where
        F: FnOnce(i64) -> CoreResult<StockMovement>,
    {
        let notes = normalize_optional_text(notes);
        validate_notes(notes.as_deref())?;
        let recorded_at = recorded_at.unwrap_or_else(Utc::now);

        let mut tx = self.pool.begin().await?;

        ensure_product(&mut tx, product_id).await?;
        let stored = current_quantity(&mut tx, product_id).await?;

        let movement = plan(stored.unwrap_or(0)).map_err(|err| {
            warn!(product_id, error = %err, "Stock change rejected");
            DbError::from(err)
        })?;

        let Some(entry) = movement.entry else {
            debug!(product_id, quantity = movement.new_quantity, "No net change, nothing written");
            return Ok(StockUpdate {
                movement,
                transaction: None,
            });
        };

        write_quantity(&mut tx, stored, &movement, recorded_at).await?;

        let appended =
            match transaction::append(&mut tx, product_id, entry, recorded_at, notes.as_deref()).await
            {
                Ok(row) => row,
                Err(err) => {
                    warn!(product_id, error = %err, "Transaction insert failed, rolling back");
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!(product_id, error = %rollback_err, "Rollback failed");
                    }
                    return Err(DbError::partial_write(product_id, "append_transaction", err));
                }
            };

        tx.commit()
            .await
            .map_err(|err| DbError::partial_write(product_id, "commit", err))?;

        info!(
            product_id,
            transaction_type = %entry.transaction_type,
            quantity = entry.quantity,
            previous = movement.previous_quantity,
            new_quantity = movement.new_quantity,
            "Stock movement committed"
        );

        Ok(StockUpdate {
            movement,
            transaction: Some(appended),
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current inventory row of one product.
    pub async fn level(&self, product_id: i64) -> DbResult<InventoryLevel> {
        let mut conn = self.pool.acquire().await?;
        ensure_product(&mut conn, product_id).await?;

        let level = sqlx::query_as::<_, InventoryLevel>(
            "SELECT id, product_id, quantity, last_updated FROM inventory WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;

        level.ok_or_else(|| DbError::not_found("Inventory", product_id))
    }

    /// All stocked products with their value, largest quantity first.
    pub async fn list(&self) -> DbResult<Vec<ValuationLine>> {
        let snapshots = fetch_snapshots(&self.pool).await?;
        let mut lines = inventory_valuation(&snapshots)?.lines;
        lines.sort_by(|a, b| b.quantity.cmp(&a.quantity).then(a.product_id.cmp(&b.product_id)));
        Ok(lines)
    }

    /// Replays a product's transactions from `opening_quantity` and compares
    /// the result with the stored level.
    pub async fn reconcile(&self, product_id: i64, opening_quantity: i64) -> DbResult<Reconciliation> {
        let mut conn = self.pool.acquire().await?;
        ensure_product(&mut conn, product_id).await?;
        let stored = current_quantity(&mut conn, product_id).await?.unwrap_or(0);
        drop(conn);

        let history = TransactionRepository::new(self.pool.clone())
            .for_product(product_id)
            .await?;
        let result = reconcile(product_id, opening_quantity, stored, &history);

        if result.is_consistent() {
            debug!(product_id, stored, "Ledger consistent");
        } else {
            warn!(
                product_id,
                stored,
                replayed = result.replayed_quantity,
                drift = result.drift(),
                "Ledger drift detected"
            );
        }
        Ok(result)
    }
}

// =============================================================================
// Statement Helpers
// =============================================================================

async fn current_quantity(conn: &mut SqliteConnection, product_id: i64) -> DbResult<Option<i64>> {
    let quantity: Option<i64> =
        sqlx::query_scalar("SELECT quantity FROM inventory WHERE product_id = ?1")
            .bind(product_id)
            .fetch_optional(conn)
            .await?;

    Ok(quantity)
}

/// Compare-and-swap on the value read earlier in the same transaction, or
/// insert when the product had no inventory row.
async fn write_quantity(
    conn: &mut SqliteConnection,
    stored: Option<i64>,
    movement: &StockMovement,
    at: DateTime<Utc>,
) -> DbResult<()> {
    let product_id = movement.product_id;

    match stored {
        Some(expected) => {
            let result = sqlx::query(
                r#"
                UPDATE inventory
                SET quantity = ?1, last_updated = ?2
                WHERE product_id = ?3 AND quantity = ?4
                "#,
            )
            .bind(movement.new_quantity)
            .bind(at)
            .bind(product_id)
            .bind(expected)
            .execute(conn)
            .await?;

            if result.rows_affected() == 0 {
                warn!(product_id, expected, "Inventory changed underneath the update");
                return Err(DbError::ConcurrentModification { product_id });
            }
        }
        None => {
            sqlx::query("INSERT INTO inventory (product_id, quantity, last_updated) VALUES (?1, ?2, ?3)")
                .bind(product_id)
                .bind(movement.new_quantity)
                .bind(at)
                .execute(conn)
                .await?;
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
