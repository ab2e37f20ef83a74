//! # Transaction Repository
//!
//! Read access to the append-only transaction log. Rows are only ever
//! inserted by the inventory ledger, through [`append`], inside the same
//! SQLite transaction as the quantity write.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockroom_core::stock::LedgerEntry;
use stockroom_core::{StockTransaction, TransactionListing};

const TRANSACTION_COLUMNS: &str =
    "id, product_id, quantity, transaction_type, transaction_date, notes";

/// Repository for reading recorded stock movements.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// The latest `limit` transactions, newest first, with product names.
    pub async fn recent(&self, limit: usize) -> DbResult<Vec<TransactionListing>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let transactions = sqlx::query_as::<_, TransactionListing>(
            r#"
            SELECT
                t.id,
                t.product_id,
                p.name AS product_name,
                t.quantity,
                t.transaction_type,
                t.transaction_date,
                t.notes
            FROM transactions t
            JOIN products p ON p.id = t.product_id
            ORDER BY t.transaction_date DESC, t.id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = transactions.len(), "Fetched recent transactions");
        Ok(transactions)
    }

    /// Every transaction of one product, oldest first (replay order).
    pub async fn for_product(&self, product_id: i64) -> DbResult<Vec<StockTransaction>> {
        let transactions = sqlx::query_as::<_, StockTransaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE product_id = ?1 ORDER BY id"
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Number of transactions recorded for one product.
    pub async fn count_for_product(&self, product_id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE product_id = ?1")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Total number of transactions.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Appends one transaction row on the caller's connection.
///
/// Returns the raw sqlx error so the ledger can classify the failure stage.
pub(crate) async fn append(
    conn: &mut SqliteConnection,
    product_id: i64,
    entry: LedgerEntry,
    recorded_at: DateTime<Utc>,
    notes: Option<&str>,
) -> Result<StockTransaction, sqlx::Error> {
    sqlx::query_as::<_, StockTransaction>(&format!(
        r#"
        INSERT INTO transactions (product_id, quantity, transaction_type, transaction_date, notes)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING {TRANSACTION_COLUMNS}
        "#
    ))
    .bind(product_id)
    .bind(entry.quantity)
    .bind(entry.transaction_type)
    .bind(recorded_at)
    .bind(notes)
    .fetch_one(conn)
    .await
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use crate::{Database, DbConfig};
    use stockroom_core::stock::StockRequest;
    use stockroom_core::{Money, NewProduct, TransactionType};

    async fn db_with_product() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .create(
                NewProduct {
                    name: "Smartphone".to_string(),
                    description: None,
                    price: Money::from_cents(80_000),
                    category_id: None,
                },
                30,
            )
            .await
            .unwrap();
        (db, product.id)
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let (db, id) = db_with_product().await;
        let now = Utc::now();
        let ledger = db.inventory();

        ledger
            .apply_movement(StockRequest::restock(id, 10).at(now - Duration::days(3)))
            .await
            .unwrap();
        ledger
            .apply_movement(StockRequest::sale(id, 4).with_notes("walk-in").at(now - Duration::days(1)))
            .await
            .unwrap();
        ledger
            .apply_movement(StockRequest::sale(id, 1).at(now - Duration::days(2)))
            .await
            .unwrap();

        let recent = db.transactions().recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].quantity, 4);
        assert_eq!(recent[0].notes.as_deref(), Some("walk-in"));
        assert_eq!(recent[0].product_name, "Smartphone");
        assert_eq!(recent[1].quantity, 1);

        assert!(db.transactions().recent(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_for_product_is_in_append_order() {
        let (db, id) = db_with_product().await;
        db.inventory().record_restock(id, 5, None).await.unwrap();
        db.inventory().record_sale(id, 7, None).await.unwrap();

        let history = db.transactions().for_product(id).await.unwrap();
        let kinds: Vec<TransactionType> = history.iter().map(|t| t.transaction_type).collect();
        assert_eq!(kinds, vec![TransactionType::Restock, TransactionType::Sale]);
        assert_eq!(db.transactions().count_for_product(id).await.unwrap(), 2);
        assert_eq!(db.transactions().count().await.unwrap(), 2);
    }
}
