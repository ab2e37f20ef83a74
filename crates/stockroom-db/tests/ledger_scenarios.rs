//! End-to-end checks of the inventory ledger and reports against a real
//! (in-memory) SQLite database.

use chrono::{Duration, Utc};

use stockroom_core::stock::{StockChangeKind, StockRequest};
use stockroom_core::{CoreError, Money, NewCategory, NewProduct, TransactionType};
use stockroom_db::{Database, DbConfig, DbError};

async fn setup() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

async fn category(db: &Database, name: &str) -> i64 {
    db.categories()
        .create(NewCategory {
            name: name.to_string(),
            description: None,
        })
        .await
        .expect("category")
        .id
}

async fn product(db: &Database, name: &str, price: &str, category_id: Option<i64>, opening: i64) -> i64 {
    db.products()
        .create(
            NewProduct {
                name: name.to_string(),
                description: None,
                price: price.parse().expect("price"),
                category_id,
            },
            opening,
        )
        .await
        .expect("product")
        .id
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn sale_reduces_stock_and_logs_one_transaction() {
    let db = setup().await;
    let laptop = product(&db, "Laptop", "1200.00", None, 20).await;

    let update = db.inventory().record_sale(laptop, 5, None).await.unwrap();
    assert_eq!(update.new_quantity(), 15);

    let history = db.transactions().for_product(laptop).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].quantity, 5);
    assert_eq!(history[0].transaction_type, TransactionType::Sale);
}

#[tokio::test]
async fn oversell_is_rejected_without_side_effects() {
    let db = setup().await;
    let item = product(&db, "Widget", "2.50", None, 100).await;

    let err = db.inventory().record_sale(item, 150, None).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(
        err.as_core(),
        Some(&CoreError::InsufficientStock {
            product_id: item,
            current: 100,
            requested: 150
        })
    );

    assert_eq!(db.inventory().level(item).await.unwrap().quantity, 100);
    assert_eq!(db.transactions().count_for_product(item).await.unwrap(), 0);
}

#[tokio::test]
async fn restock_adds_stock_and_logs_one_transaction() {
    let db = setup().await;
    let phone = product(&db, "Smartphone", "800.00", None, 30).await;

    let update = db.inventory().record_restock(phone, 10, None).await.unwrap();
    assert_eq!(update.new_quantity(), 40);

    let history = db.transactions().for_product(phone).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].quantity, 10);
    assert_eq!(history[0].transaction_type, TransactionType::Restock);
}

#[tokio::test]
async fn low_stock_report_filters_and_orders() {
    let db = setup().await;
    let misc = category(&db, "Misc").await;
    product(&db, "A", "1.00", Some(misc), 8).await;
    product(&db, "B", "1.00", Some(misc), 40).await;
    product(&db, "C", "1.00", Some(misc), 25).await;
    // no category: excluded from the report
    product(&db, "D", "1.00", None, 1).await;

    let lines = db.reports().low_stock(30).await.unwrap();
    let rows: Vec<(&str, i64)> = lines
        .iter()
        .map(|l| (l.product_name.as_str(), l.quantity))
        .collect();
    assert_eq!(rows, vec![("A", 8), ("C", 25)]);
    assert!(lines.iter().all(|l| l.category_name == "Misc"));
}

#[tokio::test]
async fn sales_summary_only_counts_the_window() {
    let db = setup().await;
    let laptop = product(&db, "Laptop", "1200.00", None, 20).await;
    let now = Utc::now();

    db.inventory()
        .apply_movement(StockRequest::sale(laptop, 5).at(now - Duration::days(3)))
        .await
        .unwrap();
    db.inventory()
        .apply_movement(StockRequest::sale(laptop, 3).at(now - Duration::days(40)))
        .await
        .unwrap();
    // restocks never count as revenue
    db.inventory()
        .apply_movement(StockRequest::restock(laptop, 2).at(now - Duration::days(1)))
        .await
        .unwrap();

    let summary = db.reports().sales_summary_at(now, 30).await.unwrap();
    assert_eq!(summary.per_product.len(), 1);
    assert_eq!(summary.per_product[0].units_sold, 5);
    assert_eq!(summary.per_product[0].revenue, Money::from_cents(600_000));
    assert_eq!(summary.total_revenue, Money::from_cents(600_000));
}

#[tokio::test]
async fn sales_revenue_uses_the_current_price() {
    let db = setup().await;
    let mug = product(&db, "Mug", "10.00", None, 10).await;
    db.inventory().record_sale(mug, 2, None).await.unwrap();

    db.products()
        .update(
            mug,
            stockroom_core::ProductUpdate {
                price: Some(Money::from_cents(1250)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let summary = db.reports().sales_summary(30).await.unwrap();
    assert_eq!(summary.total_revenue, Money::from_cents(2500));
}

// =============================================================================
// Properties
// =============================================================================

#[tokio::test]
async fn stock_never_goes_negative_over_a_mixed_sequence() {
    let db = setup().await;
    let item = product(&db, "Gadget", "3.00", None, 5).await;
    let ledger = db.inventory();

    let moves = [
        (StockChangeKind::Sale, 3),
        (StockChangeKind::Sale, 3), // rejected: only 2 left
        (StockChangeKind::Restock, 4),
        (StockChangeKind::Adjustment, -6),
        (StockChangeKind::Adjustment, -1), // rejected
        (StockChangeKind::Restock, 1),
    ];

    let mut accepted = 0;
    for (kind, delta) in moves {
        let before = ledger.level(item).await.unwrap().quantity;
        match ledger.apply_delta(item, delta, kind, None).await {
            Ok(update) => {
                accepted += 1;
                assert!(update.new_quantity() >= 0);
            }
            Err(err) => {
                assert!(matches!(err.as_core(), Some(CoreError::InsufficientStock { .. })));
                assert_eq!(ledger.level(item).await.unwrap().quantity, before);
            }
        }
    }

    assert_eq!(accepted, 4);
    assert_eq!(ledger.level(item).await.unwrap().quantity, 1);
    assert_eq!(db.transactions().count_for_product(item).await.unwrap(), 4);
}

#[tokio::test]
async fn every_nonzero_delta_pairs_with_exactly_one_transaction() {
    let db = setup().await;
    let item = product(&db, "Bolt", "0.10", None, 50).await;
    let ledger = db.inventory();

    for delta in [7, -3, 12, -20] {
        let before = db.transactions().count_for_product(item).await.unwrap();
        let update = ledger
            .apply_delta(item, delta, StockChangeKind::Adjustment, None)
            .await
            .unwrap();
        let after = db.transactions().count_for_product(item).await.unwrap();
        assert_eq!(after, before + 1);

        let tx = update.transaction.unwrap();
        assert_eq!(tx.quantity, i64::abs(delta));
        assert_eq!(tx.signed_quantity(), delta);
    }
}

#[tokio::test]
async fn replaying_transactions_matches_the_live_quantity() {
    let db = setup().await;
    let opening = 25;
    let item = product(&db, "Book", "35.00", None, opening).await;
    let ledger = db.inventory();

    ledger.record_sale(item, 4, None).await.unwrap();
    ledger.record_restock(item, 10, Some("reprint")).await.unwrap();
    ledger.set_quantity(item, 12, Some("stock take")).await.unwrap();
    ledger.apply_delta(item, 0, StockChangeKind::Adjustment, None).await.unwrap();
    let _ = ledger.record_sale(item, 500, None).await.unwrap_err();
    ledger.record_sale(item, 12, None).await.unwrap();

    let result = ledger.reconcile(item, opening).await.unwrap();
    assert!(result.is_consistent());
    assert_eq!(result.stored_quantity, 0);
    assert_eq!(result.transaction_count, 4);
}

#[tokio::test]
async fn zero_adjustment_is_idempotent() {
    let db = setup().await;
    let item = product(&db, "Screw", "0.05", None, 9).await;

    for _ in 0..3 {
        db.inventory()
            .apply_delta(item, 0, StockChangeKind::Adjustment, None)
            .await
            .unwrap();
    }

    assert_eq!(db.inventory().level(item).await.unwrap().quantity, 9);
    assert_eq!(db.transactions().count_for_product(item).await.unwrap(), 0);
}

#[tokio::test]
async fn valuation_total_matches_independent_sum() {
    let db = setup().await;
    stockroom_db::seed::insert_sample_data(&db).await.unwrap();
    db.inventory().record_sale(1, 3, None).await.unwrap();
    db.inventory().record_restock(6, 5, None).await.unwrap();

    let expected: i64 = db
        .products()
        .list()
        .await
        .unwrap()
        .iter()
        .map(|p| p.price_cents * p.quantity.unwrap_or(0))
        .sum();

    let valuation = db.reports().inventory_valuation().await.unwrap();
    assert_eq!(valuation.grand_total, Money::from_cents(expected));
    assert_eq!(
        valuation.grand_total,
        valuation.lines.iter().map(|l| l.total_value).sum::<Money>()
    );
}

#[tokio::test]
async fn category_summary_includes_empty_categories() {
    let db = setup().await;
    stockroom_db::seed::insert_sample_data(&db).await.unwrap();
    category(&db, "Garden").await;

    let lines = db.reports().category_summary().await.unwrap();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0].category_name, "Electronics");
    assert_eq!(lines[0].total_value, Money::from_cents(4_800_000));

    let garden = lines.last().unwrap();
    assert_eq!(garden.category_name, "Garden");
    assert_eq!(garden.product_count, 0);
    assert_eq!(garden.total_units, 0);
    assert!(garden.total_value.is_zero());
}

#[tokio::test]
async fn reports_refuse_values_that_overflow() {
    let db = setup().await;
    let misc = category(&db, "Misc").await;
    let yacht = product(&db, "Yacht", "100000000000.00", Some(misc), 1_000_000).await;

    let err = db.reports().inventory_valuation().await.unwrap_err();
    assert!(matches!(err.as_core(), Some(CoreError::AmountOverflow { .. })));
    assert!(db.reports().high_value(10).await.is_err());
    assert!(db.reports().category_summary().await.is_err());
    assert!(db.inventory().list().await.is_err());

    // the row itself is intact and reports without arithmetic still work
    assert_eq!(db.inventory().level(yacht).await.unwrap().quantity, 1_000_000);
    assert!(db.reports().low_stock(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn locked_database_is_reported_as_busy() {
    let path = std::env::temp_dir().join(format!("stockroom-busy-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let writer = Database::new(DbConfig::new(&path).busy_timeout(std::time::Duration::ZERO))
        .await
        .unwrap();
    let item = product(&writer, "Widget", "2.50", None, 10).await;

    // a second handle takes the write lock and keeps it
    let holder = Database::new(DbConfig::new(&path).run_migrations(false))
        .await
        .unwrap();
    let mut conn = holder.pool().acquire().await.unwrap();
    sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await.unwrap();

    let err = writer.inventory().record_restock(item, 5, None).await.unwrap_err();
    assert!(matches!(err, DbError::Busy(_)), "got {err:?}");
    assert!(err.is_store_unavailable());
    assert!(!err.is_partial_write());

    sqlx::query("ROLLBACK").execute(&mut *conn).await.unwrap();
    drop(conn);

    assert_eq!(writer.inventory().level(item).await.unwrap().quantity, 10);
    assert_eq!(writer.transactions().count_for_product(item).await.unwrap(), 0);
    let update = writer.inventory().record_restock(item, 5, None).await.unwrap();
    assert_eq!(update.new_quantity(), 15);

    holder.close().await;
    writer.close().await;
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}
