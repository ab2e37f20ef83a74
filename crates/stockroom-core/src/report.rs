//! # Reports
//!
//! Pure aggregations behind the reporting commands. The database crate
//! fetches flat snapshots; everything here is arithmetic on `Money` and
//! ordering, so every report is exact and testable without a store.
//!
//! ## Report Inputs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  StockSnapshot  = products ⟕ categories ⟕ inventory  (one per product) │
//! │  SaleEntry      = sale transactions since the window start             │
//! │  CategoryListing = every category, including empty ones                │
//! │                                                                         │
//! │  low_stock ─────────── snapshots with category AND inventory           │
//! │  high_value ────────── snapshots with inventory                        │
//! │  inventory_valuation ─ snapshots with inventory                        │
//! │  sales_summary ─────── sale entries × current price                    │
//! │  category_summary ──── categories ⟕ snapshots                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ties are always broken by product id (or category name) ascending so a
//! report is reproducible run to run.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::CategoryListing;

// =============================================================================
// Inputs
// =============================================================================

/// One product with its category and current stock, as fetched for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockSnapshot {
    pub product_id: i64,
    pub product_name: String,
    pub price_cents: i64,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    /// `None` when the product has no inventory row.
    pub quantity: Option<i64>,
}

impl StockSnapshot {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// `price × quantity`; zero without an inventory row.
    pub fn total_value(&self) -> CoreResult<Money> {
        let quantity = self.quantity.unwrap_or(0);
        self.unit_price()
            .checked_multiply_quantity(quantity)
            .ok_or_else(|| CoreError::overflow(format!("value of product {}", self.product_id)))
    }

    fn valuation_line(&self) -> Option<CoreResult<ValuationLine>> {
        let quantity = self.quantity?;
        Some(self.total_value().map(|total_value| ValuationLine {
            product_id: self.product_id,
            product_name: self.product_name.clone(),
            quantity,
            unit_price: self.unit_price(),
            total_value,
        }))
    }
}

/// Checked sum of line values.
fn checked_total<I>(values: I, context: &str) -> CoreResult<Money>
where
    I: IntoIterator<Item = Money>,
{
    values
        .into_iter()
        .try_fold(Money::zero(), |total, value| total.checked_add(value))
        .ok_or_else(|| CoreError::overflow(context))
}

/// Value descending, then product id.
fn by_value_then_id(a: &ValuationLine, b: &ValuationLine) -> std::cmp::Ordering {
    b.total_value
        .cmp(&a.total_value)
        .then(a.product_id.cmp(&b.product_id))
}

fn valuation_lines(snapshots: &[StockSnapshot]) -> CoreResult<Vec<ValuationLine>> {
    let mut lines = snapshots
        .iter()
        .filter_map(StockSnapshot::valuation_line)
        .collect::<CoreResult<Vec<_>>>()?;
    lines.sort_by(by_value_then_id);
    Ok(lines)
}

/// A single sale transaction, reduced to what revenue needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleEntry {
    pub product_id: i64,
    pub quantity: i64,
    pub transaction_date: DateTime<Utc>,
}

/// Closed time interval `[since, until]` for the sales summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesWindow {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl SalesWindow {
    /// The `days`-long window ending at `now`.
    ///
    /// ```rust
    /// use chrono::{Duration, Utc};
    /// use stockroom_core::report::SalesWindow;
    ///
    /// let now = Utc::now();
    /// let window = SalesWindow::ending_at(now, 30);
    /// assert!(window.contains(now - Duration::days(29)));
    /// assert!(!window.contains(now - Duration::days(31)));
    /// ```
    pub fn ending_at(now: DateTime<Utc>, days: i64) -> Self {
        SalesWindow {
            since: now - Duration::days(days),
            until: now,
        }
    }

    #[inline]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.since <= at && at <= self.until
    }
}

// =============================================================================
// Report Records
// =============================================================================

/// Row of the low stock report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockLine {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub category_name: String,
}

/// Row of the high value report and of the inventory valuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationLine {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_value: Money,
}

/// Per-product line of the sales summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSales {
    pub product_id: i64,
    pub product_name: String,
    pub units_sold: i64,
    /// Price at report time, not at sale time.
    pub unit_price: Money,
    pub revenue: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub window: SalesWindow,
    pub per_product: Vec<ProductSales>,
    pub total_revenue: Money,
}

/// Per-category line of the category summary. Empty categories report zeros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummaryLine {
    pub category_id: i64,
    pub category_name: String,
    pub product_count: i64,
    pub total_units: i64,
    pub total_value: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryValuation {
    pub lines: Vec<ValuationLine>,
    pub grand_total: Money,
}

// =============================================================================
// Aggregations
// =============================================================================

/// Products with `quantity < threshold`, fewest units first.
///
/// Products without a category or without an inventory row are left out.
pub fn low_stock(snapshots: &[StockSnapshot], threshold: i64) -> Vec<LowStockLine> {
    let mut lines: Vec<LowStockLine> = snapshots
        .iter()
        .filter_map(|s| {
            let quantity = s.quantity.filter(|q| *q < threshold)?;
            let category_name = s.category_name.clone()?;
            Some(LowStockLine {
                product_id: s.product_id,
                product_name: s.product_name.clone(),
                quantity,
                category_name,
            })
        })
        .collect();

    lines.sort_by_key(|l| (l.quantity, l.product_id));
    lines
}

/// The `limit` most valuable stock positions, by `price × quantity`.
pub fn high_value(snapshots: &[StockSnapshot], limit: usize) -> CoreResult<Vec<ValuationLine>> {
    let mut lines = valuation_lines(snapshots)?;
    lines.truncate(limit);
    Ok(lines)
}

/// Units sold and revenue per product for sales inside `window`.
///
/// Entries outside the window, or for products missing from `snapshots`,
/// are ignored.
pub fn sales_summary(
    snapshots: &[StockSnapshot],
    sales: &[SaleEntry],
    window: SalesWindow,
) -> CoreResult<SalesSummary> {
    let mut units: HashMap<i64, i64> = HashMap::new();
    for sale in sales.iter().filter(|s| window.contains(s.transaction_date)) {
        let sold = units.entry(sale.product_id).or_insert(0);
        *sold = sold
            .checked_add(sale.quantity)
            .ok_or_else(|| CoreError::overflow(format!("units sold of product {}", sale.product_id)))?;
    }

    let mut per_product = snapshots
        .iter()
        .filter_map(|s| {
            let units_sold = *units.get(&s.product_id)?;
            let unit_price = s.unit_price();
            let line = unit_price
                .checked_multiply_quantity(units_sold)
                .map(|revenue| ProductSales {
                    product_id: s.product_id,
                    product_name: s.product_name.clone(),
                    units_sold,
                    unit_price,
                    revenue,
                })
                .ok_or_else(|| CoreError::overflow(format!("revenue of product {}", s.product_id)));
            Some(line)
        })
        .collect::<CoreResult<Vec<_>>>()?;

    per_product.sort_by(|a, b| b.revenue.cmp(&a.revenue).then(a.product_id.cmp(&b.product_id)));
    let total_revenue = checked_total(per_product.iter().map(|p| p.revenue), "total revenue")?;

    Ok(SalesSummary {
        window,
        per_product,
        total_revenue,
    })
}

/// Product count, units and value per category, most valuable first.
pub fn category_summary(
    categories: &[CategoryListing],
    snapshots: &[StockSnapshot],
) -> CoreResult<Vec<CategorySummaryLine>> {
    let mut lines = categories
        .iter()
        .map(|c| -> CoreResult<CategorySummaryLine> {
            let overflow = || CoreError::overflow(format!("totals of category {}", c.name));
            let mut line = CategorySummaryLine {
                category_id: c.id,
                category_name: c.name.clone(),
                product_count: 0,
                total_units: 0,
                total_value: Money::zero(),
            };
            for s in snapshots.iter().filter(|s| s.category_id == Some(c.id)) {
                line.product_count += 1;
                line.total_units = line
                    .total_units
                    .checked_add(s.quantity.unwrap_or(0))
                    .ok_or_else(overflow)?;
                line.total_value = line
                    .total_value
                    .checked_add(s.total_value()?)
                    .ok_or_else(overflow)?;
            }
            Ok(line)
        })
        .collect::<CoreResult<Vec<_>>>()?;

    lines.sort_by(|a, b| {
        b.total_value
            .cmp(&a.total_value)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });
    Ok(lines)
}

/// Every stock position with its value, plus the grand total.
///
/// Lines are ordered like [`high_value`]: value descending, then product id.
pub fn inventory_valuation(snapshots: &[StockSnapshot]) -> CoreResult<InventoryValuation> {
    let lines = valuation_lines(snapshots)?;
    let grand_total = checked_total(lines.iter().map(|l| l.total_value), "inventory grand total")?;

    Ok(InventoryValuation { lines, grand_total })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: i64, name: &str, price_cents: i64, category: Option<(i64, &str)>, quantity: Option<i64>) -> StockSnapshot {
        StockSnapshot {
            product_id: id,
            product_name: name.to_string(),
            price_cents,
            category_id: category.map(|(cid, _)| cid),
            category_name: category.map(|(_, n)| n.to_string()),
            quantity,
        }
    }

    fn listing(id: i64, name: &str) -> CategoryListing {
        CategoryListing {
            id,
            name: name.to_string(),
            description: None,
            product_count: 0,
        }
    }

    fn sample() -> Vec<StockSnapshot> {
        vec![
            snapshot(1, "Laptop", 120_000, Some((1, "Electronics")), Some(20)),
            snapshot(2, "Smartphone", 80_000, Some((1, "Electronics")), Some(30)),
            snapshot(3, "T-shirt", 2599, Some((2, "Clothing")), Some(8)),
            snapshot(4, "Loose Part", 150, None, Some(2)),
            snapshot(5, "Unstocked", 999, Some((2, "Clothing")), None),
        ]
    }

    #[test]
    fn test_low_stock_orders_ascending_and_skips_categoryless() {
        let snapshots = vec![
            snapshot(1, "A", 100, Some((1, "X")), Some(8)),
            snapshot(2, "B", 100, Some((1, "X")), Some(40)),
            snapshot(3, "C", 100, Some((1, "X")), Some(25)),
            snapshot(4, "D", 100, None, Some(1)),
        ];

        let lines = low_stock(&snapshots, 30);
        let quantities: Vec<i64> = lines.iter().map(|l| l.quantity).collect();
        assert_eq!(quantities, vec![8, 25]);
    }

    #[test]
    fn test_low_stock_threshold_is_strict() {
        let snapshots = vec![snapshot(1, "A", 100, Some((1, "X")), Some(10))];
        assert!(low_stock(&snapshots, 10).is_empty());
        assert_eq!(low_stock(&snapshots, 11).len(), 1);
    }

    #[test]
    fn test_high_value_ranks_by_total_value() {
        let lines = high_value(&sample(), 2).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product_name, "Smartphone");
        assert_eq!(lines[0].total_value, Money::from_cents(2_400_000));
        assert_eq!(lines[1].product_name, "Laptop");

        assert!(high_value(&sample(), 0).unwrap().is_empty());
    }

    #[test]
    fn test_high_value_ties_break_by_product_id() {
        let snapshots = vec![
            snapshot(7, "B", 500, None, Some(2)),
            snapshot(3, "A", 1000, None, Some(1)),
        ];
        let ids: Vec<i64> = high_value(&snapshots, 10).unwrap().iter().map(|l| l.product_id).collect();
        assert_eq!(ids, vec![3, 7]);
    }

    #[test]
    fn test_sales_summary_uses_window_and_current_price() {
        let now = Utc::now();
        let window = SalesWindow::ending_at(now, 30);
        let sales = vec![
            SaleEntry {
                product_id: 1,
                quantity: 5,
                transaction_date: now - Duration::days(2),
            },
            SaleEntry {
                product_id: 1,
                quantity: 3,
                transaction_date: now - Duration::days(45),
            },
        ];

        let summary = sales_summary(&sample(), &sales, window).unwrap();
        assert_eq!(summary.per_product.len(), 1);
        assert_eq!(summary.per_product[0].units_sold, 5);
        assert_eq!(summary.per_product[0].revenue, Money::from_cents(600_000));
        assert_eq!(summary.total_revenue, Money::from_cents(600_000));
    }

    #[test]
    fn test_sales_summary_orders_by_revenue() {
        let now = Utc::now();
        let sale = |product_id, quantity| SaleEntry {
            product_id,
            quantity,
            transaction_date: now,
        };
        let sales = vec![sale(3, 10), sale(1, 1), sale(3, 2)];

        let summary = sales_summary(&sample(), &sales, SalesWindow::ending_at(now, 1)).unwrap();
        let ids: Vec<i64> = summary.per_product.iter().map(|p| p.product_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(summary.per_product[1].units_sold, 12);
        assert_eq!(summary.total_revenue, Money::from_cents(120_000 + 12 * 2599));
    }

    #[test]
    fn test_category_summary_reports_zero_for_empty_categories() {
        let categories = vec![
            listing(1, "Electronics"),
            listing(2, "Clothing"),
            listing(3, "Books"),
        ];

        let lines = category_summary(&categories, &sample()).unwrap();
        let names: Vec<&str> = lines.iter().map(|l| l.category_name.as_str()).collect();
        assert_eq!(names, vec!["Electronics", "Clothing", "Books"]);

        assert_eq!(lines[0].product_count, 2);
        assert_eq!(lines[0].total_units, 50);
        assert_eq!(lines[0].total_value, Money::from_cents(4_800_000));

        // the unstocked product is counted but adds no units or value
        assert_eq!(lines[1].product_count, 2);
        assert_eq!(lines[1].total_units, 8);

        assert_eq!(lines[2].product_count, 0);
        assert_eq!(lines[2].total_units, 0);
        assert_eq!(lines[2].total_value, Money::zero());
    }

    #[test]
    fn test_inventory_valuation_grand_total() {
        let valuation = inventory_valuation(&sample()).unwrap();
        assert_eq!(valuation.lines.len(), 4);

        // Laptop and Smartphone tie at $24000.00; the lower id goes first
        let ids: Vec<i64> = valuation.lines.iter().map(|l| l.product_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        let expected = 120_000 * 20 + 80_000 * 30 + 2599 * 8 + 150 * 2;
        assert_eq!(valuation.grand_total, Money::from_cents(expected));
    }

    #[test]
    fn test_inventory_valuation_empty() {
        let valuation = inventory_valuation(&[]).unwrap();
        assert!(valuation.lines.is_empty());
        assert!(valuation.grand_total.is_zero());
    }

    #[test]
    fn test_line_value_overflow_is_an_error() {
        // $100,000,000,000.00 × 1,000,000 does not fit in i64 cents
        let snapshots = vec![
            snapshot(1, "Laptop", 120_000, Some((1, "Electronics")), Some(20)),
            snapshot(2, "Yacht", 10_000_000_000_000, Some((1, "Electronics")), Some(1_000_000)),
        ];
        let categories = vec![listing(1, "Electronics")];
        let now = Utc::now();
        let sales = vec![SaleEntry {
            product_id: 2,
            quantity: 1_000_000,
            transaction_date: now,
        }];

        assert!(matches!(
            inventory_valuation(&snapshots),
            Err(CoreError::AmountOverflow { .. })
        ));
        assert!(matches!(
            high_value(&snapshots, 10),
            Err(CoreError::AmountOverflow { .. })
        ));
        assert!(matches!(
            category_summary(&categories, &snapshots),
            Err(CoreError::AmountOverflow { .. })
        ));
        assert!(matches!(
            sales_summary(&snapshots, &sales, SalesWindow::ending_at(now, 1)),
            Err(CoreError::AmountOverflow { .. })
        ));

        // low stock never multiplies, so it still works
        assert_eq!(low_stock(&snapshots, 100).len(), 1);
    }

    #[test]
    fn test_grand_total_overflow_is_an_error() {
        // each line fits, their sum does not
        let big = i64::MAX / 2 + 1;
        let snapshots = vec![
            snapshot(1, "A", big, None, Some(1)),
            snapshot(2, "B", big, None, Some(1)),
        ];

        let err = inventory_valuation(&snapshots).unwrap_err();
        assert_eq!(err, CoreError::overflow("inventory grand total"));
        assert_eq!(high_value(&snapshots, 10).unwrap().len(), 2);
    }
}
