//! Reports and demo data.

use anyhow::{Context, Result};
use tracing::info;

use super::CommandContext;
use crate::cli::ReportCommand;
use crate::render::{print_table, valuation_table, Table};

pub async fn run(ctx: &CommandContext, command: ReportCommand) -> Result<()> {
    let reports = ctx.db.reports();
    match command {
        ReportCommand::LowStock { threshold } => {
            let threshold = threshold.unwrap_or(ctx.config.low_stock_threshold);
            let lines = reports
                .low_stock(threshold)
                .await
                .context("failed to build low stock report")?;

            ctx.emit(&lines, |lines| {
                let mut table =
                    Table::new(&["ID", "Product", "Category", "Qty"]).align_right(&[0, 3]);
                for l in lines {
                    table.row(vec![
                        l.product_id.to_string(),
                        l.product_name.clone(),
                        l.category_name.clone(),
                        l.quantity.to_string(),
                    ]);
                }
                print_table(&table, &format!("No products below {threshold} units."));
            })
        }
        ReportCommand::HighValue { limit } => {
            let limit = limit.unwrap_or(ctx.config.high_value_limit);
            let lines = reports
                .high_value(limit)
                .await
                .context("failed to build high value report")?;

            ctx.emit(&lines, |lines| {
                print_table(&valuation_table(lines), "No stock on hand.")
            })
        }
        ReportCommand::Sales { days } => {
            let days = days.unwrap_or(ctx.config.sales_window_days);
            let summary = reports
                .sales_summary(days)
                .await
                .context("failed to build sales summary")?;

            ctx.emit(&summary, |s| {
                println!(
                    "Sales from {} to {}",
                    s.window.since.format("%Y-%m-%d"),
                    s.window.until.format("%Y-%m-%d")
                );
                let mut table = Table::new(&["ID", "Product", "Units", "Unit Price", "Revenue"])
                    .align_right(&[0, 2, 3, 4]);
                for p in &s.per_product {
                    table.row(vec![
                        p.product_id.to_string(),
                        p.product_name.clone(),
                        p.units_sold.to_string(),
                        p.unit_price.to_string(),
                        p.revenue.to_string(),
                    ]);
                }
                print_table(&table, "No sales in this window.");
                println!("Total revenue: {}", s.total_revenue);
            })
        }
        ReportCommand::Categories => {
            let lines = reports
                .category_summary()
                .await
                .context("failed to build category summary")?;

            ctx.emit(&lines, |lines| {
                let mut table = Table::new(&["ID", "Category", "Products", "Units", "Value"])
                    .align_right(&[0, 2, 3, 4]);
                for l in lines {
                    table.row(vec![
                        l.category_id.to_string(),
                        l.category_name.clone(),
                        l.product_count.to_string(),
                        l.total_units.to_string(),
                        l.total_value.to_string(),
                    ]);
                }
                print_table(&table, "No categories found.");
            })
        }
        ReportCommand::Valuation => {
            let valuation = reports
                .inventory_valuation()
                .await
                .context("failed to build inventory valuation")?;

            ctx.emit(&valuation, |v| {
                print_table(&valuation_table(&v.lines), "No stock on hand.");
                println!("Total inventory value: {}", v.grand_total);
            })
        }
    }
}

pub async fn seed(ctx: &CommandContext) -> Result<()> {
    let summary = stockroom_db::seed::insert_sample_data(&ctx.db)
        .await
        .context("failed to load sample data")?;
    info!(?summary, "Seed finished");

    ctx.emit(&summary, |s| {
        if s.skipped {
            println!("Products already exist; sample data not loaded.");
        } else {
            println!(
                "Loaded {} categories and {} products.",
                s.categories, s.products
            );
        }
    })
}
