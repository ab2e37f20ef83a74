//! Transaction history.

use anyhow::{Context, Result};

use super::CommandContext;
use crate::cli::TransactionsArgs;
use crate::render::{print_table, Table};

pub async fn recent(ctx: &CommandContext, args: TransactionsArgs) -> Result<()> {
    let limit = args.limit.unwrap_or(ctx.config.recent_limit);
    let rows = ctx
        .db
        .transactions()
        .recent(limit)
        .await
        .context("failed to load transactions")?;

    ctx.emit(&rows, |rows| {
        let mut table =
            Table::new(&["ID", "Date", "Product", "Type", "Qty", "Notes"]).align_right(&[0, 4]);
        for t in rows {
            table.row(vec![
                t.id.to_string(),
                t.transaction_date.format("%Y-%m-%d %H:%M").to_string(),
                t.product_name.clone(),
                t.transaction_type.to_string(),
                t.quantity.to_string(),
                t.notes.clone().unwrap_or_default(),
            ]);
        }
        print_table(&table, "No transactions found.");
    })
}
