//! Stock ledger commands: sale, restock, adjust, set, list and reconcile.

use anyhow::{Context, Result};

use super::CommandContext;
use crate::cli::{InventoryCommand, MovementArgs};
use crate::render::{print_table, valuation_table};
use stockroom_core::stock::{Reconciliation, StockChangeKind};
use stockroom_db::StockUpdate;

pub async fn run(ctx: &CommandContext, command: InventoryCommand) -> Result<()> {
    let ledger = ctx.db.inventory();
    match command {
        InventoryCommand::List => {
            let lines = ledger.list().await.context("failed to load inventory")?;
            ctx.emit(&lines, |lines| {
                print_table(&valuation_table(lines), "No stock recorded.")
            })
        }
        InventoryCommand::Adjust {
            product_id,
            delta,
            notes,
        } => {
            let update = ledger
                .apply_delta(product_id, delta, StockChangeKind::Adjustment, notes.as_deref())
                .await
                .with_context(|| format!("failed to adjust stock of product {product_id}"))?;
            ctx.emit(&update, |u| print_update("Adjusted", u))
        }
        InventoryCommand::Set {
            product_id,
            quantity,
            notes,
        } => {
            let update = ledger
                .set_quantity(product_id, quantity, notes.as_deref())
                .await
                .with_context(|| format!("failed to set stock of product {product_id}"))?;
            ctx.emit(&update, |u| print_update("Set", u))
        }
        InventoryCommand::Reconcile {
            product_id,
            opening,
        } => {
            let result = ledger
                .reconcile(product_id, opening)
                .await
                .with_context(|| format!("failed to reconcile product {product_id}"))?;
            ctx.emit(&result, print_reconciliation)
        }
    }
}

pub async fn sale(ctx: &CommandContext, args: MovementArgs) -> Result<()> {
    let update = ctx
        .db
        .inventory()
        .record_sale(args.product_id, args.quantity, args.notes.as_deref())
        .await
        .with_context(|| format!("failed to record sale of product {}", args.product_id))?;

    ctx.emit(&update, |u| print_update("Sold", u))
}

pub async fn restock(ctx: &CommandContext, args: MovementArgs) -> Result<()> {
    let update = ctx
        .db
        .inventory()
        .record_restock(args.product_id, args.quantity, args.notes.as_deref())
        .await
        .with_context(|| format!("failed to restock product {}", args.product_id))?;

    ctx.emit(&update, |u| print_update("Restocked", u))
}

fn print_update(verb: &str, update: &StockUpdate) {
    let m = &update.movement;
    if m.is_noop() {
        println!("No change: product {} stays at {}.", m.product_id, m.new_quantity);
        return;
    }
    println!(
        "{verb} product {}: {} -> {} ({:+}).",
        m.product_id,
        m.previous_quantity,
        m.new_quantity,
        m.delta()
    );
    if let Some(tx) = &update.transaction {
        println!("Logged transaction {} ({} x{}).", tx.id, tx.transaction_type, tx.quantity);
    }
}

fn print_reconciliation(r: &Reconciliation) {
    println!("Product:      {}", r.product_id);
    println!("Opening:      {}", r.opening_quantity);
    println!("Transactions: {}", r.transaction_count);
    println!("Replayed:     {}", r.replayed_quantity);
    println!("Stored:       {}", r.stored_quantity);
    if r.is_consistent() {
        println!("Consistent.");
    } else {
        println!("Drift of {:+} units between the log and the stored level.", r.drift());
    }
}
