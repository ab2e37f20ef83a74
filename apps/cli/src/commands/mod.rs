//! # Commands
//!
//! One module per command group. Each handler calls a repository, then
//! renders the result as a table or, with `--json`, as the raw record.
//!
//! ```text
//! commands/
//! ├── mod.rs        ◄─── dispatch + shared context
//! ├── product.rs    ◄─── products list|show|add|update|delete
//! ├── category.rs   ◄─── categories list|add|delete
//! ├── inventory.rs  ◄─── sale, restock, inventory adjust|set|list|reconcile
//! ├── transaction.rs◄─── transactions
//! └── report.rs     ◄─── report *, seed
//! ```

mod category;
mod inventory;
mod product;
mod report;
mod transaction;

use anyhow::Result;
use serde::Serialize;

use crate::cli::Command;
use crate::config::AppConfig;
use crate::render;
use stockroom_db::Database;

/// What every handler gets.
pub struct CommandContext {
    pub db: Database,
    pub config: AppConfig,
    pub json: bool,
}

impl CommandContext {
    /// Prints `value` as JSON, or runs `table` to print it for humans.
    pub fn emit<T, F>(&self, value: &T, table: F) -> Result<()>
    where
        T: Serialize,
        F: FnOnce(&T),
    {
        if self.json {
            render::print_json(value)
        } else {
            table(value);
            Ok(())
        }
    }
}

pub async fn dispatch(ctx: &CommandContext, command: Command) -> Result<()> {
    match command {
        Command::Products(cmd) => product::run(ctx, cmd).await,
        Command::Categories(cmd) => category::run(ctx, cmd).await,
        Command::Inventory(cmd) => inventory::run(ctx, cmd).await,
        Command::Sale(args) => inventory::sale(ctx, args).await,
        Command::Restock(args) => inventory::restock(ctx, args).await,
        Command::Transactions(args) => transaction::recent(ctx, args).await,
        Command::Report(cmd) => report::run(ctx, cmd).await,
        Command::Seed => report::seed(ctx).await,
    }
}
