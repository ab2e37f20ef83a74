//! Argument definitions.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use stockroom_core::Money;

#[derive(Debug, Parser)]
#[command(
    name = "stockroom",
    version,
    about = "Inventory tracking with a transactional stock ledger"
)]
pub struct Cli {
    /// SQLite database file (overrides STOCKROOM_DB_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage products
    #[command(subcommand)]
    Products(ProductCommand),

    /// Manage categories
    #[command(subcommand)]
    Categories(CategoryCommand),

    /// Inspect and correct stock levels
    #[command(subcommand)]
    Inventory(InventoryCommand),

    /// Record a sale
    Sale(MovementArgs),

    /// Record a restock
    Restock(MovementArgs),

    /// Show recent stock transactions
    Transactions(TransactionsArgs),

    /// Derived reports
    #[command(subcommand)]
    Report(ReportCommand),

    /// Load the demo catalogue into an empty database
    Seed,
}

// =============================================================================
// Products & Categories
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// List every product with category and stock
    List,
    /// Show one product
    Show { id: i64 },
    /// Add a product with its opening stock
    Add(AddProductArgs),
    /// Change product fields
    Update(UpdateProductArgs),
    /// Delete a product that has no recorded transactions
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct AddProductArgs {
    pub name: String,

    /// Unit price, e.g. 25.99
    #[arg(long)]
    pub price: Money,

    #[arg(long)]
    pub description: Option<String>,

    /// Category id
    #[arg(long)]
    pub category: Option<i64>,

    /// Opening stock
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub quantity: i64,
}

#[derive(Debug, Args)]
pub struct UpdateProductArgs {
    pub id: i64,

    #[arg(long)]
    pub name: Option<String>,

    /// New description; an empty string clears it
    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub price: Option<Money>,

    /// Category id
    #[arg(long)]
    pub category: Option<i64>,
}

#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    /// List categories with product counts
    List,
    /// Add a category
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a category that no product uses
    Delete { id: i64 },
}

// =============================================================================
// Stock
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum InventoryCommand {
    /// Current levels and values, largest quantity first
    List,
    /// Apply a signed adjustment
    Adjust {
        product_id: i64,
        #[arg(allow_negative_numbers = true)]
        delta: i64,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Set an absolute level
    Set {
        product_id: i64,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Replay the transaction log against the stored level
    Reconcile {
        product_id: i64,
        /// Opening stock the product was created with
        #[arg(long)]
        opening: i64,
    },
}

#[derive(Debug, Args)]
pub struct MovementArgs {
    pub product_id: i64,

    #[arg(allow_negative_numbers = true)]
    pub quantity: i64,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Args)]
pub struct TransactionsArgs {
    /// Number of rows (defaults to STOCKROOM_RECENT_LIMIT)
    #[arg(long)]
    pub limit: Option<usize>,
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Products below a stock threshold
    LowStock {
        #[arg(long, allow_negative_numbers = true)]
        threshold: Option<i64>,
    },
    /// Most valuable stock positions
    HighValue {
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },
    /// Units sold and revenue over a window
    Sales {
        #[arg(long, allow_negative_numbers = true)]
        days: Option<i64>,
    },
    /// Products, units and value per category
    Categories,
    /// Every stock position and the grand total
    Valuation,
}
