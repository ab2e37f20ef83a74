//! Product maintenance.

use anyhow::{Context, Result};
use tracing::debug;

use super::CommandContext;
use crate::cli::{AddProductArgs, ProductCommand, UpdateProductArgs};
use crate::render::{or_dash, print_table, truncate, Table};
use stockroom_core::{NewProduct, Product, ProductListing, ProductUpdate};

pub async fn run(ctx: &CommandContext, command: ProductCommand) -> Result<()> {
    match command {
        ProductCommand::List => list(ctx).await,
        ProductCommand::Show { id } => show(ctx, id).await,
        ProductCommand::Add(args) => add(ctx, args).await,
        ProductCommand::Update(args) => update(ctx, args).await,
        ProductCommand::Delete { id } => delete(ctx, id).await,
    }
}

async fn list(ctx: &CommandContext) -> Result<()> {
    let products = ctx
        .db
        .products()
        .list()
        .await
        .context("failed to list products")?;

    ctx.emit(&products, |products| {
        print_table(&listing_table(products), "No products found.")
    })
}

fn listing_table(products: &[ProductListing]) -> Table {
    let mut table =
        Table::new(&["ID", "Name", "Category", "Price", "Stock", "Description"]).align_right(&[0, 3, 4]);
    for p in products {
        table.row(vec![
            p.id.to_string(),
            p.name.clone(),
            or_dash(p.category_name.as_deref()),
            p.price().to_string(),
            or_dash(p.quantity),
            p.description.as_deref().map(truncate).unwrap_or_default(),
        ]);
    }
    table
}

async fn show(ctx: &CommandContext, id: i64) -> Result<()> {
    let product = ctx
        .db
        .products()
        .require(id)
        .await
        .with_context(|| format!("failed to load product {id}"))?;

    ctx.emit(&product, print_product)
}

async fn add(ctx: &CommandContext, args: AddProductArgs) -> Result<()> {
    debug!(name = %args.name, "Adding product");
    let opening = args.quantity;
    let product = ctx
        .db
        .products()
        .create(
            NewProduct {
                name: args.name,
                description: args.description,
                price: args.price,
                category_id: args.category,
            },
            opening,
        )
        .await
        .context("failed to add product")?;

    ctx.emit(&product, |p| {
        println!("Added product {} ({}) with {} in stock.", p.id, p.name, opening)
    })
}

async fn update(ctx: &CommandContext, args: UpdateProductArgs) -> Result<()> {
    let id = args.id;
    let changes = ProductUpdate {
        name: args.name,
        description: args.description,
        price: args.price,
        category_id: args.category,
    };

    let product = ctx
        .db
        .products()
        .update(id, changes)
        .await
        .with_context(|| format!("failed to update product {id}"))?;

    ctx.emit(&product, print_product)
}

async fn delete(ctx: &CommandContext, id: i64) -> Result<()> {
    ctx.db
        .products()
        .delete(id)
        .await
        .with_context(|| format!("failed to delete product {id}"))?;

    ctx.emit(&serde_json::json!({ "deleted": id }), |_| {
        println!("Deleted product {id}.")
    })
}

fn print_product(p: &Product) {
    println!("ID:          {}", p.id);
    println!("Name:        {}", p.name);
    println!("Price:       {}", p.price());
    println!("Category:    {}", or_dash(p.category_id));
    println!("Description: {}", p.description.as_deref().unwrap_or("-"));
    println!("Updated:     {}", p.updated_at.format("%Y-%m-%d %H:%M:%S"));
}
