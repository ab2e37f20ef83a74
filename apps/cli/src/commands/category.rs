//! Category maintenance.

use anyhow::{Context, Result};

use super::CommandContext;
use crate::cli::CategoryCommand;
use crate::render::{print_table, truncate, Table};
use stockroom_core::NewCategory;

pub async fn run(ctx: &CommandContext, command: CategoryCommand) -> Result<()> {
    match command {
        CategoryCommand::List => {
            let categories = ctx
                .db
                .categories()
                .list()
                .await
                .context("failed to list categories")?;

            ctx.emit(&categories, |categories| {
                let mut table =
                    Table::new(&["ID", "Name", "Products", "Description"]).align_right(&[0, 2]);
                for c in categories {
                    table.row(vec![
                        c.id.to_string(),
                        c.name.clone(),
                        c.product_count.to_string(),
                        c.description.as_deref().map(truncate).unwrap_or_default(),
                    ]);
                }
                print_table(&table, "No categories found.");
            })
        }
        CategoryCommand::Add { name, description } => {
            let category = ctx
                .db
                .categories()
                .create(NewCategory { name, description })
                .await
                .context("failed to add category")?;

            ctx.emit(&category, |c| {
                println!("Added category {} ({}).", c.id, c.name)
            })
        }
        CategoryCommand::Delete { id } => {
            ctx.db
                .categories()
                .delete(id)
                .await
                .with_context(|| format!("failed to delete category {id}"))?;

            ctx.emit(&serde_json::json!({ "deleted": id }), |_| {
                println!("Deleted category {id}.")
            })
        }
    }
}
