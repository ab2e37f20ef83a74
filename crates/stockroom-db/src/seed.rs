//! # Sample Data
//!
//! Loads a small demo catalogue into an empty database.
//!
//! ```text
//! Electronics     Laptop $1200.00 × 20, Smartphone $800.00 × 30
//! Clothing        T-shirt $25.99 × 100, Jeans $45.50 × 50
//! Books           Python Programming $35.00 × 25
//! Home & Kitchen  Coffee Maker $89.99 × 15
//! ```

use serde::Serialize;
use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;
use stockroom_core::{Money, NewCategory, NewProduct};

const CATEGORIES: &[(&str, &str)] = &[
    ("Electronics", "Electronic devices and accessories"),
    ("Clothing", "Apparel and fashion items"),
    ("Books", "Books and publications"),
    ("Home & Kitchen", "Home and kitchen appliances and accessories"),
];

/// (name, description, price in cents, index into CATEGORIES, opening stock)
const PRODUCTS: &[(&str, &str, i64, usize, i64)] = &[
    ("Laptop", "High-performance laptop with 16GB RAM", 120_000, 0, 20),
    ("Smartphone", "Latest model with 128GB storage", 80_000, 0, 30),
    ("T-shirt", "Cotton t-shirt, available in multiple colors", 2599, 1, 100),
    ("Jeans", "Denim jeans, slim fit", 4550, 1, 50),
    ("Python Programming", "Comprehensive guide to Python", 3500, 2, 25),
    ("Coffee Maker", "Automatic coffee maker with timer", 8999, 3, 15),
];

/// What [`insert_sample_data`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
    /// True when the database already had products and nothing was loaded.
    pub skipped: bool,
}

/// Inserts the demo catalogue unless products already exist.
pub async fn insert_sample_data(db: &Database) -> DbResult<SeedSummary> {
    if db.products().count().await? > 0 {
        info!("Products already present, skipping sample data");
        return Ok(SeedSummary {
            categories: 0,
            products: 0,
            skipped: true,
        });
    }

    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (name, description) in CATEGORIES {
        let category = db
            .categories()
            .create(NewCategory {
                name: name.to_string(),
                description: Some(description.to_string()),
            })
            .await?;
        category_ids.push(category.id);
    }

    for (name, description, cents, category, opening) in PRODUCTS {
        db.products()
            .create(
                NewProduct {
                    name: name.to_string(),
                    description: Some(description.to_string()),
                    price: Money::from_cents(*cents),
                    category_id: category_ids.get(*category).copied(),
                },
                *opening,
            )
            .await?;
    }

    info!(
        categories = CATEGORIES.len(),
        products = PRODUCTS.len(),
        "Sample data inserted"
    );

    Ok(SeedSummary {
        categories: CATEGORIES.len(),
        products: PRODUCTS.len(),
        skipped: false,
    })
}
