//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Create with opening stock (product + inventory row, one transaction)
//! - Partial update
//! - Delete (inventory row + product, one transaction)
//! - Listing joined with category name and current quantity
//!
//! ## Opening Stock
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(product, opening_quantity = 20)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │    INSERT products  ─────────► id = 7                                  │
//! │    INSERT inventory (7, 20)    ← Q0 of the replay, no transaction row  │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Every later change goes through the inventory ledger, so              │
//! │  20 + Σ signed(transactions of 7) == inventory.quantity, always.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{ensure_category, ensure_product};
use stockroom_core::validation::{
    normalize_optional_text, validate_price_cents, validate_product_name, validate_stock_level,
};
use stockroom_core::{CoreError, NewProduct, Product, ProductListing, ProductUpdate};

const PRODUCT_COLUMNS: &str =
    "id, name, description, price_cents, category_id, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let laptop = repo.create(new_product, 20).await?;
/// let listing = repo.list().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product together with its opening stock.
    ///
    /// ## Arguments
    /// * `product` - Name, description, price and optional category
    /// * `opening_quantity` - Initial inventory level (>= 0)
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product with generated id
    /// * `Err(DbError::Domain)` - Invalid input or unknown category; nothing written
    pub async fn create(&self, product: NewProduct, opening_quantity: i64) -> DbResult<Product> {
        let name = product.name.trim().to_string();
        validate_product_name(&name)?;
        validate_price_cents(product.price.cents())?;
        validate_stock_level(opening_quantity)?;
        let description = normalize_optional_text(product.description);

        debug!(name = %name, opening_quantity, "Creating product");

        let mut tx = self.pool.begin().await?;

        if let Some(category_id) = product.category_id {
            ensure_category(&mut tx, category_id).await?;
        }

        let now = Utc::now();
        let created = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (name, description, price_cents, category_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&name)
        .bind(&description)
        .bind(product.price.cents())
        .bind(product.category_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO inventory (product_id, quantity, last_updated) VALUES (?1, ?2, ?3)")
            .bind(created.id)
            .bind(opening_quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id = created.id, name = %created.name, opening_quantity, "Product created");
        Ok(created)
    }

    /// Gets a product by its ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Like [`get`](Self::get), but a missing row is `ProductNotFound`.
    pub async fn require(&self, id: i64) -> DbResult<Product> {
        self.get(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id).into())
    }

    /// Lists all products with category name and current quantity, by id.
    ///
    /// Products without a category or without stock are included with
    /// `None` in the joined columns.
    pub async fn list(&self) -> DbResult<Vec<ProductListing>> {
        let products = sqlx::query_as::<_, ProductListing>(
            r#"
            SELECT
                p.id,
                p.name,
                p.description,
                p.price_cents,
                p.category_id,
                c.name AS category_name,
                i.quantity
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            LEFT JOIN inventory i ON i.product_id = p.id
            ORDER BY p.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Applies a partial update.
    ///
    /// `None` fields keep their stored value; a blank description clears it.
    /// An empty update returns the product unchanged.
    pub async fn update(&self, id: i64, update: ProductUpdate) -> DbResult<Product> {
        if update.is_empty() {
            return self.require(id).await;
        }

        debug!(id, "Updating product");

        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CoreError::ProductNotFound(id))?;

        let name = match update.name {
            Some(name) => {
                let name = name.trim().to_string();
                validate_product_name(&name)?;
                name
            }
            None => current.name,
        };
        let description = match update.description {
            Some(text) => normalize_optional_text(Some(text)),
            None => current.description,
        };
        let price_cents = match update.price {
            Some(price) => {
                validate_price_cents(price.cents())?;
                price.cents()
            }
            None => current.price_cents,
        };
        let category_id = match update.category_id {
            Some(category_id) => {
                ensure_category(&mut tx, category_id).await?;
                Some(category_id)
            }
            None => current.category_id,
        };

        let updated = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                price_cents = ?4,
                category_id = ?5,
                updated_at = ?6
            WHERE id = ?1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&name)
        .bind(&description)
        .bind(price_cents)
        .bind(category_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Deletes a product and its inventory row.
    ///
    /// Transactions are never deleted, so a product with recorded movements
    /// can't be removed: the foreign key rejects it and nothing changes.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let mut tx = self.pool.begin().await?;
        ensure_product(&mut tx, id).await?;

        sqlx::query("DELETE FROM inventory WHERE product_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => DbError::ForeignKeyViolation {
                    message: format!("product {id} has recorded transactions"),
                },
                other => other,
            })?;

        tx.commit().await?;

        info!(id, "Product deleted");
        Ok(())
    }

    /// Counts products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use stockroom_core::{CoreError, Money, NewCategory, NewProduct, ProductUpdate};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_product(name: &str, cents: i64, category_id: Option<i64>) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            price: Money::from_cents(cents),
            category_id,
        }
    }

    #[tokio::test]
    async fn test_create_writes_product_and_opening_stock() {
        let db = db().await;
        let product = db
            .products()
            .create(new_product("Laptop", 120_000, None), 20)
            .await
            .unwrap();

        assert_eq!(product.price(), Money::from_cents(120_000));
        assert_eq!(db.inventory().level(product.id).await.unwrap().quantity, 20);

        // opening stock is Q0, not a transaction
        assert_eq!(db.transactions().count_for_product(product.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input_without_writing() {
        let db = db().await;
        let repo = db.products();

        let err = repo.create(new_product("", 100, None), 1).await.unwrap_err();
        assert!(err.is_validation());

        let err = repo.create(new_product("Mug", -1, None), 1).await.unwrap_err();
        assert!(err.is_validation());

        let err = repo.create(new_product("Mug", 100, None), -5).await.unwrap_err();
        assert!(matches!(
            err.as_core(),
            Some(CoreError::InvalidQuantity { value: -5, .. })
        ));

        let err = repo.create(new_product("Mug", 100, Some(9)), 1).await.unwrap_err();
        assert_eq!(err.as_core(), Some(&CoreError::CategoryNotFound(9)));

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_includes_categoryless_products() {
        let db = db().await;
        let books = db
            .categories()
            .create(NewCategory {
                name: "Books".to_string(),
                description: None,
            })
            .await
            .unwrap();

        db.products()
            .create(new_product("Python Programming", 3500, Some(books.id)), 25)
            .await
            .unwrap();
        db.products()
            .create(new_product("Gift Card", 2500, None), 0)
            .await
            .unwrap();

        let listing = db.products().list().await.unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].category_name.as_deref(), Some("Books"));
        assert_eq!(listing[0].quantity, Some(25));
        assert_eq!(listing[1].category_name, None);
        assert_eq!(listing[1].quantity, Some(0));
    }

    #[tokio::test]
    async fn test_partial_update() {
        let db = db().await;
        let repo = db.products();
        let product = repo
            .create(
                NewProduct {
                    description: Some("Automatic drip coffee maker".to_string()),
                    ..new_product("Coffee Maker", 8999, None)
                },
                15,
            )
            .await
            .unwrap();

        let updated = repo
            .update(
                product.id,
                ProductUpdate {
                    price: Some(Money::from_cents(7999)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Coffee Maker");
        assert_eq!(updated.description.as_deref(), Some("Automatic drip coffee maker"));
        assert_eq!(updated.price_cents, 7999);
        assert!(updated.updated_at >= product.updated_at);

        let cleared = repo
            .update(
                product.id,
                ProductUpdate {
                    description: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.description, None);

        let err = repo
            .update(
                404,
                ProductUpdate {
                    name: Some("Ghost".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.as_core(), Some(&CoreError::ProductNotFound(404)));
    }

    #[tokio::test]
    async fn test_delete_product_without_history() {
        let db = db().await;
        let product = db
            .products()
            .create(new_product("T-shirt", 2599, None), 100)
            .await
            .unwrap();

        db.products().delete(product.id).await.unwrap();
        assert!(db.products().get(product.id).await.unwrap().is_none());

        let err = db.products().delete(product.id).await.unwrap_err();
        assert_eq!(err.as_core(), Some(&CoreError::ProductNotFound(product.id)));
    }

    #[tokio::test]
    async fn test_delete_product_with_history_is_refused() {
        let db = db().await;
        let product = db
            .products()
            .create(new_product("Jeans", 4550, None), 50)
            .await
            .unwrap();
        db.inventory().record_sale(product.id, 2, None).await.unwrap();

        let err = db.products().delete(product.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        // rolled back: the inventory row is still there
        assert_eq!(db.inventory().level(product.id).await.unwrap().quantity, 48);
    }
}
