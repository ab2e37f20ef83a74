//! # Category Repository
//!
//! Database operations for product categories.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockroom_core::validation::{normalize_optional_text, validate_category_name};
use stockroom_core::{Category, CategoryListing, CoreError, NewCategory};

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Inserts a new category.
    ///
    /// ## Returns
    /// * `Ok(Category)` - Inserted row with its generated id
    /// * `Err(DbError::Domain)` - Name is blank or too long
    pub async fn create(&self, category: NewCategory) -> DbResult<Category> {
        let name = category.name.trim().to_string();
        validate_category_name(&name)?;
        let description = normalize_optional_text(category.description);

        debug!(name = %name, "Creating category");

        let created = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description, created_at)
            VALUES (?1, ?2, ?3)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(&name)
        .bind(&description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Lists categories with their product counts, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<CategoryListing>> {
        let categories = sqlx::query_as::<_, CategoryListing>(
            r#"
            SELECT
                c.id,
                c.name,
                c.description,
                COUNT(p.id) AS product_count
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            GROUP BY c.id, c.name, c.description
            ORDER BY c.name, c.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = categories.len(), "Listed categories");
        Ok(categories)
    }

    /// Gets a category by its ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, created_at FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Like [`get`](Self::get), but a missing row is `CategoryNotFound`.
    pub async fn require(&self, id: i64) -> DbResult<Category> {
        self.get(id)
            .await?
            .ok_or_else(|| CoreError::CategoryNotFound(id).into())
    }

    /// Deletes a category.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - Products still reference it
    /// * `Err(DbError::Domain(CategoryNotFound))` - No such category
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting category");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => DbError::ForeignKeyViolation {
                    message: format!("category {id} still has products"),
                },
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(CoreError::CategoryNotFound(id).into());
        }

        Ok(())
    }

    /// Counts categories.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
