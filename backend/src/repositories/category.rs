//! Category repository for database operations

use anyhow::Result;
use sqlx::PgPool;

/// Category record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRecord {
    pub id: i64,
    pub name: String,
}

/// Category with its item count
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryCountRecord {
    pub id: i64,
    pub name: String,
    pub items_count: i64,
}

/// Category repository for database operations
pub struct CategoryRepository;

impl CategoryRepository {
    /// List all categories with the number of items in each
    pub async fn list_with_counts(pool: &PgPool) -> Result<Vec<CategoryCountRecord>> {
        let categories = sqlx::query_as::<_, CategoryCountRecord>(
            r#"
            SELECT c.id, c.name, COUNT(i.id) AS items_count
            FROM categories c
            LEFT JOIN items i ON i.category_id = c.id
            GROUP BY c.id, c.name
            ORDER BY c.name
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(categories)
    }

    /// Find category by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<CategoryRecord>> {
        let category = sqlx::query_as::<_, CategoryRecord>(
            r#"
            SELECT id, name FROM categories WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(category)
    }

    /// Find category by name
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<CategoryRecord>> {
        let category = sqlx::query_as::<_, CategoryRecord>(
            r#"
            SELECT id, name FROM categories WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(category)
    }

    /// Create a category; `None` when the name is already taken
    pub async fn create(pool: &PgPool, name: &str) -> Result<Option<CategoryRecord>> {
        let category = sqlx::query_as::<_, CategoryRecord>(
            r#"
            INSERT INTO categories (name)
            VALUES ($1)
            ON CONFLICT (name) DO NOTHING
            RETURNING id, name
            "#,
        )
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(category)
    }

    /// Delete a category; returns whether a row was removed
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
