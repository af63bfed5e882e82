//! Review repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Review record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRecord {
    pub id: i64,
    pub item_id: i64,
    pub username: String,
    pub rating: i32,
    pub text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a review
#[derive(Debug, Clone)]
pub struct CreateReview {
    pub item_id: i64,
    pub username: String,
    pub rating: i32,
    pub text: Option<String>,
}

/// Aggregate rating of an item
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RatingSummary {
    pub average: Option<f64>,
    pub count: i64,
}

/// Review repository for database operations
pub struct ReviewRepository;

impl ReviewRepository {
    /// Create a new review
    pub async fn create(pool: &PgPool, input: CreateReview) -> Result<ReviewRecord> {
        let review = sqlx::query_as::<_, ReviewRecord>(
            r#"
            INSERT INTO reviews (item_id, username, rating, text)
            VALUES ($1, $2, $3, $4)
            RETURNING id, item_id, username, rating, text, created_at
            "#,
        )
        .bind(input.item_id)
        .bind(&input.username)
        .bind(input.rating)
        .bind(&input.text)
        .fetch_one(pool)
        .await?;

        Ok(review)
    }

    /// List reviews of an item, newest first
    pub async fn list_for_item(pool: &PgPool, item_id: i64) -> Result<Vec<ReviewRecord>> {
        let reviews = sqlx::query_as::<_, ReviewRecord>(
            r#"
            SELECT id, item_id, username, rating, text, created_at
            FROM reviews
            WHERE item_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(item_id)
        .fetch_all(pool)
        .await?;

        Ok(reviews)
    }

    /// Average rating and review count of an item
    pub async fn rating_summary(pool: &PgPool, item_id: i64) -> Result<RatingSummary> {
        let summary = sqlx::query_as::<_, RatingSummary>(
            r#"
            SELECT AVG(rating)::FLOAT8 AS average, COUNT(*) AS count
            FROM reviews
            WHERE item_id = $1
            "#,
        )
        .bind(item_id)
        .fetch_one(pool)
        .await?;

        Ok(summary)
    }
}
