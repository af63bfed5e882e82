//! User repository for database operations

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub primary_email: Option<String>,
    pub number: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
}

/// Input for updating contact fields
#[derive(Debug, Clone, Default)]
pub struct UpdateUserProfile {
    pub email: Option<String>,
    pub primary_email: Option<String>,
    pub number: Option<String>,
    pub address: Option<String>,
}

/// Lookup and persistence of user identities
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>>;

    /// Insert a user; `None` when the username is already taken
    async fn create(&self, input: CreateUser) -> Result<Option<UserRecord>>;

    /// Update contact fields; `None` when the user does not exist
    async fn update_profile(
        &self,
        username: &str,
        updates: UpdateUserProfile,
    ) -> Result<Option<UserRecord>>;
}

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT username, password_hash, email, primary_email, number, address, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, input: CreateUser) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (username, password_hash, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (username) DO NOTHING
            RETURNING username, password_hash, email, primary_email, number, address, created_at
            "#,
        )
        .bind(&input.username)
        .bind(&input.password_hash)
        .bind(&input.email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_profile(
        &self,
        username: &str,
        updates: UpdateUserProfile,
    ) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                primary_email = COALESCE($3, primary_email),
                number = COALESCE($4, number),
                address = COALESCE($5, address),
                updated_at = NOW()
            WHERE username = $1
            RETURNING username, password_hash, email, primary_email, number, address, created_at
            "#,
        )
        .bind(username)
        .bind(updates.email)
        .bind(updates.primary_email)
        .bind(updates.number)
        .bind(updates.address)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
