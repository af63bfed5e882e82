//! Item repository for database operations

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::debug;

/// Item record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemRecord {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub image: Option<String>,
    pub username: String,
    pub category_id: Option<i64>,
    pub discount: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an item
#[derive(Debug, Clone)]
pub struct CreateItem {
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub image: Option<String>,
    pub username: String,
    pub category_id: Option<i64>,
}

/// Input for updating an item; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct UpdateItem {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub discount: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub category_id: Option<i64>,
}

/// `ItemStore::update` lost a rename to another item holding the name
#[derive(Debug, thiserror::Error)]
#[error("Item name {0:?} is already taken")]
pub struct NameTaken(pub String);

/// Per-user item lists kept next to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Cart,
    Favorites,
}

impl Collection {
    fn table(self) -> &'static str {
        match self {
            Collection::Cart => "cart_items",
            Collection::Favorites => "favorites",
        }
    }
}

/// Lookup, mutation and transactional deletion of items
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<ItemRecord>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<ItemRecord>>;

    async fn list(&self) -> Result<Vec<ItemRecord>>;

    async fn list_by_user(&self, username: &str) -> Result<Vec<ItemRecord>>;

    async fn list_by_category(&self, category_id: i64) -> Result<Vec<ItemRecord>>;

    /// Insert an item; `None` when the name is already taken
    async fn create(&self, input: CreateItem) -> Result<Option<ItemRecord>>;

    /// Apply a partial update; `None` when the item does not exist
    ///
    /// Fails with [`NameTaken`] when the new name belongs to another item.
    async fn update(&self, id: i64, updates: UpdateItem) -> Result<Option<ItemRecord>>;

    /// Delete an item inside a transaction
    ///
    /// Returns the deleted record only once the transaction has committed.
    /// `None` means nothing was deleted.
    async fn delete(&self, id: i64) -> Result<Option<ItemRecord>>;

    /// Put an item on a user's list; adding it twice is a no-op
    async fn add_to(&self, collection: Collection, username: &str, item_id: i64) -> Result<()>;

    /// Take an item off a user's list; `false` when it was not there
    async fn remove_from(&self, collection: Collection, username: &str, item_id: i64) -> Result<bool>;

    /// Items on a user's list, most recently added first
    async fn list_in(&self, collection: Collection, username: &str) -> Result<Vec<ItemRecord>>;
}

// PostgreSQL SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

const ITEM_COLUMNS: &str = "id, name, price, description, image, username, category_id, \
                            discount, discount_price, quantity, created_at";

const JOINED_ITEM_COLUMNS: &str = "i.id, i.name, i.price, i.description, i.image, i.username, \
                                   i.category_id, i.discount, i.discount_price, i.quantity, \
                                   i.created_at";

/// PostgreSQL-backed item store
#[derive(Clone)]
pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemStore for ItemRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<ItemRecord>> {
        let item = sqlx::query_as::<_, ItemRecord>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ItemRecord>> {
        let item = sqlx::query_as::<_, ItemRecord>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn list(&self) -> Result<Vec<ItemRecord>> {
        let items = sqlx::query_as::<_, ItemRecord>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn list_by_user(&self, username: &str) -> Result<Vec<ItemRecord>> {
        let items = sqlx::query_as::<_, ItemRecord>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE username = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn list_by_category(&self, category_id: i64) -> Result<Vec<ItemRecord>> {
        let items = sqlx::query_as::<_, ItemRecord>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE category_id = $1 ORDER BY name"
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn create(&self, input: CreateItem) -> Result<Option<ItemRecord>> {
        let item = sqlx::query_as::<_, ItemRecord>(&format!(
            r#"
            INSERT INTO items (name, price, description, image, username, category_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (name) DO NOTHING
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(input.price)
        .bind(&input.description)
        .bind(&input.image)
        .bind(&input.username)
        .bind(input.category_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn update(&self, id: i64, updates: UpdateItem) -> Result<Option<ItemRecord>> {
        // No row lock: concurrent updates of the same item are last-write-wins
        let new_name = updates.name.clone();
        let item = sqlx::query_as::<_, ItemRecord>(&format!(
            r#"
            UPDATE items SET
                name = COALESCE($2, name),
                price = COALESCE($3, price),
                description = COALESCE($4, description),
                discount = COALESCE($5, discount),
                discount_price = COALESCE($6, discount_price),
                quantity = COALESCE($7, quantity),
                category_id = COALESCE($8, category_id)
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(updates.name)
        .bind(updates.price)
        .bind(updates.description)
        .bind(updates.discount)
        .bind(updates.discount_price)
        .bind(updates.quantity)
        .bind(updates.category_id)
        .fetch_optional(&self.pool)
        .await;

        match item {
            Ok(item) => Ok(item),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(NameTaken(new_name.unwrap_or_default()).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: i64) -> Result<Option<ItemRecord>> {
        let mut tx = self.pool.begin().await?;

        let item = sqlx::query_as::<_, ItemRecord>(&format!(
            "DELETE FROM items WHERE id = $1 RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if item.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        debug!(item_id = id, "Item deletion committed");

        Ok(item)
    }

    async fn add_to(&self, collection: Collection, username: &str, item_id: i64) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO {} (username, item_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            collection.table()
        ))
        .bind(username)
        .bind(item_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_from(&self, collection: Collection, username: &str, item_id: i64) -> Result<bool> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE username = $1 AND item_id = $2",
            collection.table()
        ))
        .bind(username)
        .bind(item_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_in(&self, collection: Collection, username: &str) -> Result<Vec<ItemRecord>> {
        let items = sqlx::query_as::<_, ItemRecord>(&format!(
            r#"
            SELECT {JOINED_ITEM_COLUMNS} FROM items i
            JOIN {table} c ON c.item_id = i.id
            WHERE c.username = $1
            ORDER BY c.added_at DESC, i.id DESC
            "#,
            table = collection.table()
        ))
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}
