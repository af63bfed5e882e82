//! Category service

use crate::error::{ApiError, ApiResult};
use crate::repositories::{CategoryRepository, ItemStore};
use catalog_shared::types::{CategoryItems, CategoryRead, CategorySummary, ItemRead};
use catalog_shared::validation::validate_category_name;
use sqlx::PgPool;
use tracing::{error, info};

pub struct CategoryService;

impl CategoryService {
    /// All categories with their item counts
    pub async fn list(pool: &PgPool) -> ApiResult<Vec<CategorySummary>> {
        let categories = CategoryRepository::list_with_counts(pool).await?;
        Ok(categories
            .into_iter()
            .map(|c| CategorySummary {
                id: c.id,
                name: c.name,
                items_count: c.items_count,
            })
            .collect())
    }

    pub async fn get(pool: &PgPool, id: i64) -> ApiResult<CategoryRead> {
        CategoryRepository::find_by_id(pool, id)
            .await?
            .map(|c| CategoryRead { id: c.id, name: c.name })
            .ok_or_else(|| ApiError::NotFound(format!("No category with id {} found", id)))
    }

    /// A category and every item filed under it
    pub async fn get_items_by_name(
        pool: &PgPool,
        items: &dyn ItemStore,
        name: &str,
    ) -> ApiResult<CategoryItems> {
        let category = CategoryRepository::find_by_name(pool, name)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("No category found for {}", name)))?;

        let items = items.list_by_category(category.id).await?;

        Ok(CategoryItems {
            id: category.id,
            name: category.name,
            items: items.into_iter().map(ItemRead::from).collect(),
        })
    }

    pub async fn create(pool: &PgPool, name: &str) -> ApiResult<CategoryRead> {
        if let Err(msg) = validate_category_name(name) {
            error!("{}", msg);
            return Err(ApiError::Validation(msg));
        }

        let category = CategoryRepository::create(pool, name)
            .await?
            .ok_or_else(|| {
                info!("Category with name:'{}' already exist", name);
                ApiError::Conflict(format!("Category with name:'{}' already exist", name))
            })?;

        Ok(CategoryRead {
            id: category.id,
            name: category.name,
        })
    }

    pub async fn delete(pool: &PgPool, id: i64) -> ApiResult<()> {
        if !CategoryRepository::delete(pool, id).await? {
            error!("No category with id {} found", id);
            return Err(ApiError::NotFound(format!("No category with id {} found", id)));
        }
        info!(category_id = id, "Category deleted");
        Ok(())
    }
}
