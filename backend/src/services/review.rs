//! Review service

use crate::auth::Identity;
use crate::error::{ApiError, ApiResult};
use crate::repositories::{CreateReview, ItemStore, ReviewRecord, ReviewRepository};
use catalog_shared::types::{ReviewCreate, ReviewRead};
use catalog_shared::validation::validate_rating;
use sqlx::PgPool;
use tracing::{error, info};

impl From<ReviewRecord> for ReviewRead {
    fn from(review: ReviewRecord) -> Self {
        Self {
            id: review.id,
            item_id: review.item_id,
            username: review.username,
            rating: review.rating,
            text: review.text,
            created_at: review.created_at,
        }
    }
}

pub struct ReviewService;

impl ReviewService {
    async fn ensure_item_exists(items: &dyn ItemStore, item_id: i64) -> ApiResult<()> {
        if items.find_by_id(item_id).await?.is_none() {
            error!("Item not found");
            return Err(ApiError::NotFound("Item not found".to_string()));
        }
        Ok(())
    }

    /// Post a review of an item as `author`
    pub async fn create(
        items: &dyn ItemStore,
        pool: &PgPool,
        author: &Identity,
        item_id: i64,
        req: ReviewCreate,
    ) -> ApiResult<ReviewRead> {
        validate_rating(req.rating).map_err(ApiError::Validation)?;
        Self::ensure_item_exists(items, item_id).await?;

        let review = ReviewRepository::create(
            pool,
            CreateReview {
                item_id,
                username: author.username.clone(),
                rating: req.rating,
                text: req.text,
            },
        )
        .await?;

        info!(item_id, review_id = review.id, username = %author.username, "Review created");
        Ok(ReviewRead::from(review))
    }

    pub async fn list_for_item(
        items: &dyn ItemStore,
        pool: &PgPool,
        item_id: i64,
    ) -> ApiResult<Vec<ReviewRead>> {
        Self::ensure_item_exists(items, item_id).await?;
        let reviews = ReviewRepository::list_for_item(pool, item_id).await?;
        Ok(reviews.into_iter().map(ReviewRead::from).collect())
    }
}
