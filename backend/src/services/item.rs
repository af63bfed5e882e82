//! Item service: listing, creation with image upload, and field updates

use crate::auth::Identity;
use crate::error::{ApiError, ApiResult};
use crate::repositories::{
    CategoryRepository, CreateItem, ItemRecord, ItemStore, NameTaken, ReviewRepository, UpdateItem,
};
use crate::storage::ImageStorage;
use catalog_shared::types::{ItemDetails, ItemRead, ItemUpdate};
use catalog_shared::validation::{validate_discount, validate_item_name, validate_price};
use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::PgPool;
use tracing::{info, warn};

impl From<ItemRecord> for ItemRead {
    fn from(item: ItemRecord) -> Self {
        Self {
            id: item.id,
            name: item.name,
            price: item.price,
            description: item.description,
            image: item.image,
            username: item.username,
            category_id: item.category_id,
            discount: item.discount,
            discount_price: item.discount_price,
            quantity: item.quantity,
            date: item.created_at,
            in_cart: false,
            liked: false,
        }
    }
}

/// Fail with `Forbidden` unless `identity` owns the item
pub(crate) fn ensure_owner(item: &ItemRecord, identity: &Identity) -> ApiResult<()> {
    if item.username != identity.username {
        warn!(
            item_id = item.id,
            owner = %item.username,
            username = %identity.username,
            "Rejected modification of another user's item"
        );
        return Err(ApiError::Forbidden(
            "Only the owner may modify this item".to_string(),
        ));
    }
    Ok(())
}

/// Price after applying a fractional discount, rounded to cents
pub fn discounted_price(price: Decimal, discount: Decimal) -> Decimal {
    (price * (Decimal::ONE - discount))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// A new item as received from the upload form
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Item service for catalog operations
pub struct ItemService;

impl ItemService {
    /// List every item
    pub async fn list(items: &dyn ItemStore) -> ApiResult<Vec<ItemRead>> {
        let records = items.list().await?;
        Ok(records.into_iter().map(ItemRead::from).collect())
    }

    /// List the items owned by one user
    pub async fn list_for_user(items: &dyn ItemStore, username: &str) -> ApiResult<Vec<ItemRead>> {
        let records = items.list_by_user(username).await?;
        Ok(records.into_iter().map(ItemRead::from).collect())
    }

    /// Fetch one item
    pub async fn get(items: &dyn ItemStore, id: i64) -> ApiResult<ItemRead> {
        items
            .find_by_id(id)
            .await?
            .map(ItemRead::from)
            .ok_or_else(|| ApiError::NotFound(format!("No item with id={}", id)))
    }

    /// Fetch one item together with its rating
    pub async fn get_details(items: &dyn ItemStore, pool: &PgPool, id: i64) -> ApiResult<ItemDetails> {
        let item = Self::get(items, id).await?;
        let rating = ReviewRepository::rating_summary(pool, id).await?;

        Ok(ItemDetails {
            item,
            rating: rating.average,
            reviews_count: rating.count,
        })
    }

    /// Create an item owned by `owner`, storing its image first
    pub async fn create(
        items: &dyn ItemStore,
        pool: &PgPool,
        images: &ImageStorage,
        owner: &Identity,
        input: NewItem,
    ) -> ApiResult<ItemRead> {
        validate_item_name(&input.name).map_err(ApiError::Validation)?;
        validate_price(input.price).map_err(ApiError::Validation)?;

        if items.find_by_name(&input.name).await?.is_some() {
            return Err(ApiError::Conflict(
                "Item with that name already exists!".to_string(),
            ));
        }

        if let Some(category_id) = input.category_id {
            if CategoryRepository::find_by_id(pool, category_id).await?.is_none() {
                return Err(ApiError::NotFound(format!(
                    "No category with id {} found",
                    category_id
                )));
            }
        }

        let image = images
            .save(&owner.username, &input.name, &input.file_name, &input.content)
            .await?;

        let created = items
            .create(CreateItem {
                name: input.name.clone(),
                price: input.price,
                description: input.description,
                image: Some(image.clone()),
                username: owner.username.clone(),
                category_id: input.category_id,
            })
            .await;

        // A concurrent create may have claimed the name after the check above
        let record = match created {
            Ok(Some(record)) => record,
            other => {
                images.discard(&owner.username, &input.name, &image).await;
                return match other {
                    Err(e) => Err(ApiError::Internal(e)),
                    _ => Err(ApiError::Conflict(
                        "Item with that name already exists!".to_string(),
                    )),
                };
            }
        };

        info!(item_id = record.id, username = %owner.username, "Item created");
        Ok(ItemRead::from(record))
    }

    /// Apply a partial update to an item owned by `identity`
    ///
    /// There is no locking: two concurrent updates of the same item both
    /// succeed and the later write wins.
    pub async fn update(
        items: &dyn ItemStore,
        images: &ImageStorage,
        identity: &Identity,
        id: i64,
        update: ItemUpdate,
    ) -> ApiResult<ItemRead> {
        if update.is_empty() {
            return Err(ApiError::BadRequest("No fields to update".to_string()));
        }

        let current = items
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;
        ensure_owner(&current, identity)?;

        if let Some(price) = update.price {
            validate_price(price).map_err(ApiError::Validation)?;
        }
        if let Some(discount) = update.discount {
            validate_discount(discount).map_err(ApiError::Validation)?;
        }
        if let Some(quantity) = update.quantity {
            if quantity < 0 {
                return Err(ApiError::Validation("Quantity cannot be negative".to_string()));
            }
        }

        let rename = match update.name {
            Some(ref name) if *name != current.name => {
                validate_item_name(name).map_err(ApiError::Validation)?;
                if items.find_by_name(name).await?.is_some() {
                    return Err(ApiError::Conflict(
                        "Item with that name already exists!".to_string(),
                    ));
                }
                Some(name.clone())
            }
            _ => None,
        };

        let discount_price = if update.price.is_some() || update.discount.is_some() {
            let price = update.price.unwrap_or(current.price);
            update
                .discount
                .or(current.discount)
                .map(|discount| discounted_price(price, discount))
        } else {
            None
        };

        if let Some(ref new_name) = rename {
            images
                .rename_item(&current.username, &current.name, new_name)
                .await?;
        }

        let updated = items
            .update(
                id,
                UpdateItem {
                    name: rename.clone(),
                    price: update.price,
                    description: update.description,
                    discount: update.discount,
                    discount_price,
                    quantity: update.quantity,
                    category_id: update.category_id,
                },
            )
            .await;

        let updated = match updated {
            Ok(Some(record)) => record,
            other => {
                // Put the image directory back where the stored row expects it
                if let Some(ref new_name) = rename {
                    if let Err(e) = images.rename_item(&current.username, new_name, &current.name).await {
                        warn!(item_id = id, error = %e, "Failed to restore image directory");
                    }
                }
                return match other {
                    Err(e) if e.is::<NameTaken>() => Err(ApiError::Conflict(
                        "Item with that name already exists!".to_string(),
                    )),
                    Err(e) => Err(ApiError::Internal(e)),
                    _ => Err(ApiError::NotFound("Item not found".to_string())),
                };
            }
        };

        info!(item_id = id, username = %identity.username, "Item updated");
        Ok(ItemRead::from(updated))
    }
}
