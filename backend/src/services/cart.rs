//! Shopping cart and favorites of the current user

use crate::error::{ApiError, ApiResult};
use crate::repositories::{Collection, ItemRecord, ItemStore};
use catalog_shared::types::{CartRead, ItemRead};
use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::info;

fn missing_from(collection: Collection) -> ApiError {
    match collection {
        Collection::Cart => ApiError::NotFound("Item is not in the cart".to_string()),
        Collection::Favorites => ApiError::NotFound("Item is not in favorites".to_string()),
    }
}

pub struct CartService;

impl CartService {
    /// Put an existing item on the user's cart or favorites
    pub async fn add(
        items: &dyn ItemStore,
        collection: Collection,
        username: &str,
        item_id: i64,
    ) -> ApiResult<()> {
        if items.find_by_id(item_id).await?.is_none() {
            return Err(ApiError::NotFound(format!("No item with id={}", item_id)));
        }

        items.add_to(collection, username, item_id).await?;
        info!(item_id, username = %username, ?collection, "Item added");
        Ok(())
    }

    /// Take an item off the user's cart or favorites
    pub async fn remove(
        items: &dyn ItemStore,
        collection: Collection,
        username: &str,
        item_id: i64,
    ) -> ApiResult<()> {
        if !items.remove_from(collection, username, item_id).await? {
            return Err(missing_from(collection));
        }

        info!(item_id, username = %username, ?collection, "Item removed");
        Ok(())
    }

    /// Cart, favorites and cart total of one user
    pub async fn view(items: &dyn ItemStore, username: &str) -> ApiResult<CartRead> {
        let mut cart: Vec<ItemRead> = items
            .list_in(Collection::Cart, username)
            .await?
            .into_iter()
            .map(ItemRead::from)
            .collect();
        let mut liked: Vec<ItemRead> = items
            .list_in(Collection::Favorites, username)
            .await?
            .into_iter()
            .map(ItemRead::from)
            .collect();

        let cart_ids: HashSet<i64> = cart.iter().map(|item| item.id).collect();
        let liked_ids: HashSet<i64> = liked.iter().map(|item| item.id).collect();
        for item in cart.iter_mut().chain(liked.iter_mut()) {
            item.in_cart = cart_ids.contains(&item.id);
            item.liked = liked_ids.contains(&item.id);
        }

        Ok(CartRead {
            user: username.to_string(),
            total: cart_total(&cart),
            items: cart,
            items_liked: liked,
        })
    }

    /// Set `in_cart` and `liked` on `listing` from the user's lists
    pub async fn mark(
        items: &dyn ItemStore,
        username: &str,
        listing: &mut [ItemRead],
    ) -> ApiResult<()> {
        let ids = |records: Vec<ItemRecord>| -> HashSet<i64> {
            records.into_iter().map(|item| item.id).collect()
        };
        let cart = ids(items.list_in(Collection::Cart, username).await?);
        let liked = ids(items.list_in(Collection::Favorites, username).await?);

        for item in listing.iter_mut() {
            item.in_cart = cart.contains(&item.id);
            item.liked = liked.contains(&item.id);
        }
        Ok(())
    }
}

/// Sum of effective prices; a discounted price replaces the list price
pub fn cart_total(cart: &[ItemRead]) -> Decimal {
    cart.iter()
        .map(|item| item.discount_price.unwrap_or(item.price))
        .sum()
}
