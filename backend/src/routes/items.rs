//! Item and review API routes

use crate::auth::{CurrentUser, OptionalUser};
use crate::error::{ApiError, ApiResult};
use crate::repositories::Collection;
use crate::services::{CartService, ItemService, NewItem, ReviewService};
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use catalog_shared::types::{
    CartRead, ItemDetails, ItemList, ItemRead, ItemUpdate, ReviewCreate, ReviewRead,
};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Create item routes
pub fn item_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_items)
                .post(create_item)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/mine", get(list_my_items))
        .route("/cart", get(view_cart))
        .route("/favorites", get(list_favorites))
        .route("/:id", get(get_item).patch(update_item).delete(delete_item))
        .route("/:id/reviews", get(list_reviews).post(create_review))
        .route("/:id/cart", post(add_to_cart).delete(remove_from_cart))
        .route("/:id/favorite", post(add_favorite).delete(remove_favorite))
}

/// GET /api/items - Browse all items
///
/// Public; reports who is browsing when the request carries a valid token.
async fn list_items(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> ApiResult<Json<ItemList>> {
    let mut items = ItemService::list(state.items.as_ref()).await?;
    if let Some(ref user) = user {
        CartService::mark(state.items.as_ref(), &user.username, &mut items).await?;
    }
    Ok(Json(ItemList {
        items,
        current_user: user.map(|u| u.username),
    }))
}

/// GET /api/items/mine - Items owned by the current user
async fn list_my_items(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ItemList>> {
    let mut items = ItemService::list_for_user(state.items.as_ref(), user.username()).await?;
    CartService::mark(state.items.as_ref(), user.username(), &mut items).await?;
    Ok(Json(ItemList {
        items,
        current_user: Some(user.0.username),
    }))
}

/// GET /api/items/:id - Item with rating
async fn get_item(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<ItemDetails>> {
    let mut details = ItemService::get_details(state.items.as_ref(), state.db(), id).await?;
    if let Some(user) = user {
        CartService::mark(
            state.items.as_ref(),
            &user.username,
            std::slice::from_mut(&mut details.item),
        )
        .await?;
    }
    Ok(Json(details))
}

/// Collect the upload form into a [`NewItem`]
async fn read_item_form(mut multipart: Multipart) -> ApiResult<NewItem> {
    let mut name = None;
    let mut price = None;
    let mut description = None;
    let mut category_id = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::Validation("Image file name is required".to_string()))?;
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
                file = Some((file_name, content.to_vec()));
            }
            "name" | "price" | "description" | "category_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid field {}: {}", field_name, e)))?;
                match field_name.as_str() {
                    "name" => name = Some(value),
                    "price" => {
                        price = Some(Decimal::from_str(value.trim()).map_err(|_| {
                            ApiError::Validation("Price must be a decimal number".to_string())
                        })?)
                    }
                    "description" => description = Some(value).filter(|d| !d.is_empty()),
                    _ => {
                        category_id = Some(value.trim().parse::<i64>().map_err(|_| {
                            ApiError::Validation("Invalid category id".to_string())
                        })?)
                    }
                }
            }
            _ => {}
        }
    }

    let (file_name, content) =
        file.ok_or_else(|| ApiError::Validation("Image file is required".to_string()))?;

    Ok(NewItem {
        name: name.ok_or_else(|| ApiError::Validation("Item name is required".to_string()))?,
        price: price.ok_or_else(|| ApiError::Validation("Price is required".to_string()))?,
        description,
        category_id,
        file_name,
        content,
    })
}

/// POST /api/items - Create an item with its image (multipart form)
async fn create_item(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ItemRead>)> {
    let input = read_item_form(multipart).await?;
    let item = ItemService::create(
        state.items.as_ref(),
        state.db(),
        &state.images,
        &user.0,
        input,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PATCH /api/items/:id - Update item fields (owner only)
async fn update_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(update): Json<ItemUpdate>,
) -> ApiResult<Json<ItemRead>> {
    let item =
        ItemService::update(state.items.as_ref(), &state.images, &user.0, id, update).await?;
    Ok(Json(item))
}

/// DELETE /api/items/:id - Delete an item (owner only)
///
/// Responds as soon as the database row is gone; the item's images are
/// removed in the background.
async fn delete_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.deletion().delete_item(id, &user.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/items/:id/reviews
async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<ReviewRead>>> {
    let reviews = ReviewService::list_for_item(state.items.as_ref(), state.db(), id).await?;
    Ok(Json(reviews))
}

/// POST /api/items/:id/reviews
async fn create_review(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<ReviewCreate>,
) -> ApiResult<(StatusCode, Json<ReviewRead>)> {
    let review =
        ReviewService::create(state.items.as_ref(), state.db(), &user.0, id, req).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// GET /api/items/cart - Cart, favorites and cart total of the current user
async fn view_cart(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<CartRead>> {
    let cart = CartService::view(state.items.as_ref(), user.username()).await?;
    Ok(Json(cart))
}

/// GET /api/items/favorites
async fn list_favorites(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<ItemRead>>> {
    let cart = CartService::view(state.items.as_ref(), user.username()).await?;
    Ok(Json(cart.items_liked))
}

async fn change_collection(
    state: &AppState,
    user: &CurrentUser,
    collection: Collection,
    id: i64,
    add: bool,
) -> ApiResult<Json<CartRead>> {
    let items = state.items.as_ref();
    if add {
        CartService::add(items, collection, user.username(), id).await?;
    } else {
        CartService::remove(items, collection, user.username(), id).await?;
    }
    Ok(Json(CartService::view(items, user.username()).await?))
}

/// POST /api/items/:id/cart
async fn add_to_cart(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<CartRead>> {
    change_collection(&state, &user, Collection::Cart, id, true).await
}

/// DELETE /api/items/:id/cart
async fn remove_from_cart(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<CartRead>> {
    change_collection(&state, &user, Collection::Cart, id, false).await
}

/// POST /api/items/:id/favorite
async fn add_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<CartRead>> {
    change_collection(&state, &user, Collection::Favorites, id, true).await
}

/// DELETE /api/items/:id/favorite
async fn remove_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<CartRead>> {
    change_collection(&state, &user, Collection::Favorites, id, false).await
}
