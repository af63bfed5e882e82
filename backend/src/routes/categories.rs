//! Category API routes

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::services::CategoryService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use catalog_shared::types::{
    CategoryCreate, CategoryItems, CategoryNameQuery, CategoryRead, CategorySummary,
};

/// Create category routes
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/items", get(get_category_items))
        .route("/:id", get(get_category).delete(delete_category))
}

/// GET /api/categories
async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<CategorySummary>>> {
    let categories = CategoryService::list(state.db()).await?;
    Ok(Json(categories))
}

/// GET /api/categories/:id
async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<CategoryRead>> {
    let category = CategoryService::get(state.db(), id).await?;
    Ok(Json(category))
}

/// GET /api/categories/items?name=<category>
async fn get_category_items(
    State(state): State<AppState>,
    Query(query): Query<CategoryNameQuery>,
) -> ApiResult<Json<CategoryItems>> {
    let category =
        CategoryService::get_items_by_name(state.db(), state.items.as_ref(), &query.name).await?;
    Ok(Json(category))
}

/// POST /api/categories
async fn create_category(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(req): Json<CategoryCreate>,
) -> ApiResult<(StatusCode, Json<CategoryRead>)> {
    let category = CategoryService::create(state.db(), &req.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// DELETE /api/categories/:id
async fn delete_category(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    CategoryService::delete(state.db(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
