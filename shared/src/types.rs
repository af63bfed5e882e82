//! API request and response types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// ============================================================================
// Account Types
// ============================================================================

/// Token response of the OAuth2 password flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// OAuth2 password grant form (`application/x-www-form-urlencoded`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Ignored; accepted for OAuth2 client compatibility
    #[serde(default)]
    pub grant_type: Option<String>,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Refresh token request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// User profile response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Contact fields a user may change on their own profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfileUpdate {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub primary_email: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

// ============================================================================
// Category Types
// ============================================================================

/// Create category request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
}

/// Category response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRead {
    pub id: i64,
    pub name: String,
}

/// Category with the number of items filed under it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub items_count: i64,
}

/// Category with its items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryItems {
    pub id: i64,
    pub name: String,
    pub items: Vec<ItemRead>,
}

/// Query for looking up a category by name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryNameQuery {
    pub name: String,
}

// ============================================================================
// Item Types
// ============================================================================

/// Item response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRead {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<Decimal>,
    pub quantity: i32,
    pub date: DateTime<Utc>,
    /// In the browsing user's cart; always `false` for anonymous requests
    #[serde(default)]
    pub in_cart: bool,
    /// Among the browsing user's favorites
    #[serde(default)]
    pub liked: bool,
}

/// Item with its review statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDetails {
    #[serde(flatten)]
    pub item: ItemRead,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub reviews_count: i64,
}

/// Item listing, annotated with who is browsing (if anyone)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemList {
    pub items: Vec<ItemRead>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_user: Option<String>,
}

/// The current user's cart and favorites
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartRead {
    pub user: String,
    pub items: Vec<ItemRead>,
    pub items_liked: Vec<ItemRead>,
    /// Sum over the cart, using the discounted price where one is set
    pub total: Decimal,
}

/// Partial item update; absent fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub discount: Option<Decimal>,
    #[serde(default)]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub category_id: Option<i64>,
}

impl ItemUpdate {
    /// Whether the update carries no field at all
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.discount.is_none()
            && self.quantity.is_none()
            && self.category_id.is_none()
    }
}

// ============================================================================
// Review Types
// ============================================================================

/// Create review request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCreate {
    pub rating: i32,
    #[serde(default)]
    pub text: Option<String>,
}

/// Review response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRead {
    pub id: i64,
    pub item_id: i64,
    pub username: String,
    pub rating: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub created_at: DateTime<Utc>,
}
