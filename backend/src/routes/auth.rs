//! Account routes
//!
//! Provides registration, the OAuth2 password-flow token endpoint, token
//! refresh, logout and the current user's profile.

use crate::auth::{require_auth, CurrentUser, ACCESS_TOKEN_COOKIE};
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use catalog_shared::types::{
    AuthTokens, LoginRequest, RefreshTokenRequest, RegisterRequest, UserProfile, UserProfileUpdate,
};

/// Create auth routes
pub fn auth_routes(state: AppState) -> Router<AppState> {
    let profile = Router::new()
        .route("/me", get(get_profile).put(update_profile))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/register", post(register))
        .route("/token", post(login))
        .route("/refresh", post(refresh_token))
        .route("/logout", post(logout))
        .merge(profile)
}

fn access_cookie(token: String) -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Register a new user
///
/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let profile = UserService::register(state.users.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// OAuth2 password grant
///
/// POST /api/auth/token
///
/// Returns the token pair and also stores the access token in a cookie so
/// that browser clients authenticate without setting headers.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(req): Form<LoginRequest>,
) -> ApiResult<(CookieJar, Json<AuthTokens>)> {
    let tokens =
        UserService::login(state.users.as_ref(), state.jwt(), &req.username, &req.password).await?;
    let jar = jar.add(access_cookie(tokens.access_token.clone()));
    Ok((jar, Json(tokens)))
}

/// Refresh access token
///
/// POST /api/auth/refresh
async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RefreshTokenRequest>,
) -> ApiResult<(CookieJar, Json<AuthTokens>)> {
    let tokens =
        UserService::refresh_token(state.users.as_ref(), state.jwt(), &req.refresh_token).await?;
    let jar = jar.add(access_cookie(tokens.access_token.clone()));
    Ok((jar, Json(tokens)))
}

/// Drop the access token cookie
///
/// POST /api/auth/logout
async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"));
    (jar, StatusCode::NO_CONTENT)
}

/// GET /api/auth/me
async fn get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<UserProfile>> {
    let profile = UserService::get_profile(state.users.as_ref(), user.username()).await?;
    Ok(Json(profile))
}

/// PUT /api/auth/me
async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(update): Json<UserProfileUpdate>,
) -> ApiResult<Json<UserProfile>> {
    let profile =
        UserService::update_profile(state.users.as_ref(), user.username(), update).await?;
    Ok(Json(profile))
}
