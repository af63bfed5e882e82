//! Current-user resolution
//!
//! Turns the bearer token of a request into the [`Identity`] of a stored
//! user. Available as Axum extractors ([`CurrentUser`], [`OptionalUser`])
//! and as a route layer ([`require_auth`]).

use super::{BearerExtractor, JwtService};
use crate::auth::AuthError;
use crate::error::{ApiError, ApiResult};
use crate::repositories::{UserRecord, UserStore};
use crate::state::AppState;
use axum::{
    extract::{FromRef, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

/// The authenticated user of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub email: Option<String>,
}

impl From<UserRecord> for Identity {
    fn from(user: UserRecord) -> Self {
        Self {
            username: user.username,
            email: user.email,
        }
    }
}

/// Composes token extraction, token validation and user lookup
#[derive(Clone)]
pub struct CurrentUserResolver {
    jwt: JwtService,
    users: Arc<dyn UserStore>,
}

impl CurrentUserResolver {
    pub fn new(jwt: JwtService, users: Arc<dyn UserStore>) -> Self {
        Self { jwt, users }
    }

    /// Resolve the identity of a request that must be authenticated
    pub async fn resolve(&self, headers: &HeaderMap) -> ApiResult<Identity> {
        let token = BearerExtractor::default()
            .extract(headers)?
            .ok_or(AuthError::MissingOrMalformedToken)?;
        self.identify(&token).await
    }

    /// Resolve the identity of a request that may be anonymous
    ///
    /// Any authentication failure yields `None`. Store failures still
    /// propagate.
    pub async fn resolve_optional(&self, headers: &HeaderMap) -> ApiResult<Option<Identity>> {
        let Some(token) = BearerExtractor::optional().extract(headers)? else {
            return Ok(None);
        };
        match self.identify(&token).await {
            Ok(identity) => Ok(Some(identity)),
            Err(ApiError::Unauthorized(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn identify(&self, token: &str) -> ApiResult<Identity> {
        let username = self.jwt.validate(token)?;
        let user = self
            .users
            .find_by_username(&username)
            .await
            .map_err(ApiError::Internal)?
            .ok_or(AuthError::UnknownSubject)?;

        debug!(username = %user.username, "Resolved current user");
        Ok(Identity::from(user))
    }
}

/// Authenticated user extracted from the request
///
/// Rejects with `401 Not authorized` when no valid identity is present.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl CurrentUser {
    pub fn username(&self) -> &str {
        &self.0.username
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already resolved by `require_auth`
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let app_state = AppState::from_ref(state);
        let identity = app_state.resolver().resolve(&parts.headers).await?;
        Ok(CurrentUser(identity))
    }
}

/// Identity of the request if it carries a valid token, `None` otherwise
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<Identity>);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for OptionalUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(CurrentUser(identity)) = parts.extensions.get::<CurrentUser>() {
            return Ok(OptionalUser(Some(identity.clone())));
        }

        let app_state = AppState::from_ref(state);
        let identity = app_state.resolver().resolve_optional(&parts.headers).await?;
        Ok(OptionalUser(identity))
    }
}

/// Middleware that rejects unauthenticated requests and stores the
/// resolved [`CurrentUser`] in the request extensions
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = state.resolver().resolve(request.headers()).await?;
    request.extensions_mut().insert(CurrentUser(identity));

    Ok(next.run(request).await)
}
