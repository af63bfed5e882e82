//! Bearer token extraction from the `Authorization` header or the
//! `access_token` cookie.

use super::AuthError;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum_extra::extract::cookie::CookieJar;

/// Name of the cookie carrying the access token
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Split a credential into `(scheme, parameter)` at the first whitespace
///
/// A value without whitespace yields an empty parameter.
pub fn split_scheme_param(value: &str) -> (&str, &str) {
    let value = value.trim();
    match value.split_once(char::is_whitespace) {
        Some((scheme, param)) => (scheme, param.trim_start()),
        None => (value, ""),
    }
}

fn bearer_param(value: &str) -> Option<&str> {
    let (scheme, param) = split_scheme_param(value);
    (scheme.eq_ignore_ascii_case("bearer") && !param.is_empty()).then_some(param)
}

/// Extracts a bearer token from either of two channels
///
/// The header is consulted first and wins whenever it carries a usable
/// `Bearer` credential. The cookie may hold either `Bearer <token>` or the
/// bare token. Anything else (no credential, another scheme, an empty
/// token) is a failure, reported according to `auto_error`.
#[derive(Debug, Clone, Copy)]
pub struct BearerExtractor {
    auto_error: bool,
}

impl Default for BearerExtractor {
    fn default() -> Self {
        Self { auto_error: true }
    }
}

impl BearerExtractor {
    pub fn new(auto_error: bool) -> Self {
        Self { auto_error }
    }

    /// Extractor that reports a missing token as `Ok(None)`
    pub fn optional() -> Self {
        Self::new(false)
    }

    pub fn auto_error(&self) -> bool {
        self.auto_error
    }

    /// Pull the raw token out of the request headers
    ///
    /// Returns `Ok(Some(token))` on success. On failure returns
    /// `Err(MissingOrMalformedToken)` when `auto_error` is set and
    /// `Ok(None)` otherwise.
    pub fn extract(&self, headers: &HeaderMap) -> Result<Option<String>, AuthError> {
        match Self::find_token(headers) {
            Some(token) => Ok(Some(token)),
            None if self.auto_error => Err(AuthError::MissingOrMalformedToken),
            None => Ok(None),
        }
    }

    fn find_token(headers: &HeaderMap) -> Option<String> {
        let from_header = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_param);
        if let Some(token) = from_header {
            return Some(token.to_string());
        }

        let jar = CookieJar::from_headers(headers);
        let cookie = jar.get(ACCESS_TOKEN_COOKIE)?;
        let value = cookie.value().trim().trim_matches('"');
        match split_scheme_param(value) {
            (token, "") if !token.is_empty() => Some(token.to_string()),
            _ => bearer_param(value).map(str::to_string),
        }
    }
}
