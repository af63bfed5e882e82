//! JWT token generation and validation
//!
//! Provides access and refresh token management with pre-computed keys.
//! Tokens are HS256-signed and carry the username as subject.

use super::AuthError;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Kind of token, stored in the `token_type` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub token_type: TokenType,
}

/// Pre-computed JWT keys
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new JWT keys from secret
    /// This should be called once at startup
    pub fn new(secret: &SecretString) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret)),
            decoding: Arc::new(DecodingKey::from_secret(secret)),
        }
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Token lifetimes
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
}

/// JWT service for token operations
///
/// Keys are derived once and wrapped in Arc for cheap cloning. The secret is
/// injected at construction; nothing here reads global state.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    config: JwtConfig,
    validation: Arc<Validation>,
}

impl JwtService {
    /// Create a new JWT service with pre-computed keys
    ///
    /// Call this once at application startup and store in AppState.
    pub fn new(
        secret: &SecretString,
        access_token_expiry_secs: i64,
        refresh_token_expiry_secs: i64,
    ) -> Self {
        Self {
            keys: JwtKeys::new(secret),
            config: JwtConfig {
                access_token_expiry_secs,
                refresh_token_expiry_secs,
            },
            validation: Arc::new(Self::build_validation()),
        }
    }

    // Expiry is checked by hand in `validate_at` so that the signature is
    // always verified first and the clock can be injected.
    fn build_validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }

    /// Issue an access token for `subject` that expires `ttl` from now
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String> {
        self.generate_token(subject, TokenType::Access, ttl)
    }

    /// Generate an access token with the configured lifetime
    #[inline]
    pub fn generate_access_token(&self, username: &str) -> Result<String> {
        self.generate_token(
            username,
            TokenType::Access,
            Duration::seconds(self.config.access_token_expiry_secs),
        )
    }

    /// Generate a refresh token with the configured lifetime
    #[inline]
    pub fn generate_refresh_token(&self, username: &str) -> Result<String> {
        self.generate_token(
            username,
            TokenType::Refresh,
            Duration::seconds(self.config.refresh_token_expiry_secs),
        )
    }

    fn generate_token(&self, subject: &str, token_type: TokenType, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let exp = now + ttl;

        let claims = Claims {
            sub: subject.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type,
        };

        encode(&Header::new(Algorithm::HS256), &claims, self.keys.encoding())
            .map_err(|e| anyhow::anyhow!("Failed to generate {:?} token: {}", token_type, e))
    }

    /// Validate an access token and return its subject
    pub fn validate(&self, token: &str) -> Result<String, AuthError> {
        self.validate_access_token(token).map(|claims| claims.sub)
    }

    /// Validate a token of any type against the given clock
    ///
    /// Order matters: signature first, then expiry. A token whose expiry has
    /// passed is rejected even though its signature is valid.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, self.keys.decoding(), &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                kind => {
                    debug!(error = ?kind, "Rejected undecodable token");
                    AuthError::MissingOrMalformedToken
                }
            })?;

        let claims = token_data.claims;
        if now.timestamp() > claims.exp {
            return Err(AuthError::Expired);
        }
        if claims.sub.is_empty() {
            return Err(AuthError::MissingOrMalformedToken);
        }

        Ok(claims)
    }

    /// Validate a token of any type against the current time
    #[inline]
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate an access token specifically
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != TokenType::Access {
            return Err(AuthError::MissingOrMalformedToken);
        }
        Ok(claims)
    }

    /// Validate a refresh token specifically
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != TokenType::Refresh {
            return Err(AuthError::MissingOrMalformedToken);
        }
        Ok(claims)
    }

    /// Get access token expiry in seconds
    #[inline]
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.config.access_token_expiry_secs
    }
}
