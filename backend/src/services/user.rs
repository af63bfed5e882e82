//! User service for registration, login and profile management
//!
//! Password hashing and verification run on the blocking thread pool.

use crate::auth::{AuthError, JwtService, PasswordService, MAX_PASSWORD_BYTES};
use crate::error::ApiError;
use crate::repositories::{CreateUser, UpdateUserProfile, UserRecord, UserStore};
use catalog_shared::types::{AuthTokens, RegisterRequest, UserProfile, UserProfileUpdate};
use catalog_shared::validation::{validate_password, validate_username};
use tracing::{info, warn};
use validator::ValidateEmail;

impl From<UserRecord> for UserProfile {
    fn from(user: UserRecord) -> Self {
        Self {
            username: user.username,
            email: user.email,
            primary_email: user.primary_email,
            number: user.number,
            address: user.address,
            created_at: user.created_at,
        }
    }
}

fn check_email(email: Option<&str>) -> Result<(), ApiError> {
    match email {
        Some(email) if !email.validate_email() => {
            Err(ApiError::Validation("Invalid email format".to_string()))
        }
        _ => Ok(()),
    }
}

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Register a new user
    pub async fn register(users: &dyn UserStore, req: RegisterRequest) -> Result<UserProfile, ApiError> {
        validate_username(&req.username).map_err(ApiError::Validation)?;
        validate_password(&req.password).map_err(ApiError::Validation)?;
        check_email(req.email.as_deref())?;

        if users.find_by_username(&req.username).await?.is_some() {
            return Err(ApiError::Conflict("Username already registered".to_string()));
        }

        let password_hash = PasswordService::hash_async(req.password).await?;

        // A concurrent registration may still have claimed the name
        let user = users
            .create(CreateUser {
                username: req.username,
                password_hash,
                email: req.email,
            })
            .await?
            .ok_or_else(|| ApiError::Conflict("Username already registered".to_string()))?;

        info!(username = %user.username, "User registered");
        Ok(UserProfile::from(user))
    }

    /// Login with username and password (OAuth2 password grant)
    pub async fn login(
        users: &dyn UserStore,
        jwt_service: &JwtService,
        username: &str,
        password: &str,
    ) -> Result<AuthTokens, ApiError> {
        // No stored hash can match these, and bcrypt would truncate them
        if password.len() > MAX_PASSWORD_BYTES {
            warn!(username = %username, "Login with overlong password");
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        }

        let Some(user) = users.find_by_username(username).await? else {
            PasswordService::verify_dummy_async(password.to_string()).await?;
            warn!(username = %username, "Login for unknown user");
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        };

        let valid = PasswordService::verify_async(password.to_string(), user.password_hash.clone())
            .await?;

        if !valid {
            warn!(username = %username, "Failed login attempt");
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        }

        info!(username = %user.username, "User logged in");
        Self::issue_tokens(jwt_service, &user.username)
    }

    /// Exchange a refresh token for a new token pair
    pub async fn refresh_token(
        users: &dyn UserStore,
        jwt_service: &JwtService,
        refresh_token: &str,
    ) -> Result<AuthTokens, ApiError> {
        let claims = jwt_service.validate_refresh_token(refresh_token)?;

        // The account may have been removed since the token was issued
        users
            .find_by_username(&claims.sub)
            .await?
            .ok_or(AuthError::UnknownSubject)?;

        Self::issue_tokens(jwt_service, &claims.sub)
    }

    fn issue_tokens(jwt_service: &JwtService, username: &str) -> Result<AuthTokens, ApiError> {
        Ok(AuthTokens {
            access_token: jwt_service.generate_access_token(username)?,
            refresh_token: jwt_service.generate_refresh_token(username)?,
            token_type: "bearer".to_string(),
            expires_in: jwt_service.access_token_expiry_secs(),
        })
    }

    /// Get user profile
    pub async fn get_profile(users: &dyn UserStore, username: &str) -> Result<UserProfile, ApiError> {
        users
            .find_by_username(username)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Update contact fields of the user's own profile
    pub async fn update_profile(
        users: &dyn UserStore,
        username: &str,
        update: UserProfileUpdate,
    ) -> Result<UserProfile, ApiError> {
        check_email(update.email.as_deref())?;
        check_email(update.primary_email.as_deref())?;

        let user = users
            .update_profile(
                username,
                UpdateUserProfile {
                    email: update.email,
                    primary_email: update.primary_email,
                    number: update.number,
                    address: update.address,
                },
            )
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(UserProfile::from(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::MemoryUsers;
    use secrecy::SecretString;

    fn jwt() -> JwtService {
        JwtService::new(&SecretString::new("test-secret-key".to_string()), 3600, 86400)
    }

    async fn store_with_password(username: &str, password: &str) -> MemoryUsers {
        let users = MemoryUsers::default();
        users
            .create(CreateUser {
                username: username.to_string(),
                password_hash: PasswordService::hash_with_cost(password, 4).unwrap(),
                email: None,
            })
            .await
            .unwrap();
        users
    }

    #[tokio::test]
    async fn test_login_rejects_password_extended_past_72_bytes() {
        let password = "k".repeat(MAX_PASSWORD_BYTES);
        let users = store_with_password("krassy", &password).await;

        assert!(UserService::login(&users, &jwt(), "krassy", &password).await.is_ok());

        let err = UserService::login(&users, &jwt(), "krassy", &format!("{}-and-more", password))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(msg) if msg == "Invalid credentials"));
    }

    #[tokio::test]
    async fn test_login_unknown_user_matches_wrong_password() {
        let users = store_with_password("krassy", "correct-horse").await;

        let unknown = UserService::login(&users, &jwt(), "nobody", "correct-horse")
            .await
            .unwrap_err();
        let wrong = UserService::login(&users, &jwt(), "krassy", "battery-staple")
            .await
            .unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(matches!(unknown, ApiError::Unauthorized(msg) if msg == "Invalid credentials"));
    }

    #[test]
    fn test_check_email() {
        assert!(check_email(None).is_ok());
        assert!(check_email(Some("krassy@mail.bg")).is_ok());
        assert!(matches!(check_email(Some("not-an-email")), Err(ApiError::Validation(_))));
    }
}
