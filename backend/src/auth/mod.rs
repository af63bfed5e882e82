//! Authentication module
//!
//! Provides JWT-based bearer authentication with bcrypt password hashing.
//! Tokens are accepted from the `Authorization` header or the
//! `access_token` cookie.

mod error;
mod extractor;
mod jwt;
mod middleware;
mod password;

pub use error::AuthError;
pub use extractor::{split_scheme_param, BearerExtractor, ACCESS_TOKEN_COOKIE};
pub use jwt::{Claims, JwtService, TokenType};
pub use middleware::{require_auth, CurrentUser, CurrentUserResolver, Identity, OptionalUser};
pub use password::{PasswordService, MAX_PASSWORD_BYTES};
