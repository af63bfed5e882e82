//! Password hashing using bcrypt
//!
//! Provides salted, deliberately slow password hashing and verification.
//!
//! # Performance Considerations
//!
//! bcrypt is intentionally CPU-intensive. In async contexts use the
//! `*_async` variants, which run on the blocking thread pool.

use anyhow::Result;
use std::sync::OnceLock;

/// bcrypt silently ignores everything past this many bytes
pub const MAX_PASSWORD_BYTES: usize = 72;

// Stand-in hash for logins against unknown accounts
static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// Password hashing service
///
/// Hashes carry their own salt and cost in the modular crypt format
/// (`$2b$<cost>$...`), so verification needs nothing but the stored string.
pub struct PasswordService;

impl PasswordService {
    /// Hash a password with the default cost (blocking operation)
    pub fn hash(password: &str) -> Result<String> {
        Self::hash_with_cost(password, bcrypt::DEFAULT_COST)
    }

    /// Hash a password with an explicit cost factor
    ///
    /// Passwords longer than [`MAX_PASSWORD_BYTES`] are refused rather than
    /// truncated.
    pub fn hash_with_cost(password: &str, cost: u32) -> Result<String> {
        if password.len() > MAX_PASSWORD_BYTES {
            anyhow::bail!("Password exceeds {} bytes", MAX_PASSWORD_BYTES);
        }
        bcrypt::hash(password, cost).map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
    }

    /// Hash a password asynchronously (non-blocking)
    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a hash (blocking operation)
    ///
    /// A malformed stored hash is an error, never a match. A password longer
    /// than [`MAX_PASSWORD_BYTES`] never matches.
    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }
        bcrypt::verify(password, hash).map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))
    }

    /// Verify a password asynchronously (non-blocking)
    pub async fn verify_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Spend the same work as [`Self::verify_async`] when there is no stored
    /// hash to check against. Always reports a mismatch.
    pub async fn verify_dummy_async(password: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || {
            let hash = match DUMMY_HASH.get() {
                Some(hash) => hash,
                None => {
                    let hash = Self::hash("not-a-real-account-password")?;
                    DUMMY_HASH.get_or_init(|| hash)
                }
            };
            Self::verify(&password, hash).map(|_| false)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }
}
