//! Authentication failure taxonomy

use thiserror::Error;

/// Why a request could not be authenticated
///
/// The variants exist for logging and tests only. At the HTTP boundary every
/// one of them becomes the same `401 Not authorized` response, so a caller
/// cannot tell a forged token from an expired one or from a deleted user.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is missing or malformed")]
    MissingOrMalformedToken,

    #[error("token subject does not exist")]
    UnknownSubject,
}

impl AuthError {
    /// The only message ever shown to the client
    pub const PUBLIC_MESSAGE: &'static str = "Not authorized";
}
