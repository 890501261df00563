//! Authentication: password hashing, the token service and account flows.
//!
//! Access and refresh tokens are signed JWTs distinguished by a `scope`
//! claim; the current refresh token is additionally mirrored on the account
//! row, which is the sole revocation mechanism. Email-confirmation tokens
//! are scope-less one-shot credentials.

pub mod ban;
pub mod crypto;
pub mod service;
pub mod tokens;

pub use ban::ensure_not_banned;
pub use crypto::{PasswordCrypto, PasswordCryptoError};
pub use service::{AuthError, AuthService, EmailConfirmation, TokenPair};
pub use tokens::{TokenConfig, TokenError, TokenScope, TokenService};

use thiserror::Error;

/// Login/refresh precondition failures.
///
/// The variants are deliberately coarse: a missing account and a wrong
/// password both surface as [`InvalidCredentials`](Self::InvalidCredentials)
/// so the response does not leak which one it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticationError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email not confirmed")]
    EmailNotConfirmed,

    #[error("account is banned")]
    Banned,
}
