use std::fmt;
use std::sync::Arc;

use constant_time_eq::constant_time_eq;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::account::{Account, NewAccount, ProfileUpdate, Role};
use crate::error::{NotFound, ValidationError};
use crate::store::AccountStore;

use super::AuthenticationError;
use super::ban::ensure_not_banned;
use super::crypto::{PasswordCrypto, PasswordCryptoError};
use super::tokens::{TokenError, TokenService};

/// Anything the auth flows can fail with.
///
/// The inner enums are the client-facing taxonomy; `Storage` wraps opaque
/// collaborator failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Crypto(#[from] PasswordCryptoError),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Access/refresh pair handed back by login and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

impl TokenPair {
    fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer",
        }
    }
}

/// Outcome of an email-confirmation exchange.
///
/// Confirming twice is a success, not an error; callers that want to tell
/// the user apart can branch on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailConfirmation {
    Confirmed,
    AlreadyConfirmed,
}

/// Account lifecycle orchestration over an [`AccountStore`].
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    tokens: TokenService,
    crypto: PasswordCrypto,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("account_store_refs", &Arc::strong_count(&self.accounts))
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(accounts: Arc<dyn AccountStore>, tokens: TokenService, crypto: PasswordCrypto) -> Self {
        Self {
            accounts,
            tokens,
            crypto,
        }
    }

    /// The token service this instance signs with, for callers that only
    /// need verification (request guards, middleware).
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Create an account.
    ///
    /// The first account in an empty system is promoted to admin; everyone
    /// after that starts as a regular user, unconfirmed and unbanned.
    /// Dispatching the confirmation mail is the caller's concern.
    pub async fn signup(&self, new: NewAccount) -> Result<Account, AuthError> {
        new.validate()?;

        let new = NewAccount {
            username: new.username.trim().to_string(),
            email: new.email.trim().to_lowercase(),
            password: new.password,
        };

        if self.accounts.find_by_email(&new.email).await?.is_some() {
            return Err(ValidationError::EmailTaken.into());
        }

        let password_hash = self.crypto.hash_password(&new.password)?;
        let role = if self.accounts.count_admins().await? == 0 {
            Role::Admin
        } else {
            Role::User
        };

        let account = self.accounts.create(&new, &password_hash, role).await?;
        info!(email = %account.email, role = %account.role, "account created");
        Ok(account)
    }

    /// Authenticate with email and password, issuing a fresh token pair.
    ///
    /// The precondition order is part of the contract, since it determines
    /// which error surfaces: existence, confirmation, password, ban.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let email = email.trim().to_lowercase();
        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or(AuthenticationError::InvalidCredentials)?;

        if !account.confirmed {
            return Err(AuthenticationError::EmailNotConfirmed.into());
        }
        if !self
            .crypto
            .verify_password(password, &account.password_hash)?
        {
            return Err(AuthenticationError::InvalidCredentials.into());
        }
        ensure_not_banned(&account)?;

        let pair = self.issue_pair(&account.email)?;
        self.accounts
            .set_refresh_token(&account.email, Some(&pair.refresh_token))
            .await?;
        Ok(pair)
    }

    /// Exchange a refresh token for a new access/refresh pair, rotating the
    /// stored refresh token.
    ///
    /// The presented token must match the account's stored token
    /// byte-for-byte. A mismatch means the token was already rotated away
    /// (replay, theft, or a lost race) and poisons the session: the stored
    /// token is cleared before [`TokenError::ReuseDetected`] propagates, so
    /// every outstanding refresh credential for the account dies with it.
    pub async fn refresh(&self, presented: &str) -> Result<TokenPair, AuthError> {
        let subject = self.tokens.decode_refresh_token(presented)?;
        let account = self
            .accounts
            .find_by_email(&subject)
            .await?
            .ok_or(NotFound::Account)?;

        let current = account.refresh_token.as_deref();
        let matches =
            current.is_some_and(|stored| constant_time_eq(stored.as_bytes(), presented.as_bytes()));
        if !matches {
            warn!(email = %account.email, "refresh token reuse detected, revoking session");
            self.accounts.set_refresh_token(&account.email, None).await?;
            return Err(TokenError::ReuseDetected.into());
        }

        ensure_not_banned(&account)?;

        let pair = self.issue_pair(&account.email)?;
        let swapped = self
            .accounts
            .swap_refresh_token(&account.email, Some(presented), Some(&pair.refresh_token))
            .await?;
        if !swapped {
            // A concurrent refresh won the rotation between our read and
            // write; the token we hold is stale now, same as a replay.
            warn!(email = %account.email, "refresh rotation lost a race, revoking session");
            self.accounts.set_refresh_token(&account.email, None).await?;
            return Err(TokenError::ReuseDetected.into());
        }
        Ok(pair)
    }

    /// Flip an account to confirmed via a one-shot email token.
    pub async fn confirm_email(&self, token: &str) -> Result<EmailConfirmation, AuthError> {
        let subject = self.tokens.decode_email_token(token)?;
        let account = self
            .accounts
            .find_by_email(&subject)
            .await?
            .ok_or(NotFound::Account)?;

        if account.confirmed {
            return Ok(EmailConfirmation::AlreadyConfirmed);
        }
        self.accounts.set_confirmed(&account.email).await?;
        info!(email = %account.email, "email confirmed");
        Ok(EmailConfirmation::Confirmed)
    }

    /// Resolve the account behind a presented access token.
    pub async fn current_account(&self, access_token: &str) -> Result<Account, AuthError> {
        let subject = self.tokens.verify_access_token(access_token)?;
        Ok(self
            .accounts
            .find_by_email(&subject)
            .await?
            .ok_or(NotFound::Account)?)
    }

    /// Suspend or reinstate an account (admin operation).
    ///
    /// Takes effect at the next login or refresh; see
    /// [`ensure_not_banned`](super::ban::ensure_not_banned) for the latency
    /// bound on already-issued access tokens.
    pub async fn set_banned(&self, email: &str, banned: bool) -> Result<(), AuthError> {
        let email = email.trim().to_lowercase();
        if self.accounts.find_by_email(&email).await?.is_none() {
            return Err(NotFound::Account.into());
        }
        self.accounts.set_banned(&email, banned).await?;
        info!(%email, banned, "ban flag updated");
        Ok(())
    }

    /// Update username/email on an existing account.
    pub async fn update_profile(
        &self,
        username: &str,
        update: ProfileUpdate,
    ) -> Result<Account, AuthError> {
        if update.username.trim().is_empty() {
            return Err(ValidationError::UsernameEmpty.into());
        }
        if update.email.trim().is_empty() || !update.email.contains('@') {
            return Err(ValidationError::InvalidEmail.into());
        }
        let update = ProfileUpdate {
            username: update.username.trim().to_string(),
            email: update.email.trim().to_lowercase(),
        };
        Ok(self
            .accounts
            .update_profile(username, &update)
            .await?
            .ok_or(NotFound::Account)?)
    }

    fn issue_pair(&self, subject: &str) -> Result<TokenPair, TokenError> {
        let access = self.tokens.issue_access_token(subject, None)?;
        let refresh = self.tokens.issue_refresh_token(subject, None)?;
        Ok(TokenPair::bearer(access, refresh))
    }
}
