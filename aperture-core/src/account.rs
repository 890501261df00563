//! Account model and signup/profile payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::rbac::Principal;

/// Role granted to an account.
///
/// Roles are a closed set and deliberately non-hierarchical: an allow-list
/// that names `Moderator` does not admit `Admin` unless it names `Admin` too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Moderator,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account as seen by this core.
///
/// # Invariants
/// - `email` is unique and stored lowercase.
/// - `refresh_token` mirrors the exact string of the single live refresh
///   token, or is `None` when no refresh credential is outstanding; this
///   mirror is the sole revocation mechanism.
/// - Accounts are never hard-deleted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub confirmed: bool,
    pub banned: bool,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// The authorization view of this account.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            role: self.role,
        }
    }
}

/// Signup request payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub username: String,
    /// Will be normalized to lowercase before storage.
    pub email: String,
    /// Plain text; hashed before it ever reaches a store.
    pub password: String,
}

impl NewAccount {
    /// Validate the payload before any account is created.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::UsernameEmpty);
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(ValidationError::InvalidEmail);
        }
        if self.password.len() < 8 {
            return Err(ValidationError::PasswordTooShort);
        }
        Ok(())
    }
}

/// Profile fields an account holder may change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
}
