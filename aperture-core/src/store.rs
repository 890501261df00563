//! Collaborator traits for the persistence layer.
//!
//! The core never talks to a database directly. Each trait below is a thin
//! contract the hosting application implements against its own storage;
//! errors are opaque (`anyhow`) and get wrapped into the typed service
//! errors at the call sites.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::account::{Account, NewAccount, ProfileUpdate, Role};
use crate::ratings::{Rating, StarSelection};
use crate::tags::Tag;

/// Minimal view of an image needed for ownership checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRef {
    pub id: Uuid,
    pub owner_id: Uuid,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>>;
    /// Number of accounts currently holding the admin role.
    async fn count_admins(&self) -> Result<u64>;
    async fn create(&self, new: &NewAccount, password_hash: &str, role: Role) -> Result<Account>;
    /// Unconditionally replace the stored refresh token (login, revocation).
    async fn set_refresh_token(&self, email: &str, token: Option<&str>) -> Result<()>;
    /// Replace the stored refresh token only while it still equals `expected`.
    ///
    /// Returns `false` when the stored value changed underneath the caller,
    /// in which case nothing was written. This is the rotation primitive:
    /// two concurrent refresh calls must not both succeed against the same
    /// stored token.
    async fn swap_refresh_token(
        &self,
        email: &str,
        expected: Option<&str>,
        next: Option<&str>,
    ) -> Result<bool>;
    async fn set_confirmed(&self, email: &str) -> Result<()>;
    async fn set_banned(&self, email: &str, banned: bool) -> Result<()>;
    async fn update_profile(&self, username: &str, update: &ProfileUpdate)
        -> Result<Option<Account>>;
}

#[async_trait]
pub trait RatingStore: Send + Sync {
    async fn find(&self, rating_id: Uuid) -> Result<Option<Rating>>;
    async fn find_by_user_and_image(
        &self,
        user_id: Uuid,
        image_id: Uuid,
    ) -> Result<Option<Rating>>;
    async fn insert(&self, rating: Rating) -> Result<Rating>;
    async fn update_stars(&self, rating_id: Uuid, stars: StarSelection)
        -> Result<Option<Rating>>;
    async fn delete(&self, rating_id: Uuid) -> Result<Option<Rating>>;
    async fn list_for_image(&self, image_id: Uuid) -> Result<Vec<Rating>>;
}

#[async_trait]
pub trait TagStore: Send + Sync {
    async fn insert(&self, tag: Tag) -> Result<Tag>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>>;
    async fn find(&self, tag_id: Uuid) -> Result<Option<Tag>>;
    async fn list(&self, skip: usize, limit: usize) -> Result<Vec<Tag>>;
    async fn rename(&self, tag_id: Uuid, name: &str) -> Result<Option<Tag>>;
    async fn delete(&self, tag_id: Uuid) -> Result<Option<Tag>>;
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn find_image(&self, image_id: Uuid) -> Result<Option<ImageRef>>;
}
