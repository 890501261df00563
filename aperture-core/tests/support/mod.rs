//! Shared in-memory store for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use aperture_core::{
    Account, AccountStore, ImageRef, ImageStore, NewAccount, ProfileUpdate, Rating, RatingStore,
    Role, StarSelection, Tag, TagStore,
};

/// Single-lock store backing every collaborator trait.
///
/// `swap_refresh_token` is atomic under the lock, mirroring what a SQL
/// backend would do with a conditional UPDATE.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    accounts: Vec<Account>,
    ratings: Vec<Rating>,
    tags: Vec<Tag>,
    images: Vec<ImageRef>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_image(&self, owner_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        self.state
            .lock()
            .unwrap()
            .images
            .push(ImageRef { id, owner_id });
        id
    }

    pub fn account(&self, email: &str) -> Option<Account> {
        self.state
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|a| a.email == email)
            .cloned()
    }

    pub fn stored_refresh_token(&self, email: &str) -> Option<String> {
        self.account(email).and_then(|a| a.refresh_token)
    }

    pub fn tag_count(&self) -> usize {
        self.state.lock().unwrap().tags.len()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self.account(email))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn count_admins(&self) -> Result<u64> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .accounts
            .iter()
            .filter(|a| a.role == Role::Admin)
            .count() as u64)
    }

    async fn create(&self, new: &NewAccount, password_hash: &str, role: Role) -> Result<Account> {
        let account = Account {
            id: Uuid::new_v4(),
            email: new.email.clone(),
            username: new.username.clone(),
            password_hash: password_hash.to_string(),
            role,
            confirmed: false,
            banned: false,
            refresh_token: None,
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().accounts.push(account.clone());
        Ok(account)
    }

    async fn set_refresh_token(&self, email: &str, token: Option<&str>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(account) = state.accounts.iter_mut().find(|a| a.email == email) {
            account.refresh_token = token.map(|t| t.to_string());
        }
        Ok(())
    }

    async fn swap_refresh_token(
        &self,
        email: &str,
        expected: Option<&str>,
        next: Option<&str>,
    ) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(account) = state.accounts.iter_mut().find(|a| a.email == email) else {
            return Ok(false);
        };
        if account.refresh_token.as_deref() != expected {
            return Ok(false);
        }
        account.refresh_token = next.map(|t| t.to_string());
        Ok(true)
    }

    async fn set_confirmed(&self, email: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(account) = state.accounts.iter_mut().find(|a| a.email == email) {
            account.confirmed = true;
        }
        Ok(())
    }

    async fn set_banned(&self, email: &str, banned: bool) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(account) = state.accounts.iter_mut().find(|a| a.email == email) {
            account.banned = banned;
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        username: &str,
        update: &ProfileUpdate,
    ) -> Result<Option<Account>> {
        let mut state = self.state.lock().unwrap();
        let Some(account) = state.accounts.iter_mut().find(|a| a.username == username) else {
            return Ok(None);
        };
        account.username = update.username.clone();
        account.email = update.email.clone();
        Ok(Some(account.clone()))
    }
}

#[async_trait]
impl RatingStore for MemoryStore {
    async fn find(&self, rating_id: Uuid) -> Result<Option<Rating>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .ratings
            .iter()
            .find(|r| r.id == rating_id)
            .copied())
    }

    async fn find_by_user_and_image(
        &self,
        user_id: Uuid,
        image_id: Uuid,
    ) -> Result<Option<Rating>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .ratings
            .iter()
            .find(|r| r.user_id == user_id && r.image_id == image_id)
            .copied())
    }

    async fn insert(&self, rating: Rating) -> Result<Rating> {
        self.state.lock().unwrap().ratings.push(rating);
        Ok(rating)
    }

    async fn update_stars(
        &self,
        rating_id: Uuid,
        stars: StarSelection,
    ) -> Result<Option<Rating>> {
        let mut state = self.state.lock().unwrap();
        let Some(rating) = state.ratings.iter_mut().find(|r| r.id == rating_id) else {
            return Ok(None);
        };
        rating.stars = stars;
        Ok(Some(*rating))
    }

    async fn delete(&self, rating_id: Uuid) -> Result<Option<Rating>> {
        let mut state = self.state.lock().unwrap();
        let index = state.ratings.iter().position(|r| r.id == rating_id);
        Ok(index.map(|i| state.ratings.remove(i)))
    }

    async fn list_for_image(&self, image_id: Uuid) -> Result<Vec<Rating>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .ratings
            .iter()
            .filter(|r| r.image_id == image_id)
            .copied()
            .collect())
    }
}

#[async_trait]
impl TagStore for MemoryStore {
    async fn insert(&self, tag: Tag) -> Result<Tag> {
        self.state.lock().unwrap().tags.push(tag.clone());
        Ok(tag)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .tags
            .iter()
            .find(|t| t.name == name)
            .cloned())
    }

    async fn find(&self, tag_id: Uuid) -> Result<Option<Tag>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .tags
            .iter()
            .find(|t| t.id == tag_id)
            .cloned())
    }

    async fn list(&self, skip: usize, limit: usize) -> Result<Vec<Tag>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .tags
            .iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn rename(&self, tag_id: Uuid, name: &str) -> Result<Option<Tag>> {
        let mut state = self.state.lock().unwrap();
        let Some(tag) = state.tags.iter_mut().find(|t| t.id == tag_id) else {
            return Ok(None);
        };
        tag.name = name.to_string();
        Ok(Some(tag.clone()))
    }

    async fn delete(&self, tag_id: Uuid) -> Result<Option<Tag>> {
        let mut state = self.state.lock().unwrap();
        let index = state.tags.iter().position(|t| t.id == tag_id);
        Ok(index.map(|i| state.tags.remove(i)))
    }
}

#[async_trait]
impl ImageStore for MemoryStore {
    async fn find_image(&self, image_id: Uuid) -> Result<Option<ImageRef>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .images
            .iter()
            .find(|i| i.id == image_id)
            .copied())
    }
}
