//! Tag normalization and the per-image attach cap.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::{NotFound, ValidationError};
use crate::store::TagStore;

/// Longest tag name kept after normalization.
pub const MAX_TAG_LEN: usize = 25;
/// Most tags that may be associated with one image.
pub const MAX_TAGS_PER_IMAGE: usize = 5;

/// A globally unique tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    /// Lowercase, at most [`MAX_TAG_LEN`] characters.
    pub name: String,
}

/// Canonicalize free-text tag input.
///
/// Each entry is split on commas; tokens are trimmed, empties dropped,
/// truncated to [`MAX_TAG_LEN`] characters, lowercased, then deduplicated
/// preserving first-seen order. Truncation happens before deduplication, so
/// two long tags sharing a 25-character prefix collapse into one.
pub fn normalize_tags(raw_entries: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::new();
    for entry in raw_entries {
        for token in entry.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let name = token.chars().take(MAX_TAG_LEN).collect::<String>().to_lowercase();
            if seen.insert(name.clone()) {
                normalized.push(name);
            }
        }
    }
    normalized
}

/// Result of resolving tags for attachment to an image.
///
/// All normalized names exist as tag rows afterwards; only the first
/// [`MAX_TAGS_PER_IMAGE`] are handed back for association. Anything beyond
/// the cap is reported through `dropped`/`warning`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAttachment {
    /// Tags to associate, in first-seen order, at most the cap.
    pub tags: Vec<Tag>,
    /// Normalized names beyond the cap that were not associated.
    pub dropped: usize,
    pub warning: Option<String>,
}

#[derive(Debug, Error)]
pub enum TagError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Tag rules over the tag store.
pub struct TagService {
    tags: Arc<dyn TagStore>,
}

impl fmt::Debug for TagService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagService")
            .field("tag_store_refs", &Arc::strong_count(&self.tags))
            .finish()
    }
}

impl TagService {
    pub fn new(tags: Arc<dyn TagStore>) -> Self {
        Self { tags }
    }

    /// Normalize raw tag input and resolve it for attachment.
    ///
    /// Every normalized name is created as a tag row if it does not exist
    /// yet, even past the cap, but only the first [`MAX_TAGS_PER_IMAGE`]
    /// come back for association. Writing the image/tag association itself
    /// is the persistence layer's job.
    pub async fn attach_tags(&self, raw_entries: &[String]) -> Result<TagAttachment, TagError> {
        let names = normalize_tags(raw_entries);

        let mut resolved = Vec::with_capacity(names.len());
        for name in &names {
            let tag = match self.tags.find_by_name(name).await? {
                Some(tag) => tag,
                None => {
                    self.tags
                        .insert(Tag {
                            id: Uuid::new_v4(),
                            name: name.clone(),
                        })
                        .await?
                }
            };
            resolved.push(tag);
        }

        let dropped = resolved.len().saturating_sub(MAX_TAGS_PER_IMAGE);
        resolved.truncate(MAX_TAGS_PER_IMAGE);
        let warning = (dropped > 0).then(|| {
            format!(
                "an image can carry at most {MAX_TAGS_PER_IMAGE} tags; {dropped} were not attached"
            )
        });

        Ok(TagAttachment {
            tags: resolved,
            dropped,
            warning,
        })
    }

    /// Create a single tag, normalized to lowercase.
    pub async fn create_tag(&self, name: &str) -> Result<Tag, TagError> {
        let name = name.trim().chars().take(MAX_TAG_LEN).collect::<String>().to_lowercase();
        if self.tags.find_by_name(&name).await?.is_some() {
            return Err(ValidationError::TagNameTaken.into());
        }
        Ok(self
            .tags
            .insert(Tag {
                id: Uuid::new_v4(),
                name,
            })
            .await?)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Tag, TagError> {
        let name = name.trim().to_lowercase();
        Ok(self.tags.find_by_name(&name).await?.ok_or(NotFound::Tag)?)
    }

    pub async fn list(&self, skip: usize, limit: usize) -> Result<Vec<Tag>, TagError> {
        Ok(self.tags.list(skip, limit).await?)
    }

    /// Rename a tag; the target name must not already be taken.
    pub async fn update_tag(&self, tag_id: Uuid, name: &str) -> Result<Tag, TagError> {
        let name = name.trim().to_lowercase();
        if let Some(existing) = self.tags.find_by_name(&name).await? {
            if existing.id != tag_id {
                return Err(ValidationError::TagNameTaken.into());
            }
        }
        Ok(self.tags.rename(tag_id, &name).await?.ok_or(NotFound::Tag)?)
    }

    pub async fn remove_tag(&self, tag_id: Uuid) -> Result<Tag, TagError> {
        Ok(self.tags.delete(tag_id).await?.ok_or(NotFound::Tag)?)
    }
}
