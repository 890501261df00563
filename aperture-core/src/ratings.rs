//! Star ratings: selection validation, aggregation and the service rules.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::{NotFound, ValidationError};
use crate::rbac::Principal;
use crate::store::{ImageStore, RatingStore};

/// One-of-five star choice as submitted by a client.
///
/// Creation requires exactly one flag set; updates only reject more than
/// one, so a zero-flag selection can reach storage through an update. That
/// asymmetry is inherited behavior, kept until product decides otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarSelection {
    pub one_star: bool,
    pub two_stars: bool,
    pub three_stars: bool,
    pub four_stars: bool,
    pub five_stars: bool,
}

impl StarSelection {
    /// How many flags are set.
    pub fn selected_count(&self) -> usize {
        [
            self.one_star,
            self.two_stars,
            self.three_stars,
            self.four_stars,
            self.five_stars,
        ]
        .iter()
        .filter(|&&flag| flag)
        .count()
    }

    /// Numeric score of this selection: the value of the set flag, or 0
    /// when none is set.
    pub fn score(&self) -> u8 {
        let mut score = 0;
        if self.one_star {
            score += 1;
        }
        if self.two_stars {
            score += 2;
        }
        if self.three_stars {
            score += 3;
        }
        if self.four_stars {
            score += 4;
        }
        if self.five_stars {
            score += 5;
        }
        score
    }

    /// Convenience constructor for a single star value (1..=5).
    pub fn of(stars: u8) -> Self {
        Self {
            one_star: stars == 1,
            two_stars: stars == 2,
            three_stars: stars == 3,
            four_stars: stars == 4,
            five_stars: stars == 5,
        }
    }
}

/// A user's rating of an image.
///
/// At most one rating exists per (user, image), and the image owner never
/// holds one for their own image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    pub image_id: Uuid,
    pub user_id: Uuid,
    pub stars: StarSelection,
}

/// Mean score across ratings; 0 when there are none.
pub fn average_rating(ratings: &[Rating]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: u32 = ratings.iter().map(|r| u32::from(r.stars.score())).sum();
    f64::from(sum) / ratings.len() as f64
}

#[derive(Debug, Error)]
pub enum RatingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Rating rules over the rating and image stores.
pub struct RatingService {
    ratings: Arc<dyn RatingStore>,
    images: Arc<dyn ImageStore>,
}

impl fmt::Debug for RatingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RatingService")
            .field("rating_store_refs", &Arc::strong_count(&self.ratings))
            .field("image_store_refs", &Arc::strong_count(&self.images))
            .finish()
    }
}

impl RatingService {
    pub fn new(ratings: Arc<dyn RatingStore>, images: Arc<dyn ImageStore>) -> Self {
        Self { ratings, images }
    }

    /// Create a rating for an image.
    ///
    /// Owners cannot rate their own images, the selection must pick exactly
    /// one star value, and repeating a (user, image) pair returns the
    /// existing row unchanged rather than inserting or updating anything.
    pub async fn create_rating(
        &self,
        image_id: Uuid,
        rater: &Principal,
        selection: StarSelection,
    ) -> Result<Rating, RatingError> {
        let image = self
            .images
            .find_image(image_id)
            .await?
            .ok_or(NotFound::Image)?;
        if image.owner_id == rater.id {
            return Err(ValidationError::OwnRating.into());
        }
        if selection.selected_count() != 1 {
            return Err(ValidationError::RatingSelectionInvalid.into());
        }

        if let Some(existing) = self
            .ratings
            .find_by_user_and_image(rater.id, image_id)
            .await?
        {
            return Ok(existing);
        }

        let rating = Rating {
            id: Uuid::new_v4(),
            image_id,
            user_id: rater.id,
            stars: selection,
        };
        Ok(self.ratings.insert(rating).await?)
    }

    /// Replace the star selection on an existing rating.
    ///
    /// Rejects selections with more than one flag; a zero-flag selection is
    /// accepted (see [`StarSelection`]).
    pub async fn update_rating(
        &self,
        rating_id: Uuid,
        selection: StarSelection,
    ) -> Result<Rating, RatingError> {
        if selection.selected_count() > 1 {
            return Err(ValidationError::RatingSelectionInvalid.into());
        }
        Ok(self
            .ratings
            .update_stars(rating_id, selection)
            .await?
            .ok_or(NotFound::Rating)?)
    }

    pub async fn delete_rating(&self, rating_id: Uuid) -> Result<Rating, RatingError> {
        Ok(self
            .ratings
            .delete(rating_id)
            .await?
            .ok_or(NotFound::Rating)?)
    }

    pub async fn get_rating(&self, rating_id: Uuid) -> Result<Rating, RatingError> {
        Ok(self.ratings.find(rating_id).await?.ok_or(NotFound::Rating)?)
    }

    pub async fn list_for_image(&self, image_id: Uuid) -> Result<Vec<Rating>, RatingError> {
        Ok(self.ratings.list_for_image(image_id).await?)
    }

    /// Mean score for one image.
    pub async fn average_for_image(&self, image_id: Uuid) -> Result<f64, RatingError> {
        let ratings = self.ratings.list_for_image(image_id).await?;
        Ok(average_rating(&ratings))
    }
}
