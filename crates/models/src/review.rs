use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::listing::Listing;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A customer review as owned by the review source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub listing_id: String,
    pub user_id: String,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub helpful_count: u32,
}

impl Review {
    pub fn validate(&self) -> Result<(), ModelError> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ModelError::invalid("rating", self.rating));
        }
        if self.id.trim().is_empty() {
            return Err(ModelError::Validation("review id must not be empty".into()));
        }
        Ok(())
    }
}

impl AsRef<Review> for Review {
    fn as_ref(&self) -> &Review { self }
}

/// A review tagged with the listing it was collected from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedReview {
    #[serde(flatten)]
    pub review: Review,
    pub listing: Listing,
}

impl AnnotatedReview {
    pub fn new(review: Review, listing: Listing) -> Self { Self { review, listing } }

    pub fn id(&self) -> &str { &self.review.id }

    pub fn rating(&self) -> u8 { self.review.rating }

    pub fn user_id(&self) -> &str { &self.review.user_id }
}

impl AsRef<Review> for AnnotatedReview {
    fn as_ref(&self) -> &Review { &self.review }
}
