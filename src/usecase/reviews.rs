use uuid::Uuid;

use crate::domain::location::Location;
use crate::domain::review::{average_rating, validate_review, LocatedReview, Review};
use crate::repository::errors::RepositoryError;
use crate::usecase::contracts::LocationRepository;
use crate::usecase::error::UsecaseError;

pub struct ReviewsUseCase<L>
where
    L: LocationRepository,
{
    location_repository: L,
}

impl<L> ReviewsUseCase<L>
where
    L: LocationRepository,
{
    pub fn new(location_repository: L) -> Self {
        Self { location_repository }
    }

    #[tracing::instrument(skip(self, author, review_text), fields(location_id = %location_id))]
    pub async fn create_review(
        &self,
        location_id: Uuid,
        author: String,
        rating: i16,
        review_text: String,
    ) -> Result<Review, UsecaseError> {
        tracing::debug!("creating review");

        let mut location = self.load_location(location_id).await?;
        validate_review(&author, rating, &review_text).map_err(UsecaseError::Validation)?;

        let review = Review::new(author, rating, review_text);
        location.reviews.push(review.clone());
        self.save_reviews(&location).await?;

        self.recompute_rating(location_id).await;

        metrics::counter!("reviews_created_total").increment(1);
        tracing::info!(review_id = %review.id, location_id = %location_id, "review created successfully");
        Ok(review)
    }

    #[tracing::instrument(skip(self), fields(location_id = %location_id, review_id = %review_id))]
    pub async fn get_review(
        &self,
        location_id: Uuid,
        review_id: Uuid,
    ) -> Result<LocatedReview, UsecaseError> {
        tracing::debug!("getting review");

        let location = self.load_location(location_id).await?;
        let review = location
            .find_review(review_id)
            .cloned()
            .ok_or_else(|| review_not_found(&location))?;

        Ok(LocatedReview {
            location_id: location.id,
            location_name: location.name,
            review,
        })
    }

    #[tracing::instrument(skip(self, author, review_text), fields(location_id = %location_id, review_id = %review_id))]
    pub async fn update_review(
        &self,
        location_id: Uuid,
        review_id: Uuid,
        author: String,
        rating: i16,
        review_text: String,
    ) -> Result<Review, UsecaseError> {
        tracing::debug!("updating review");

        let mut location = self.load_location(location_id).await?;
        if location.find_review(review_id).is_none() {
            return Err(review_not_found(&location));
        }
        validate_review(&author, rating, &review_text).map_err(UsecaseError::Validation)?;

        let updated = match location.find_review_mut(review_id) {
            Some(review) => {
                review.amend(author, rating, review_text);
                review.clone()
            }
            None => return Err(review_not_found(&location)),
        };
        self.save_reviews(&location).await?;

        self.recompute_rating(location_id).await;

        metrics::counter!("reviews_updated_total").increment(1);
        tracing::info!(review_id = %review_id, location_id = %location_id, "review updated successfully");
        Ok(updated)
    }

    #[tracing::instrument(skip(self), fields(location_id = %location_id, review_id = %review_id))]
    pub async fn delete_review(&self, location_id: Uuid, review_id: Uuid) -> Result<(), UsecaseError> {
        tracing::debug!("deleting review");

        let mut location = self.load_location(location_id).await?;
        if location.remove_review(review_id).is_none() {
            return Err(review_not_found(&location));
        }
        self.save_reviews(&location).await?;

        self.recompute_rating(location_id).await;

        metrics::counter!("reviews_deleted_total").increment(1);
        tracing::info!(review_id = %review_id, location_id = %location_id, "review deleted successfully");
        Ok(())
    }

    /// Reloads the location and stores the truncated mean of its current
    /// reviews (0 when none are left). Failures are logged and swallowed: the
    /// mutation that triggered the recomputation has already been persisted.
    #[tracing::instrument(skip(self), fields(location_id = %location_id))]
    pub async fn recompute_rating(&self, location_id: Uuid) {
        match self.try_recompute_rating(location_id).await {
            Ok(Some(rating)) => {
                tracing::debug!(rating, "average rating updated");
            }
            Ok(None) => {
                tracing::warn!("location vanished before rating recomputation");
            }
            Err(e) => {
                metrics::counter!("rating_recompute_failures_total").increment(1);
                tracing::error!(error = %e, "failed to recompute average rating");
            }
        }
    }

    async fn try_recompute_rating(&self, location_id: Uuid) -> Result<Option<i16>, RepositoryError> {
        let Some(location) = self.location_repository.find_by_id(location_id).await? else {
            return Ok(None);
        };

        let rating = average_rating(&location.reviews);
        self.location_repository.update_rating(location_id, rating).await?;
        Ok(Some(rating))
    }

    async fn load_location(&self, location_id: Uuid) -> Result<Location, UsecaseError> {
        self.location_repository
            .find_by_id(location_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Location".to_string()))
    }

    async fn save_reviews(&self, location: &Location) -> Result<(), UsecaseError> {
        self.location_repository
            .update_reviews(location.id, &location.reviews)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => UsecaseError::NotFound("Location".to_string()),
                other => other.into(),
            })
    }
}

/// "Reviews not found" when the location has none, "Review not found" otherwise.
fn review_not_found(location: &Location) -> UsecaseError {
    if location.reviews.is_empty() {
        tracing::debug!(location_id = %location.id, "location has no reviews");
        return UsecaseError::NotFound("Reviews".to_string());
    }
    UsecaseError::NotFound("Review".to_string())
}
