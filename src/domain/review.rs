use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_RATING: i16 = 0;
pub const MAX_RATING: i16 = 5;

/// A review embedded in a location. Stored inside the location's `reviews`
/// JSONB column, so the serde shape is also the storage shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub author: String,
    pub rating: i16,
    pub review_text: String,
    pub created_on: DateTime<Utc>,
}

impl Review {
    pub fn new(author: String, rating: i16, review_text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            rating,
            review_text,
            created_on: Utc::now(),
        }
    }

    /// Overwrites the editable fields. `id` and `created_on` are left alone.
    pub fn amend(&mut self, author: String, rating: i16, review_text: String) {
        self.author = author;
        self.rating = rating;
        self.review_text = review_text;
    }
}

/// Review as returned by a single-review read, with its parent location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedReview {
    pub location_id: Uuid,
    pub location_name: String,
    pub review: Review,
}

pub fn validate_review(author: &str, rating: i16, review_text: &str) -> Result<(), String> {
    if author.trim().is_empty() {
        return Err("Review author is required".to_string());
    }
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(format!(
            "Rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        ));
    }
    if review_text.trim().is_empty() {
        return Err("Review text is required".to_string());
    }
    Ok(())
}

/// Truncated mean of the review ratings, 0 for no reviews.
pub fn average_rating(reviews: &[Review]) -> i16 {
    if reviews.is_empty() {
        return 0;
    }

    let total: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
    (total / reviews.len() as i64) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_with_rating(rating: i16) -> Review {
        Review::new("Simon".to_string(), rating, "Good coffee".to_string())
    }

    #[test]
    fn test_review_creation() {
        let review = Review::new("Simon".to_string(), 4, "Lovely wifi".to_string());

        assert_eq!(review.author, "Simon");
        assert_eq!(review.rating, 4);
        assert_eq!(review.review_text, "Lovely wifi");
        assert!(review.created_on <= Utc::now());
    }

    #[test]
    fn test_amend_keeps_identity_and_timestamp() {
        let mut review = review_with_rating(2);
        let id = review.id;
        let created_on = review.created_on;

        review.amend("Charlie".to_string(), 5, "Changed my mind".to_string());

        assert_eq!(review.id, id);
        assert_eq!(review.created_on, created_on);
        assert_eq!(review.author, "Charlie");
        assert_eq!(review.rating, 5);
        assert_eq!(review.review_text, "Changed my mind");
    }

    #[test]
    fn test_average_rating_empty_is_zero() {
        assert_eq!(average_rating(&[]), 0);
    }

    #[test]
    fn test_average_rating_truncates() {
        let reviews = vec![review_with_rating(4), review_with_rating(2), review_with_rating(5)];
        // 11 / 3 = 3.67
        assert_eq!(average_rating(&reviews), 3);

        let reviews = vec![review_with_rating(5), review_with_rating(4)];
        assert_eq!(average_rating(&reviews), 4);
    }

    #[test]
    fn test_average_rating_single_review() {
        assert_eq!(average_rating(&[review_with_rating(3)]), 3);
        assert_eq!(average_rating(&[review_with_rating(0)]), 0);
    }

    #[test]
    fn test_validate_review_bounds() {
        assert!(validate_review("a", 0, "text").is_ok());
        assert!(validate_review("a", 5, "text").is_ok());
        assert!(validate_review("a", -1, "text").is_err());
        assert!(validate_review("a", 6, "text").is_err());
    }

    #[test]
    fn test_validate_review_requires_author_and_text() {
        let err = validate_review("  ", 3, "text").unwrap_err();
        assert!(err.contains("author"));

        let err = validate_review("Simon", 3, "").unwrap_err();
        assert!(err.contains("text"));
    }

    #[test]
    fn test_review_serializes_camel_case() {
        let review = review_with_rating(3);
        let json = serde_json::to_value(&review).unwrap();

        assert!(json.get("reviewText").is_some());
        assert!(json.get("createdOn").is_some());
        assert!(json.get("review_text").is_none());

        let back: Review = serde_json::from_value(json).unwrap();
        assert_eq!(back, review);
    }
}
