use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{parse_id, validation_error, JsonBody};
use crate::domain::review::{LocatedReview, Review};
use crate::domain::user::Principal;
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: Uuid,
    pub author: String,
    pub rating: i16,
    pub review_text: String,
    pub created_on: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            author: r.author,
            rating: r.rating,
            review_text: r.review_text,
            created_on: r.created_on,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ParentLocation {
    pub name: String,
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct LocatedReviewResponse {
    pub location: ParentLocation,
    pub review: ReviewResponse,
}

impl From<LocatedReview> for LocatedReviewResponse {
    fn from(r: LocatedReview) -> Self {
        Self {
            location: ParentLocation {
                name: r.location_name,
                id: r.location_id,
            },
            review: r.review.into(),
        }
    }
}

/// Any `author` in the body is ignored; the author comes from the token.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    #[validate(required, range(min = 0, max = 5))]
    pub rating: Option<i16>,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub review_text: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub author: String,
    #[validate(required, range(min = 0, max = 5))]
    pub rating: Option<i16>,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub review_text: String,
}

#[tracing::instrument(skip(state, principal, payload), fields(%location_id))]
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    principal: Option<Extension<Principal>>,
    Path(location_id): Path<String>,
    WithRejection(Json(payload), _): JsonBody<CreateReviewRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling create review request");

    let author = state
        .auth_usecase
        .resolve_author(principal.as_ref().map(|Extension(p)| p))
        .await?;
    let location_id = parse_id(&location_id, "Location")?;
    payload.validate().map_err(validation_error)?;

    let review = state
        .reviews_usecase
        .create_review(
            location_id,
            author,
            payload.rating.unwrap_or_default(),
            payload.review_text,
        )
        .await?;

    tracing::debug!(review_id = %review.id, "review created");
    Ok((StatusCode::CREATED, Json(ReviewResponse::from(review))))
}

#[tracing::instrument(skip(state), fields(%location_id, %review_id))]
pub async fn get_review(
    State(state): State<Arc<AppState>>,
    Path((location_id, review_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling get review request");

    let location_id = parse_id(&location_id, "Location")?;
    let review_id = parse_id(&review_id, "Review")?;

    let located = state.reviews_usecase.get_review(location_id, review_id).await?;

    Ok((StatusCode::OK, Json(LocatedReviewResponse::from(located))))
}

#[tracing::instrument(skip(state, payload), fields(%location_id, %review_id))]
pub async fn update_review(
    State(state): State<Arc<AppState>>,
    Path((location_id, review_id)): Path<(String, String)>,
    WithRejection(Json(payload), _): JsonBody<UpdateReviewRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling update review request");

    let location_id = parse_id(&location_id, "Location")?;
    let review_id = parse_id(&review_id, "Review")?;
    payload.validate().map_err(validation_error)?;

    let review = state
        .reviews_usecase
        .update_review(
            location_id,
            review_id,
            payload.author,
            payload.rating.unwrap_or_default(),
            payload.review_text,
        )
        .await?;

    Ok((StatusCode::OK, Json(ReviewResponse::from(review))))
}

#[tracing::instrument(skip(state), fields(%location_id, %review_id))]
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    Path((location_id, review_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling delete review request");

    let location_id = parse_id(&location_id, "Location")?;
    let review_id = parse_id(&review_id, "Review")?;

    state
        .reviews_usecase
        .delete_review(location_id, review_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
