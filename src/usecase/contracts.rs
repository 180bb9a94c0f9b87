use uuid::Uuid;

use crate::{
    domain::location::{GeoPoint, Location, NearbyLocation},
    domain::review::Review,
    domain::user::User,
    repository::errors::RepositoryError,
};

#[cfg_attr(test, mockall::automock)]
pub trait LocationRepository: Send + Sync {
    async fn create(&self, location: &Location) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, RepositoryError>;
    /// Writes the client-editable fields only; rating and reviews are not touched.
    async fn update_details(&self, location: &Location) -> Result<(), RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
    /// Replaces the embedded review list wholesale (last write wins).
    async fn update_reviews(&self, id: Uuid, reviews: &[Review]) -> Result<(), RepositoryError>;
    async fn update_rating(&self, id: Uuid, rating: i16) -> Result<(), RepositoryError>;
    async fn find_nearby(
        &self,
        point: GeoPoint,
        max_distance_m: f64,
        limit: i64,
    ) -> Result<Vec<NearbyLocation>, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), RepositoryError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
}
