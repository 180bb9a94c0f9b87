use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use uuid::Uuid;

use crate::{
    domain::location::{EARTH_RADIUS_M, GeoPoint, Location, NearbyLocation},
    domain::review::Review,
    domain::user::User,
    repository::errors::RepositoryError,
    usecase::contracts::{LocationRepository, UserRepository},
};

const LOCATION_COLUMNS: &str =
    "id, name, address, rating, facilities, lng, lat, opening_times, reviews";

#[derive(Clone)]
pub struct PostgresLocationRepository {
    pool: PgPool,
}

impl PostgresLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl LocationRepository for PostgresLocationRepository {
    #[tracing::instrument(skip(self, location), fields(location_id = %location.id))]
    async fn create(&self, location: &Location) -> Result<(), RepositoryError> {
        tracing::debug!("creating location");

        sqlx::query(
            r#"
            INSERT INTO locations (id, name, address, rating, facilities, lng, lat, opening_times, reviews)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(location.id)
        .bind(&location.name)
        .bind(&location.address)
        .bind(location.rating)
        .bind(&location.facilities)
        .bind(location.coords.lng)
        .bind(location.coords.lat)
        .bind(Json(&location.opening_times))
        .bind(Json(&location.reviews))
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        tracing::debug!(location_id = %location.id, "location created successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(location_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, RepositoryError> {
        tracing::debug!("finding location by id");

        let query = format!("SELECT {} FROM locations WHERE id = $1", LOCATION_COLUMNS);
        let location = sqlx::query_as::<_, Location>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(location)
    }

    #[tracing::instrument(skip(self, location), fields(location_id = %location.id))]
    async fn update_details(&self, location: &Location) -> Result<(), RepositoryError> {
        tracing::debug!("updating location details");

        let result = sqlx::query(
            r#"
            UPDATE locations
            SET name = $2, address = $3, facilities = $4, lng = $5, lat = $6, opening_times = $7
            WHERE id = $1
            "#,
        )
        .bind(location.id)
        .bind(&location.name)
        .bind(&location.address)
        .bind(&location.facilities)
        .bind(location.coords.lng)
        .bind(location.coords.lat)
        .bind(Json(&location.opening_times))
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::debug!(location_id = %location.id, "location details updated");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(location_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        tracing::debug!("deleting location");

        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::debug!(location_id = %id, "location deleted successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self, reviews), fields(location_id = %id, review_count = reviews.len()))]
    async fn update_reviews(&self, id: Uuid, reviews: &[Review]) -> Result<(), RepositoryError> {
        tracing::debug!("saving location reviews");

        let result = sqlx::query("UPDATE locations SET reviews = $2 WHERE id = $1")
            .bind(id)
            .bind(Json(reviews))
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(location_id = %id))]
    async fn update_rating(&self, id: Uuid, rating: i16) -> Result<(), RepositoryError> {
        tracing::debug!("saving location rating");

        let result = sqlx::query("UPDATE locations SET rating = $2 WHERE id = $1")
            .bind(id)
            .bind(rating)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(lng = point.lng, lat = point.lat))]
    async fn find_nearby(
        &self,
        point: GeoPoint,
        max_distance_m: f64,
        limit: i64,
    ) -> Result<Vec<NearbyLocation>, RepositoryError> {
        tracing::debug!("finding nearby locations");

        // Haversine over the stored lng/lat pair; the LEAST guards asin
        // against rounding just above 1.
        let query = format!(
            r#"
            SELECT * FROM (
                SELECT {columns},
                       2 * $4 * ASIN(LEAST(1.0, SQRT(
                           POWER(SIN(RADIANS(lat - $2) / 2), 2)
                           + COS(RADIANS($2)) * COS(RADIANS(lat)) * POWER(SIN(RADIANS(lng - $1) / 2), 2)
                       ))) AS distance
                FROM locations
            ) AS nearby
            WHERE distance <= $3
            ORDER BY distance ASC
            LIMIT $5
            "#,
            columns = LOCATION_COLUMNS
        );

        let locations = sqlx::query_as::<_, NearbyLocation>(&query)
            .bind(point.lng)
            .bind(point.lat)
            .bind(max_distance_m)
            .bind(EARTH_RADIUS_M)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        tracing::debug!(count = locations.len(), "found nearby locations");
        Ok(locations)
    }
}

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        tracing::debug!("creating user");

        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    #[tracing::instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        tracing::debug!("finding user by email");

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(user)
    }
}

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
