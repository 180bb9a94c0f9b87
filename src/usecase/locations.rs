use uuid::Uuid;

use crate::domain::location::{GeoPoint, Location, LocationDetails, NearbyLocation};
use crate::usecase::contracts::LocationRepository;
use crate::usecase::error::UsecaseError;

pub const NEARBY_LIMIT: usize = 10;

pub struct LocationsUseCase<L>
where
    L: LocationRepository,
{
    location_repository: L,
    default_max_distance_m: f64,
}

impl<L> LocationsUseCase<L>
where
    L: LocationRepository,
{
    pub fn new(location_repository: L, default_max_distance_m: f64) -> Self {
        Self {
            location_repository,
            default_max_distance_m,
        }
    }

    /// Nearest locations first, at most [`NEARBY_LIMIT`], none farther than
    /// `max_distance_m` (the configured default when absent).
    #[tracing::instrument(skip(self), fields(lng = point.lng, lat = point.lat, ?max_distance_m))]
    pub async fn find_nearby(
        &self,
        point: GeoPoint,
        max_distance_m: Option<f64>,
    ) -> Result<Vec<NearbyLocation>, UsecaseError> {
        tracing::debug!("finding nearby locations");

        if !point.is_valid() {
            return Err(UsecaseError::InvalidArgument(format!(
                "lng must be within [-180, 180] and lat within [-90, 90], got lng={}, lat={}",
                point.lng, point.lat
            )));
        }
        let max_distance_m = max_distance_m.unwrap_or(self.default_max_distance_m);
        if !max_distance_m.is_finite() || max_distance_m < 0.0 {
            return Err(UsecaseError::InvalidArgument(
                "maxDistance must be a non-negative number".to_string(),
            ));
        }

        let mut locations = self
            .location_repository
            .find_nearby(point, max_distance_m, NEARBY_LIMIT as i64)
            .await?;

        // The store already filters and orders; distances are recomputed here
        // so the reported value and the cutoff agree regardless of rounding.
        for nearby in &mut locations {
            nearby.distance = point.distance_to(&nearby.location.coords);
        }
        locations.retain(|l| l.distance <= max_distance_m);
        locations.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        locations.truncate(NEARBY_LIMIT);

        metrics::counter!("geo_queries_total").increment(1);
        tracing::debug!(count = locations.len(), "nearby locations found");
        Ok(locations)
    }

    #[tracing::instrument(skip(self, details), fields(name = %details.name))]
    pub async fn create_location(&self, details: LocationDetails) -> Result<Location, UsecaseError> {
        tracing::debug!("creating location");

        details.validate().map_err(UsecaseError::Validation)?;

        let location = Location::new(details);
        self.location_repository.create(&location).await?;

        tracing::info!(location_id = %location.id, "location created successfully");
        Ok(location)
    }

    #[tracing::instrument(skip(self), fields(location_id = %id))]
    pub async fn get_location(&self, id: Uuid) -> Result<Location, UsecaseError> {
        tracing::debug!("getting location");

        self.location_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Location".to_string()))
    }

    #[tracing::instrument(skip(self, details), fields(location_id = %id))]
    pub async fn update_location(
        &self,
        id: Uuid,
        details: LocationDetails,
    ) -> Result<Location, UsecaseError> {
        tracing::debug!("updating location");

        details.validate().map_err(UsecaseError::Validation)?;

        let mut location = self.get_location(id).await?;
        location.update_details(details);
        self.location_repository
            .update_details(&location)
            .await
            .map_err(|e| match UsecaseError::from(e) {
                UsecaseError::NotFound(_) => UsecaseError::NotFound("Location".to_string()),
                other => other,
            })?;

        tracing::info!(location_id = %id, "location updated successfully");
        Ok(location)
    }

    #[tracing::instrument(skip(self), fields(location_id = %id))]
    pub async fn delete_location(&self, id: Uuid) -> Result<(), UsecaseError> {
        tracing::debug!("deleting location");

        self.location_repository
            .delete(id)
            .await
            .map_err(|e| match UsecaseError::from(e) {
                UsecaseError::NotFound(_) => UsecaseError::NotFound("Location".to_string()),
                other => other,
            })?;

        tracing::info!(location_id = %id, "location deleted successfully");
        Ok(())
    }
}
