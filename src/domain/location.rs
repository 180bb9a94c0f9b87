use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::review::Review;

/// Sphere radius used for distance calculations, in metres.
pub const EARTH_RADIUS_M: f64 = 6_378_100.0;

#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn is_valid(&self) -> bool {
        (-180.0..=180.0).contains(&self.lng) && (-90.0..=90.0).contains(&self.lat)
    }

    /// Great-circle (haversine) distance in metres.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lat = lat2 - lat1;
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningTime {
    pub days: String,
    pub opening: Option<String>,
    pub closing: Option<String>,
    #[serde(default)]
    pub closed: bool,
}

/// Client-editable part of a location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationDetails {
    pub name: String,
    pub address: Option<String>,
    pub facilities: Vec<String>,
    pub coords: GeoPoint,
    pub opening_times: Vec<OpeningTime>,
}

impl LocationDetails {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Location name is required".to_string());
        }
        if !self.coords.is_valid() {
            return Err(format!(
                "Coordinates out of range: lng={}, lat={}",
                self.coords.lng, self.coords.lat
            ));
        }
        if self.opening_times.iter().any(|t| t.days.trim().is_empty()) {
            return Err("Opening time days are required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub rating: i16,
    pub facilities: Vec<String>,
    #[sqlx(flatten)]
    pub coords: GeoPoint,
    #[sqlx(json)]
    pub opening_times: Vec<OpeningTime>,
    #[sqlx(json)]
    pub reviews: Vec<Review>,
}

impl Location {
    pub fn new(details: LocationDetails) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: details.name,
            address: details.address,
            rating: 0,
            facilities: details.facilities,
            coords: details.coords,
            opening_times: details.opening_times,
            reviews: Vec::new(),
        }
    }

    /// Replaces the client-editable fields; rating and reviews are untouched.
    pub fn update_details(&mut self, details: LocationDetails) {
        self.name = details.name;
        self.address = details.address;
        self.facilities = details.facilities;
        self.coords = details.coords;
        self.opening_times = details.opening_times;
    }

    pub fn find_review(&self, review_id: Uuid) -> Option<&Review> {
        self.reviews.iter().find(|r| r.id == review_id)
    }

    pub fn find_review_mut(&mut self, review_id: Uuid) -> Option<&mut Review> {
        self.reviews.iter_mut().find(|r| r.id == review_id)
    }

    pub fn remove_review(&mut self, review_id: Uuid) -> Option<Review> {
        let idx = self.reviews.iter().position(|r| r.id == review_id)?;
        Some(self.reviews.remove(idx))
    }
}

/// Location annotated with its distance from a query point, in metres.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct NearbyLocation {
    #[sqlx(flatten)]
    pub location: Location,
    pub distance: f64,
}
