use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::reviews::ReviewResponse;
use super::{parse_id, validation_error, JsonBody};
use crate::domain::location::{GeoPoint, Location, LocationDetails, NearbyLocation, OpeningTime};
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationResponse {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub rating: i16,
    pub facilities: Vec<String>,
    pub coords: PointResponse,
    pub opening_times: Vec<OpeningTime>,
    pub reviews: Vec<ReviewResponse>,
}

impl From<Location> for LocationResponse {
    fn from(l: Location) -> Self {
        Self {
            id: l.id,
            name: l.name,
            address: l.address,
            rating: l.rating,
            facilities: l.facilities,
            coords: l.coords.into(),
            opening_times: l.opening_times,
            reviews: l.reviews.into_iter().map(ReviewResponse::from).collect(),
        }
    }
}

/// GeoJSON point, `coordinates` in `[lng, lat]` order.
#[derive(Debug, Serialize)]
pub struct PointResponse {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub coordinates: [f64; 2],
}

impl From<GeoPoint> for PointResponse {
    fn from(p: GeoPoint) -> Self {
        Self {
            kind: "Point",
            coordinates: [p.lng, p.lat],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NearbyLocationResponse {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub rating: i16,
    pub facilities: Vec<String>,
    pub distance: f64,
}

impl From<NearbyLocation> for NearbyLocationResponse {
    fn from(n: NearbyLocation) -> Self {
        Self {
            id: n.location.id,
            name: n.location.name,
            address: n.location.address,
            rating: n.location.rating,
            facilities: n.location.facilities,
            distance: n.distance,
        }
    }
}

/// Raw strings so that unparseable numbers become our own 400 instead of
/// the extractor's rejection.
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lng: Option<String>,
    pub lat: Option<String>,
    #[serde(rename = "maxDistance")]
    pub max_distance: Option<String>,
}

impl NearbyQuery {
    pub fn parse(&self) -> Result<(GeoPoint, Option<f64>), UsecaseError> {
        let lng = parse_number("lng", self.lng.as_deref())?
            .ok_or_else(|| missing_coords())?;
        let lat = parse_number("lat", self.lat.as_deref())?
            .ok_or_else(|| missing_coords())?;
        let max_distance = parse_number("maxDistance", self.max_distance.as_deref())?;

        Ok((GeoPoint::new(lng, lat), max_distance))
    }
}

fn missing_coords() -> UsecaseError {
    UsecaseError::InvalidArgument("lng and lat query parameters are required".to_string())
}

fn parse_number(name: &str, raw: Option<&str>) -> Result<Option<f64>, UsecaseError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| UsecaseError::InvalidArgument(format!("{} must be a number", name))),
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LocationRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub address: Option<String>,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[validate(required, range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,
    #[validate(required, range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[serde(default)]
    pub opening_times: Vec<OpeningTime>,
}

impl LocationRequest {
    fn into_details(self) -> LocationDetails {
        LocationDetails {
            name: self.name,
            address: self.address.filter(|a| !a.trim().is_empty()),
            facilities: self
                .facilities
                .into_iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect(),
            coords: GeoPoint::new(self.lng.unwrap_or_default(), self.lat.unwrap_or_default()),
            opening_times: self.opening_times,
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn list_locations_by_distance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NearbyQuery>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling nearby locations request");

    let (point, max_distance) = query.parse()?;
    let locations = state
        .locations_usecase
        .find_nearby(point, max_distance)
        .await?;

    let response: Vec<NearbyLocationResponse> = locations
        .into_iter()
        .map(NearbyLocationResponse::from)
        .collect();

    tracing::debug!(count = response.len(), "nearby locations listed");
    Ok((StatusCode::OK, Json(response)))
}

#[tracing::instrument(skip(state, payload))]
pub async fn create_location(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): JsonBody<LocationRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling create location request");

    payload.validate().map_err(validation_error)?;

    let location = state
        .locations_usecase
        .create_location(payload.into_details())
        .await?;

    Ok((StatusCode::CREATED, Json(LocationResponse::from(location))))
}

#[tracing::instrument(skip(state), fields(%location_id))]
pub async fn get_location(
    State(state): State<Arc<AppState>>,
    Path(location_id): Path<String>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling get location request");

    let location_id = parse_id(&location_id, "Location")?;
    let location = state.locations_usecase.get_location(location_id).await?;

    Ok((StatusCode::OK, Json(LocationResponse::from(location))))
}

#[tracing::instrument(skip(state, payload), fields(%location_id))]
pub async fn update_location(
    State(state): State<Arc<AppState>>,
    Path(location_id): Path<String>,
    WithRejection(Json(payload), _): JsonBody<LocationRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling update location request");

    let location_id = parse_id(&location_id, "Location")?;
    payload.validate().map_err(validation_error)?;

    let location = state
        .locations_usecase
        .update_location(location_id, payload.into_details())
        .await?;

    Ok((StatusCode::OK, Json(LocationResponse::from(location))))
}

#[tracing::instrument(skip(state), fields(%location_id))]
pub async fn delete_location(
    State(state): State<Arc<AppState>>,
    Path(location_id): Path<String>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling delete location request");

    let location_id = parse_id(&location_id, "Location")?;
    state.locations_usecase.delete_location(location_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(lng: Option<&str>, lat: Option<&str>, max: Option<&str>) -> NearbyQuery {
        NearbyQuery {
            lng: lng.map(String::from),
            lat: lat.map(String::from),
            max_distance: max.map(String::from),
        }
    }

    #[test]
    fn test_nearby_query_parse() {
        let (point, max) = query(Some("-0.1"), Some("51.5"), Some("1000")).parse().unwrap();

        assert_eq!(point, GeoPoint::new(-0.1, 51.5));
        assert_eq!(max, Some(1000.0));
    }

    #[test]
    fn test_nearby_query_max_distance_optional() {
        let (_, max) = query(Some("-0.1"), Some("51.5"), None).parse().unwrap();
        assert_eq!(max, None);
    }

    #[test]
    fn test_nearby_query_requires_coordinates() {
        let result = query(None, Some("51.5"), None).parse();
        assert!(matches!(result, Err(UsecaseError::InvalidArgument(_))));

        let result = query(Some("-0.1"), Some(""), None).parse();
        assert!(matches!(result, Err(UsecaseError::InvalidArgument(_))));
    }

    #[test]
    fn test_nearby_query_rejects_non_numbers() {
        let result = query(Some("west"), Some("51.5"), None).parse();
        assert!(matches!(result, Err(UsecaseError::InvalidArgument(ref m)) if m.contains("lng")));

        let result = query(Some("-0.1"), Some("51.5"), Some("far")).parse();
        assert!(matches!(result, Err(UsecaseError::InvalidArgument(ref m)) if m.contains("maxDistance")));

        let result = query(Some("NaN"), Some("51.5"), None).parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_nearby_query_deserializes_camel_case_param() {
        let q: NearbyQuery = serde_json::from_str(r#"{"lng":"1","lat":"2","maxDistance":"300"}"#).unwrap();
        assert_eq!(q.max_distance.as_deref(), Some("300"));
    }

    #[test]
    fn test_location_request_validation() {
        let request: LocationRequest = serde_json::from_str(
            r#"{
                "name": "Starcups",
                "address": "125 High Street, Reading",
                "facilities": ["Hot drinks", " ", "Wifi"],
                "lng": -0.9690884,
                "lat": 51.455041,
                "openingTimes": [{"days": "Monday - Friday", "opening": "7:00am", "closing": "7:00pm", "closed": false}]
            }"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());

        let details = request.into_details();
        assert_eq!(details.facilities, vec!["Hot drinks", "Wifi"]);
        assert_eq!(details.opening_times.len(), 1);

        let request: LocationRequest =
            serde_json::from_str(r#"{"name": "Nowhere", "lng": 0.0}"#).unwrap();
        assert!(request.validate().is_err());

        let request: LocationRequest =
            serde_json::from_str(r#"{"name": "", "lng": 0.0, "lat": 0.0}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_location_response_coords_are_geojson() {
        let location = Location::new(LocationDetails {
            name: "Starcups".to_string(),
            address: None,
            facilities: vec![],
            coords: GeoPoint::new(-0.9690884, 51.455041),
            opening_times: vec![],
        });

        let json = serde_json::to_value(LocationResponse::from(location)).unwrap();

        assert_eq!(
            json["coords"],
            serde_json::json!({"type": "Point", "coordinates": [-0.9690884, 51.455041]})
        );
        assert_eq!(json["openingTimes"], serde_json::json!([]));
    }

    #[test]
    fn test_nearby_response_shape() {
        let location = Location::new(LocationDetails {
            name: "Starcups".to_string(),
            address: None,
            facilities: vec!["Wifi".to_string()],
            coords: GeoPoint::new(-0.1, 51.5),
            opening_times: vec![],
        });
        let response = NearbyLocationResponse::from(NearbyLocation {
            location,
            distance: 42.5,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["name"], "Starcups");
        assert_eq!(json["distance"], 42.5);
        assert_eq!(json["rating"], 0);
    }
}
