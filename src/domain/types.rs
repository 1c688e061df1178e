//! Shared wire-level types.
//!
//! These are kept small and serde-friendly so they can be:
//!
//! - built by the workflow for each attempt
//! - serialized as the endpoint's JSON body
//! - deserialized from the endpoint and the IP lookup service

use serde::{Deserialize, Serialize};

use super::rating::Rating;

/// A device-reported position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build coordinates, rejecting values outside the WGS84 range.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lng_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);
        (lat_ok && lng_ok).then_some(Self {
            latitude,
            longitude,
        })
    }
}

/// The JSON body posted to the endpoint.
///
/// `lat`/`lng` are omitted entirely (not `null`) when no position was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubmissionPayload {
    pub rating: Rating,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl SubmissionPayload {
    pub fn rating_only(rating: Rating) -> Self {
        Self {
            rating,
            lat: None,
            lng: None,
        }
    }

    pub fn with_position(rating: Rating, position: Coordinates) -> Self {
        Self {
            rating,
            lat: Some(position.latitude),
            lng: Some(position.longitude),
        }
    }

    pub fn has_position(&self) -> bool {
        self.lat.is_some() && self.lng.is_some()
    }
}

/// What the endpoint answers. Anything beyond these two fields is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_with_position_matches_endpoint_shape() {
        let rating = Rating::new(7).unwrap();
        let pos = Coordinates::new(37.7749, -122.4194).unwrap();
        let json = serde_json::to_string(&SubmissionPayload::with_position(rating, pos)).unwrap();
        assert_eq!(json, r#"{"rating":7,"lat":37.7749,"lng":-122.4194}"#);
    }

    #[test]
    fn rating_only_payload_omits_coordinates() {
        let payload = SubmissionPayload::rating_only(Rating::new(4).unwrap());
        assert!(!payload.has_position());
        assert_eq!(serde_json::to_string(&payload).unwrap(), r#"{"rating":4}"#);
    }

    #[test]
    fn coordinates_reject_out_of_range() {
        assert!(Coordinates::new(90.0, 180.0).is_some());
        assert!(Coordinates::new(90.5, 0.0).is_none());
        assert!(Coordinates::new(0.0, -181.0).is_none());
        assert!(Coordinates::new(f64::NAN, 0.0).is_none());
    }

    #[test]
    fn reply_tolerates_missing_and_extra_fields() {
        let reply: RemoteReply = serde_json::from_str(r#"{"success":true,"row":12}"#).unwrap();
        assert!(reply.success);
        assert_eq!(reply.message, None);

        let reply: RemoteReply = serde_json::from_str(r#"{"message":"Server overloaded"}"#).unwrap();
        assert!(!reply.success);
        assert_eq!(reply.message.as_deref(), Some("Server overloaded"));
    }
}
