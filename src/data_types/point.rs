use chrono::{DateTime, TimeZone, Utc};
use mongodb::bson::{Bson, Document};
use serde_derive::{Deserialize, Serialize};

use crate::data_types::common::EntityKind;
use crate::errors::ApiError;

/// One timestamped observation for a tracked entity. Only ever built
/// from a store row; never mutated afterwards.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TrackPoint {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub timestamp: DateTime<Utc>,
}

impl TrackPoint {
    /// Maps a raw store row to a point. Rows are duck-typed on the store
    /// side, so every expected field is checked here and a missing or
    /// mistyped one is a hard internal error, never a partial point.
    pub fn from_document(kind: EntityKind, doc: &Document) -> Result<TrackPoint, ApiError> {
        let id_field = kind.id_field();

        let id = match doc.get(id_field) {
            Some(Bson::String(s)) => s.clone(),
            other => {
                return Err(ApiError::Internal(format!(
                    "row field '{}' missing or not a string (got {:?})",
                    id_field, other
                )))
            }
        };

        Ok(TrackPoint {
            id,
            lat: Self::coerce_f64(doc, "lat")?,
            lng: Self::coerce_f64(doc, "lng")?,
            timestamp: Self::unwrap_timestamp(doc)?,
        })
    }

    // The store reports numerics as whichever BSON type the writer used.
    fn coerce_f64(doc: &Document, field: &str) -> Result<f64, ApiError> {
        match doc.get(field) {
            Some(Bson::Double(v)) => Ok(*v),
            Some(Bson::Int32(v)) => Ok(*v as f64),
            Some(Bson::Int64(v)) => Ok(*v as f64),
            other => Err(ApiError::Internal(format!(
                "row field '{}' missing or not numeric (got {:?})",
                field, other
            ))),
        }
    }

    fn unwrap_timestamp(doc: &Document) -> Result<DateTime<Utc>, ApiError> {
        match doc.get("timestamp") {
            Some(Bson::DateTime(dt)) => match Utc.timestamp_millis_opt(dt.timestamp_millis()) {
                chrono::LocalResult::Single(ts) => Ok(ts),
                _ => Err(ApiError::Internal(format!(
                    "row timestamp out of range: {} ms",
                    dt.timestamp_millis()
                ))),
            },
            other => Err(ApiError::Internal(format!(
                "row field 'timestamp' missing or not a datetime (got {:?})",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn bson_ts(millis: i64) -> Bson {
        Bson::DateTime(mongodb::bson::DateTime::from_millis(millis))
    }

    #[test]
    fn maps_gps_row() {
        let doc = doc! {
            "device_id": "dev-01",
            "lat": -12.0464,
            "lng": -77.0428,
            "timestamp": bson_ts(1_700_000_000_500),
        };

        let point = TrackPoint::from_document(EntityKind::Gps, &doc).unwrap();
        assert_eq!(point.id, "dev-01");
        assert_eq!(point.lat, -12.0464);
        assert_eq!(point.lng, -77.0428);
        assert_eq!(point.timestamp.timestamp_millis(), 1_700_000_000_500);
    }

    #[test]
    fn maps_mobile_row_with_integer_coordinates() {
        let doc = doc! {
            "user_id": "user.7",
            "lat": 4_i32,
            "lng": -77_i64,
            "timestamp": bson_ts(1_700_000_000_000),
        };

        let point = TrackPoint::from_document(EntityKind::Mobile, &doc).unwrap();
        assert_eq!(point.lat, 4.0);
        assert_eq!(point.lng, -77.0);
    }

    #[test]
    fn missing_field_is_an_internal_error() {
        let doc = doc! {
            "device_id": "dev-01",
            "lat": 1.0,
            "timestamp": bson_ts(0),
        };

        let err = TrackPoint::from_document(EntityKind::Gps, &doc).unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
        assert!(err.to_string().contains("lng"));
    }

    #[test]
    fn wrong_id_field_for_kind_is_an_internal_error() {
        let doc = doc! {
            "device_id": "dev-01",
            "lat": 1.0,
            "lng": 2.0,
            "timestamp": bson_ts(0),
        };

        let err = TrackPoint::from_document(EntityKind::Mobile, &doc).unwrap_err();
        assert!(err.to_string().contains("user_id"));
    }

    #[test]
    fn non_datetime_timestamp_is_rejected() {
        let doc = doc! {
            "device_id": "dev-01",
            "lat": 1.0,
            "lng": 2.0,
            "timestamp": "2023-11-14T22:13:20Z",
        };

        let err = TrackPoint::from_document(EntityKind::Gps, &doc).unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn serializes_timestamp_as_rfc3339() {
        let point = TrackPoint {
            id: "dev-01".to_string(),
            lat: 0.5,
            lng: 1.5,
            timestamp: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        };

        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["timestamp"], "2023-11-14T22:13:20Z");
    }
}
