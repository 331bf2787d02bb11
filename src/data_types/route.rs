use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

/// Aggregate travel statistics derived from one ordered point sequence.
/// Recomputed per request, never persisted.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub total_points: usize,
    /// Kilometers, rounded to 2 decimals after summing.
    pub total_distance: f64,
    pub duration: RouteDuration,
    pub time_range: TimeRange,
    pub bounds: RouteBounds,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RouteDuration {
    pub minutes: i64,
    pub hours: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RouteBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}
