use geo_types::Coord;

use crate::data_types::point::TrackPoint;
use crate::data_types::route::{RouteBounds, RouteDuration, RouteSummary, TimeRange};
use crate::util::geo::GeoUtils;

/// Pure derivation of aggregate travel statistics from an ordered point
/// sequence. No state, no side effects: the same sequence always yields
/// the same summary.
pub struct RouteMetrics;

impl RouteMetrics {
    /// `None` for an empty sequence. A single point yields zero distance,
    /// zero duration and degenerate bounds.
    pub fn summarize(points: &[TrackPoint]) -> Option<RouteSummary> {
        let first = points.first()?;
        let last = points.last()?;

        // Sum unrounded, round the total once at the end.
        let total_km: f64 = points
            .windows(2)
            .map(|pair| {
                GeoUtils::haversine_km(
                    Coord::from((pair[0].lat, pair[0].lng)),
                    Coord::from((pair[1].lat, pair[1].lng)),
                )
            })
            .sum();

        let coords: Vec<Coord> = points
            .iter()
            .map(|p| Coord::from((p.lat, p.lng)))
            .collect();
        let (sw, ne) = GeoUtils::bounding_box(&coords);

        Some(RouteSummary {
            total_points: points.len(),
            total_distance: GeoUtils::round2(total_km),
            duration: Self::duration(first, last),
            time_range: TimeRange {
                start: first.timestamp,
                end: last.timestamp,
            },
            bounds: RouteBounds {
                north: ne.x,
                south: sw.x,
                east: ne.y,
                west: sw.y,
            },
        })
    }

    // One formula for both entity kinds: delta-ms / 1000 / 60, rounded
    // to the nearest minute; hours follow from the rounded minutes.
    fn duration(first: &TrackPoint, last: &TrackPoint) -> RouteDuration {
        let delta_ms = (last.timestamp - first.timestamp).num_milliseconds();
        let minutes = (delta_ms as f64 / 1000.0 / 60.0).round() as i64;

        RouteDuration {
            minutes,
            hours: GeoUtils::round2(minutes as f64 / 60.0),
        }
    }
}
