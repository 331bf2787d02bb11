use geo_types::Coord;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Coordinate convention throughout: `Coord.x` is latitude, `Coord.y`
/// is longitude, both in degrees.
pub struct GeoUtils;

impl GeoUtils {
    /// Great-circle distance in kilometers (haversine).
    pub fn haversine_km(p1: Coord, p2: Coord) -> f64 {
        let d_lat = (p2.x - p1.x).to_radians();
        let d_lng = (p2.y - p1.y).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + p1.x.to_radians().cos() * p2.x.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Min/max corners of the sequence: (south-west, north-east).
    /// Callers guarantee a non-empty slice.
    pub fn bounding_box(coords: &[Coord]) -> (Coord, Coord) {
        let mut min_lat = f64::MAX;
        let mut min_lng = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut max_lng = f64::MIN;

        for coord in coords {
            min_lat = coord.x.min(min_lat);
            min_lng = coord.y.min(min_lng);

            max_lat = coord.x.max(max_lat);
            max_lng = coord.y.max(max_lng);
        }

        (
            Coord::from((min_lat, min_lng)),
            Coord::from((max_lat, max_lng)),
        )
    }

    pub fn round2(value: f64) -> f64 {
        (value * 100.0).round() / 100.0
    }
}
