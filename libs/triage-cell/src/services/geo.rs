//! Great-circle distance between two points on the Earth's surface.

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two points given in decimal
/// degrees.
///
/// Precondition: latitudes in [-90, 90] and longitudes in [-180, 180].
/// Out-of-range or non-finite inputs are not checked here; callers
/// normalize invalid coordinates to "absent" before ranking.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}
