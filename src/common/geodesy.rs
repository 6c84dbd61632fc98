//! Spherical-earth geodetic helpers.
//!
//! All functions operate on `f64` degrees and nautical miles and assume the
//! caller has already guarded against missing values.

/// Mean earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;
/// Kilometers to nautical miles.
const KM_TO_NM: f64 = 0.539957;
/// Nautical miles to kilometers.
const NM_TO_KM: f64 = 1.852;

/// Computes the great circle distance between two coordinates via the
/// haversine formula.
///
/// # Arguments
/// * `lat1`, `lon1` - The first coordinate in degrees.
/// * `lat2`, `lon2` - The second coordinate in degrees.
///
/// # Returns
/// The distance in nautical miles.
pub fn distance_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c * KM_TO_NM
}

/// Computes the initial bearing from the first coordinate to the second.
///
/// # Returns
/// The bearing in degrees, [0, 360).
pub fn bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let y = d_lon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lon.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Projects a coordinate along a bearing for a given distance.
///
/// # Arguments
/// * `lat`, `lon` - The starting coordinate in degrees.
/// * `bearing` - The course in degrees true.
/// * `dist_nm` - The distance to travel in nautical miles.
///
/// # Returns
/// The destination coordinate as `(lat, lon)` in degrees.
pub fn destination_point(lat: f64, lon: f64, bearing: f64, dist_nm: f64) -> (f64, f64) {
    let ang = dist_nm * NM_TO_KM / EARTH_RADIUS_KM;
    let theta = bearing.to_radians();
    let phi1 = lat.to_radians();
    let lam1 = lon.to_radians();
    let phi2 = (phi1.sin() * ang.cos() + phi1.cos() * ang.sin() * theta.cos()).asin();
    let lam2 = lam1
        + (theta.sin() * ang.sin() * phi1.cos()).atan2(ang.cos() - phi1.sin() * phi2.sin());
    (phi2.to_degrees(), lam2.to_degrees())
}

/// Computes the signed cross track distance of a point from the great
/// circle through `a` and `b`.
///
/// Positive values lie right of the course line from `a` to `b`.
///
/// # Returns
/// The cross track distance in nautical miles.
pub fn cross_track_nm(
    lat: f64,
    lon: f64,
    a_lat: f64,
    a_lon: f64,
    b_lat: f64,
    b_lon: f64,
) -> f64 {
    let radius_nm = EARTH_RADIUS_KM * KM_TO_NM;
    let d13 = distance_nm(a_lat, a_lon, lat, lon) / radius_nm;
    let b13 = bearing_deg(a_lat, a_lon, lat, lon).to_radians();
    let b12 = bearing_deg(a_lat, a_lon, b_lat, b_lon).to_radians();
    (d13.sin() * (b13 - b12).sin()).asin() * radius_nm
}

/// Folds an angle difference into (-180, 180] degrees.
pub fn normalize_angle(mut deg: f64) -> f64 {
    while deg > 180.0 {
        deg -= 360.0;
    }
    while deg <= -180.0 {
        deg += 360.0;
    }
    deg
}
