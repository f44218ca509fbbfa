//! Great-circle math for the navigation engine. Pure functions, no state.

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Forward azimuth from point 1 to point 2 on a sphere, degrees in [0,360),
/// 0 = north.
///
/// Coincident points have no defined azimuth (`atan2(0,0)` is
/// platform-defined); by contract this returns 0.0 for them.
pub fn bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if lat1 == lat2 && lon1 == lon2 {
        return 0.0;
    }
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let y = dlon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlon.cos();
    let mut b = y.atan2(x).to_degrees();
    if b < 0.0 {
        b += 360.0;
    }
    b
}

/// Haversine great-circle distance in meters, R = 6,371,000 m.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Wrap an angle into (-180,180]. Closed form, O(1) for any finite input.
pub fn wrap_relative_deg(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    if a > 180.0 {
        a - 360.0
    } else {
        a
    }
}
