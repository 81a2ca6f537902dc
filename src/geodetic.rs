//! Geodetic positions and inertial → Earth-fixed conversion.
//!
//! SGP4 produces positions in the TEME inertial frame. Rotating by Greenwich
//! Mean Sidereal Time gives Earth-fixed coordinates, which are then converted
//! to latitude, longitude and height on the WGS-84 ellipsoid.

use hifitime::Epoch;
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Geographic position of a satellite or ground point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPosition {
    /// Geodetic latitude (degrees), in [-90, 90]
    pub latitude_deg: f64,
    /// Longitude (degrees), in [-180, 180]
    pub longitude_deg: f64,
    /// Height above the reference ellipsoid (km)
    pub height_km: f64,
}

impl GeodeticPosition {
    pub fn new(latitude_deg: f64, longitude_deg: f64, height_km: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            height_km,
        }
    }

    /// Height as a fraction of `body_radius_km`, the form globe renderers expect.
    pub fn normalized_altitude(&self, body_radius_km: f64) -> f64 {
        self.height_km / body_radius_km
    }

    /// Great-circle angle to another position (degrees), ignoring height.
    pub fn angular_distance_deg(&self, other: &GeodeticPosition) -> f64 {
        let (lat1, lat2) = (self.latitude_deg * DEG2RAD, other.latitude_deg * DEG2RAD);
        let dlat = lat2 - lat1;
        let dlon = (other.longitude_deg - self.longitude_deg) * DEG2RAD;
        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * h.sqrt().min(1.0).asin() * RAD2DEG
    }
}

impl std::fmt::Display for GeodeticPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.4}°, {:.4}°, {:.1} km",
            self.latitude_deg, self.longitude_deg, self.height_km
        )
    }
}

/// Greenwich Mean Sidereal Time (rad, in [0, 2π)) at `instant`.
///
/// IAU-82 polynomial evaluated on the UTC Julian date (UT1 ≈ UTC).
pub fn gmst(instant: Epoch) -> f64 {
    gmst_from_jd(instant.to_jde_utc_days())
}

/// GMST (rad) from a UT1 Julian date.
pub fn gmst_from_jd(jd_ut1: f64) -> f64 {
    let t = (jd_ut1 - JD_J2000) / JULIAN_CENTURY;
    // Seconds of sidereal time
    let seconds = -6.2e-6 * t.powi(3)
        + 0.093104 * t.powi(2)
        + (876600.0 * 3600.0 + 8640184.812866) * t
        + 67310.54841;
    // 240 sidereal seconds per degree
    normalize_angle(seconds * DEG2RAD / 240.0)
}

/// Rotate a TEME position (km) into the Earth-fixed frame.
pub fn teme_to_ecef(r: [f64; 3], gmst_rad: f64) -> [f64; 3] {
    let (sin_g, cos_g) = gmst_rad.sin_cos();
    [
        cos_g * r[0] + sin_g * r[1],
        -sin_g * r[0] + cos_g * r[1],
        r[2],
    ]
}

/// Convert an Earth-fixed position (km) to WGS-84 geodetic coordinates.
///
/// Fixed-point iteration on latitude; converges to well under a meter for
/// orbital altitudes within a handful of passes.
pub fn ecef_to_geodetic(r: [f64; 3]) -> GeodeticPosition {
    let e2 = FLATTENING * (2.0 - FLATTENING);
    let p = (r[0].powi(2) + r[1].powi(2)).sqrt();
    let longitude = r[1].atan2(r[0]);

    let mut latitude = r[2].atan2(p * (1.0 - e2));
    let mut c = 1.0;
    for _ in 0..20 {
        let sin_lat = latitude.sin();
        c = 1.0 / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let next = (r[2] + R_EARTH * c * e2 * sin_lat).atan2(p);
        let delta = (next - latitude).abs();
        latitude = next;
        if delta < 1e-12 {
            break;
        }
    }

    let height = if latitude.cos().abs() > 1e-10 {
        p / latitude.cos() - R_EARTH * c
    } else {
        // At the poles use the polar radius directly
        r[2].abs() - R_EARTH_POLAR
    };

    GeodeticPosition {
        latitude_deg: latitude * RAD2DEG,
        longitude_deg: wrap_longitude_deg(longitude * RAD2DEG),
        height_km: height,
    }
}

/// Convert a TEME position (km) at `instant` to geodetic coordinates.
pub fn teme_to_geodetic(r: [f64; 3], instant: Epoch) -> GeodeticPosition {
    ecef_to_geodetic(teme_to_ecef(r, gmst(instant)))
}

/// Normalize angle to [0, 2π).
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle % TAU;
    if a < 0.0 { a + TAU } else { a }
}

/// Wrap a longitude into [-180, 180].
pub fn wrap_longitude_deg(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // Keep +180 rather than folding it onto -180
    if wrapped == -180.0 && lon > 0.0 { 180.0 } else { wrapped }
}
