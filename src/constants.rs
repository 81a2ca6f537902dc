//! Physical and astrodynamic constants.

/// Earth gravitational parameter (km³/s²), WGS-72 as used by SGP4
pub const MU_EARTH: f64 = 398600.8;

/// Earth equatorial radius (km), WGS-84
pub const R_EARTH: f64 = 6378.137;

/// Earth polar radius (km), WGS-84
pub const R_EARTH_POLAR: f64 = 6356.7523142;

/// Earth flattening, WGS-84
pub const FLATTENING: f64 = (R_EARTH - R_EARTH_POLAR) / R_EARTH;

/// Mean Earth radius (km), the default reference body radius for rendering
pub const R_EARTH_MEAN: f64 = 6371.0;

/// Seconds per solar day
pub const SOLAR_DAY: f64 = 86400.0;

/// Minutes per solar day
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Julian date of the J2000 epoch (2000-01-01 12:00)
pub const JD_J2000: f64 = 2451545.0;

/// Days per Julian century
pub const JULIAN_CENTURY: f64 = 36525.0;

/// Two pi
pub const TAU: f64 = std::f64::consts::TAU;

/// Degrees to radians
pub const DEG2RAD: f64 = std::f64::consts::PI / 180.0;

/// Radians to degrees
pub const RAD2DEG: f64 = 180.0 / std::f64::consts::PI;
