//! Synthetic circular orbit.
//!
//! Stands in for the real satellite when no element data could be loaded:
//! a ring at fixed latitude and altitude, swept eastward at constant rate.
//! It has no propagation model and therefore never fails.
use hifitime::Epoch;
use serde::{Deserialize, Serialize};

use crate::config::{CircularOrbitConfig, ConfigError};
use crate::elements::OrbitalPeriod;
use crate::geodetic::{wrap_longitude_deg, GeodeticPosition};
use crate::propagator::{PositionSource, PropagationError};

/// Circular ground-track orbit keyed to an explicit reference epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircularOrbit {
    latitude_deg: f64,
    altitude_km: f64,
    period: OrbitalPeriod,
    /// Instant at which the satellite crosses longitude 0.
    reference: Epoch,
}

impl CircularOrbit {
    pub fn new(config: &CircularOrbitConfig, reference: Epoch) -> Result<Self, ConfigError> {
        config.validate()?;
        let period =
            OrbitalPeriod::from_seconds(config.period_s).ok_or(ConfigError::FallbackPeriod(config.period_s))?;
        Ok(CircularOrbit {
            latitude_deg: config.latitude_deg,
            altitude_km: config.altitude_km,
            period,
            reference,
        })
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }

    pub fn altitude_km(&self) -> f64 {
        self.altitude_km
    }

    pub fn reference(&self) -> Epoch {
        self.reference
    }

    pub fn orbital_period(&self) -> OrbitalPeriod {
        self.period
    }

    /// Position at `instant`; longitude advances 360° per period.
    pub fn position(&self, instant: Epoch) -> GeodeticPosition {
        let elapsed = (instant - self.reference).to_seconds();
        let turns = elapsed / self.period.seconds();
        GeodeticPosition {
            latitude_deg: self.latitude_deg,
            longitude_deg: wrap_longitude_deg(turns.fract() * 360.0),
            height_km: self.altitude_km,
        }
    }

    /// `count` points with longitudes evenly spaced over [0°, 360°], both ends
    /// included, at the orbit's latitude and altitude.
    ///
    /// Longitudes are left unwrapped so the ring closes on itself.
    pub fn ring(&self, count: usize) -> Vec<GeodeticPosition> {
        let step = if count > 1 { 360.0 / (count - 1) as f64 } else { 0.0 };
        (0..count)
            .map(|i| GeodeticPosition {
                latitude_deg: self.latitude_deg,
                longitude_deg: i as f64 * step,
                height_km: self.altitude_km,
            })
            .collect()
    }
}

impl PositionSource for CircularOrbit {
    fn period(&self) -> Option<OrbitalPeriod> {
        Some(self.period)
    }

    fn position_at(&self, instant: Epoch) -> Result<Option<GeodeticPosition>, PropagationError> {
        Ok(Some(self.position(instant)))
    }
}
