//! Runtime configuration for the tracker, sampler and session.
//!
//! Every tunable the host might want to change lives here with a documented
//! default, instead of in shared constants.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::R_EARTH_MEAN;

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Reference body radius must be positive and finite, got {0} km")]
    BodyRadius(f64),

    #[error("Trajectory needs at least 2 points, got {0}")]
    TrajectoryPoints(usize),

    #[error("Tick rate must be positive and finite, got {0} Hz")]
    TickRate(f64),

    #[error("Fallback orbit latitude must lie in [-90, 90], got {0}°")]
    FallbackLatitude(f64),

    #[error("Fallback orbit altitude must be non-negative and finite, got {0} km")]
    FallbackAltitude(f64),

    #[error("Fallback orbit period must be positive and finite, got {0} s")]
    FallbackPeriod(f64),
}

/// Parameters of the synthetic circular orbit shown without real elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircularOrbitConfig {
    /// Fixed latitude of the ring (degrees).
    pub latitude_deg: f64,
    /// Fixed height above the surface (km).
    pub altitude_km: f64,
    /// Time for one full revolution (s).
    pub period_s: f64,
}

impl Default for CircularOrbitConfig {
    fn default() -> Self {
        CircularOrbitConfig {
            latitude_deg: 0.0,
            altitude_km: 420.0,
            period_s: 5568.0,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    /// Radius used to normalize altitude for rendering (km). Default 6371.
    pub body_radius_km: f64,
    /// Points per trajectory sample. Default 100.
    pub trajectory_points: usize,
    /// Animation tick rate (Hz). Default 60.
    pub tick_rate_hz: f64,
    /// Synthetic orbit used when no elements are available.
    pub fallback_orbit: CircularOrbitConfig,
}

impl Default for RadarConfig {
    fn default() -> Self {
        RadarConfig {
            body_radius_km: R_EARTH_MEAN,
            trajectory_points: 100,
            tick_rate_hz: 60.0,
            fallback_orbit: CircularOrbitConfig::default(),
        }
    }
}

impl RadarConfig {
    /// Override the number of points per trajectory.
    pub fn with_trajectory_points(mut self, points: usize) -> Self {
        self.trajectory_points = points;
        self
    }

    /// Override the animation tick rate.
    pub fn with_tick_rate(mut self, hz: f64) -> Self {
        self.tick_rate_hz = hz;
        self
    }

    /// Check every field; the first violation wins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.body_radius_km.is_finite() || self.body_radius_km <= 0.0 {
            return Err(ConfigError::BodyRadius(self.body_radius_km));
        }
        if self.trajectory_points < 2 {
            return Err(ConfigError::TrajectoryPoints(self.trajectory_points));
        }
        if !self.tick_rate_hz.is_finite() || self.tick_rate_hz <= 0.0 {
            return Err(ConfigError::TickRate(self.tick_rate_hz));
        }
        self.fallback_orbit.validate()
    }

    /// Interval between two animation ticks (s).
    pub fn tick_interval_s(&self) -> f64 {
        1.0 / self.tick_rate_hz
    }
}

impl CircularOrbitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-90.0..=90.0).contains(&self.latitude_deg) {
            return Err(ConfigError::FallbackLatitude(self.latitude_deg));
        }
        if !self.altitude_km.is_finite() || self.altitude_km < 0.0 {
            return Err(ConfigError::FallbackAltitude(self.altitude_km));
        }
        if !self.period_s.is_finite() || self.period_s <= 0.0 {
            return Err(ConfigError::FallbackPeriod(self.period_s));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let cfg = RadarConfig::default();
        assert_eq!(cfg.body_radius_km, 6371.0);
        assert_eq!(cfg.trajectory_points, 100);
        assert_eq!(cfg.tick_rate_hz, 60.0);
        assert_relative_eq!(cfg.tick_interval_s(), 1.0 / 60.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let cfg = RadarConfig::default().with_trajectory_points(1);
        assert_eq!(cfg.validate(), Err(ConfigError::TrajectoryPoints(1)));

        let cfg = RadarConfig::default().with_tick_rate(0.0);
        assert_eq!(cfg.validate(), Err(ConfigError::TickRate(0.0)));

        let cfg = RadarConfig {
            body_radius_km: -1.0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::BodyRadius(-1.0)));

        let mut cfg = RadarConfig::default();
        cfg.fallback_orbit.latitude_deg = 91.0;
        assert_eq!(cfg.validate(), Err(ConfigError::FallbackLatitude(91.0)));

        let mut cfg = RadarConfig::default();
        cfg.fallback_orbit.period_s = 0.0;
        assert_eq!(cfg.validate(), Err(ConfigError::FallbackPeriod(0.0)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: RadarConfig =
            serde_json::from_str(r#"{ "trajectory_points": 250, "fallback_orbit": { "altitude_km": 550.0 } }"#)
                .unwrap();
        assert_eq!(cfg.trajectory_points, 250);
        assert_eq!(cfg.tick_rate_hz, 60.0);
        assert_eq!(cfg.fallback_orbit.altitude_km, 550.0);
        assert_eq!(cfg.fallback_orbit.period_s, 5568.0);
        assert!(cfg.validate().is_ok());
    }
}
