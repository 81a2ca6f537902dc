//! Orbital element sets ready for propagation.
//!
//! An [`OrbitalElementSet`] bundles a validated [`Tle`] with the SGP4 model
//! constants initialized from it, the TLE epoch and the derived orbital period.
//! It is immutable: new element data produces a new set.

use hifitime::{Duration, Epoch, Unit};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::tle::{Tle, TleError};

/// Orbital period, in seconds. Always strictly positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct OrbitalPeriod(f64);

impl OrbitalPeriod {
    /// Period from a mean motion in revolutions per day.
    pub fn from_revs_per_day(revs_per_day: f64) -> Result<Self, TleError> {
        if !revs_per_day.is_finite() || revs_per_day <= 0.0 {
            return Err(TleError::InvalidMeanMotion(revs_per_day));
        }
        Self::from_mean_motion(revs_per_day * TAU / SOLAR_DAY)
            .ok_or(TleError::InvalidMeanMotion(revs_per_day))
    }

    /// Period from a mean motion in rad/s: `2π / n`.
    ///
    /// Returns `None` unless the result is strictly positive and finite.
    pub fn from_mean_motion(rad_per_s: f64) -> Option<Self> {
        Self::from_seconds(TAU / rad_per_s)
    }

    /// Wrap a period given in seconds.
    pub fn from_seconds(seconds: f64) -> Option<Self> {
        (seconds.is_finite() && seconds > 0.0).then_some(Self(seconds))
    }

    /// Period in seconds.
    pub fn seconds(&self) -> f64 {
        self.0
    }

    /// Period as a hifitime duration.
    pub fn duration(&self) -> Duration {
        Unit::Second * self.0
    }
}

impl std::fmt::Display for OrbitalPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} s ({:.2} min)", self.0, self.0 / 60.0)
    }
}

/// A satellite's element set with initialized SGP4 model.
#[derive(Debug, Clone)]
pub struct OrbitalElementSet {
    tle: Tle,
    epoch: Epoch,
    period: OrbitalPeriod,
    model: sgp4::Constants,
}

impl OrbitalElementSet {
    /// Parse and validate two TLE lines, then initialize the SGP4 model.
    pub fn from_lines(line1: &str, line2: &str) -> Result<Self, TleError> {
        let tle = Tle::parse(line1, line2)?;
        Self::initialize(tle, line1, line2)
    }

    /// Same as [`Self::from_lines`] with a satellite name line.
    pub fn from_3line(line0: &str, line1: &str, line2: &str) -> Result<Self, TleError> {
        let tle = Tle::parse_3line(line0, line1, line2)?;
        Self::initialize(tle, line1, line2)
    }

    fn initialize(tle: Tle, line1: &str, line2: &str) -> Result<Self, TleError> {
        let period = OrbitalPeriod::from_revs_per_day(tle.mean_motion_rev_day)?;

        let elements = sgp4::Elements::from_tle(
            tle.name.clone(),
            line1.trim().as_bytes(),
            line2.trim().as_bytes(),
        )
        .map_err(|e| TleError::Model(e.to_string()))?;

        let model = sgp4::Constants::from_elements(&elements)
            .map_err(|e| TleError::Model(e.to_string()))?;

        Ok(Self {
            epoch: tle.epoch(),
            tle,
            period,
            model,
        })
    }

    /// The parsed TLE record.
    pub fn tle(&self) -> &Tle {
        &self.tle
    }

    /// NORAD catalog number.
    pub fn norad_id(&self) -> u32 {
        self.tle.norad_id
    }

    /// Satellite name, when loaded from a 3-line record.
    pub fn name(&self) -> Option<&str> {
        self.tle.name.as_deref()
    }

    /// Element set epoch (UTC).
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Cached orbital period.
    pub fn period(&self) -> OrbitalPeriod {
        self.period
    }

    /// Minutes elapsed from the element epoch to `instant` (negative before it).
    pub fn minutes_since_epoch(&self, instant: Epoch) -> f64 {
        (instant - self.epoch).to_unit(Unit::Minute)
    }

    pub(crate) fn model(&self) -> &sgp4::Constants {
        &self.model
    }
}

impl std::fmt::Display for OrbitalElementSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {}, period {}", self.tle, self.epoch, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use crate::test_utils::{ISS_LINE1, ISS_LINE2};

    #[test]
    fn test_iss_period() {
        let set = OrbitalElementSet::from_lines(ISS_LINE1, ISS_LINE2).unwrap();
        let period = set.period().seconds();
        let n = set.tle().mean_motion_rad_s();
        assert_relative_eq!(period, TAU / n, max_relative = 1e-12);
        assert_relative_eq!(period, 5568.0, max_relative = 0.01);
    }

    #[test]
    fn test_period_matches_revs_per_day() {
        let period = OrbitalPeriod::from_revs_per_day(15.4956).unwrap();
        assert_relative_eq!(period.seconds(), SOLAR_DAY / 15.4956, max_relative = 1e-12);
        assert_relative_eq!(period.duration().to_seconds(), period.seconds(), epsilon = 1e-6);
    }

    #[test]
    fn test_invalid_periods() {
        assert!(OrbitalPeriod::from_revs_per_day(0.0).is_err());
        assert!(OrbitalPeriod::from_revs_per_day(-1.0).is_err());
        assert!(OrbitalPeriod::from_revs_per_day(f64::NAN).is_err());
        assert!(OrbitalPeriod::from_mean_motion(0.0).is_none());
        assert!(OrbitalPeriod::from_seconds(f64::INFINITY).is_none());
    }

    #[test]
    fn test_minutes_since_epoch() {
        let set = OrbitalElementSet::from_lines(ISS_LINE1, ISS_LINE2).unwrap();
        let later = set.epoch() + Unit::Hour * 2.0;
        assert_relative_eq!(set.minutes_since_epoch(later), 120.0, epsilon = 1e-6);
        let earlier = set.epoch() - Unit::Minute * 30.0;
        assert_relative_eq!(set.minutes_since_epoch(earlier), -30.0, epsilon = 1e-6);
    }

    #[test]
    fn test_named_set() {
        let set = OrbitalElementSet::from_3line("ISS (ZARYA)", ISS_LINE1, ISS_LINE2).unwrap();
        assert_eq!(set.name(), Some("ISS (ZARYA)"));
        assert_eq!(set.norad_id(), 25544);
    }
}
