//! The orbital state holder.
//!
//! [`OrbitTracker`] owns the element set of the one satellite being shown and
//! answers "where is it at time T". Loading replaces the set wholesale; a
//! failed load leaves the previous set in place. Queries take `&self` and
//! never mutate, so repeated calls with the same instant agree bit for bit.
use hifitime::Epoch;
use log::{debug, info};

use crate::config::ConfigError;
use crate::constants::R_EARTH_MEAN;
use crate::elements::{OrbitalElementSet, OrbitalPeriod};
use crate::geodetic::GeodeticPosition;
use crate::propagator::{self, PositionSource, PropagationError, StateVector};
use crate::tle::{self, TleError};

/// Holds the active element set and converts instants into positions.
#[derive(Debug, Clone)]
pub struct OrbitTracker {
    elements: Option<OrbitalElementSet>,
    /// Reference radius for normalized altitude (km).
    body_radius_km: f64,
}

impl Default for OrbitTracker {
    fn default() -> Self {
        OrbitTracker {
            elements: None,
            body_radius_km: R_EARTH_MEAN,
        }
    }
}

impl OrbitTracker {
    /// A tracker with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// A tracker normalizing altitude against `body_radius_km`.
    pub fn with_body_radius(body_radius_km: f64) -> Result<Self, ConfigError> {
        if !body_radius_km.is_finite() || body_radius_km <= 0.0 {
            return Err(ConfigError::BodyRadius(body_radius_km));
        }
        Ok(OrbitTracker {
            elements: None,
            body_radius_km,
        })
    }

    pub fn body_radius_km(&self) -> f64 {
        self.body_radius_km
    }

    /// A tracker initialized from two TLE lines.
    pub fn from_lines(line1: &str, line2: &str) -> Result<Self, TleError> {
        let mut tracker = Self::new();
        tracker.load(line1, line2)?;
        Ok(tracker)
    }

    /// Parse two TLE lines and make them the active element set.
    pub fn load(&mut self, line1: &str, line2: &str) -> Result<&OrbitalElementSet, TleError> {
        let set = OrbitalElementSet::from_lines(line1, line2)?;
        Ok(self.replace(set))
    }

    /// Same as [`Self::load`] for a named 3-line record.
    pub fn load_3line(&mut self, line0: &str, line1: &str, line2: &str) -> Result<&OrbitalElementSet, TleError> {
        let set = OrbitalElementSet::from_3line(line0, line1, line2)?;
        Ok(self.replace(set))
    }

    /// Load the first record found in raw fetched text (2- or 3-line form).
    pub fn load_text(&mut self, text: &str) -> Result<&OrbitalElementSet, TleError> {
        let record = tle::records(text).into_iter().next().ok_or(TleError::Empty)?;
        let set = match record.name {
            Some(name) => OrbitalElementSet::from_3line(name, record.line1, record.line2)?,
            None => OrbitalElementSet::from_lines(record.line1, record.line2)?,
        };
        Ok(self.replace(set))
    }

    /// Install an already-built element set.
    pub fn replace(&mut self, set: OrbitalElementSet) -> &OrbitalElementSet {
        info!("loaded elements: {}", set);
        self.elements.insert(set)
    }

    /// Forget the active element set; the tracker becomes unavailable.
    pub fn clear(&mut self) {
        if let Some(set) = self.elements.take() {
            debug!("cleared elements for NORAD {}", set.norad_id());
        }
    }

    /// The active element set, if any.
    pub fn elements(&self) -> Option<&OrbitalElementSet> {
        self.elements.as_ref()
    }

    /// Whether an element set is loaded.
    pub fn is_available(&self) -> bool {
        self.elements.is_some()
    }

    /// Cached orbital period; `None` until something is loaded.
    pub fn period(&self) -> Option<OrbitalPeriod> {
        self.elements.as_ref().map(OrbitalElementSet::period)
    }

    /// TEME state vector at `instant`; `Ok(None)` when nothing is loaded.
    pub fn state_at(&self, instant: Epoch) -> Result<Option<StateVector>, PropagationError> {
        self.elements
            .as_ref()
            .map(|set| propagator::propagate(set, instant))
            .transpose()
    }

    /// Geodetic position at `instant`; `Ok(None)` when nothing is loaded.
    pub fn position_at(&self, instant: Epoch) -> Result<Option<GeodeticPosition>, PropagationError> {
        Ok(self.state_at(instant)?.map(|sv| sv.to_geodetic()))
    }

    /// Height at `instant` as a fraction of the body radius.
    pub fn normalized_altitude_at(&self, instant: Epoch) -> Result<Option<f64>, PropagationError> {
        Ok(self
            .position_at(instant)?
            .map(|p| p.normalized_altitude(self.body_radius_km)))
    }
}

impl PositionSource for OrbitTracker {
    fn period(&self) -> Option<OrbitalPeriod> {
        OrbitTracker::period(self)
    }

    fn position_at(&self, instant: Epoch) -> Result<Option<GeodeticPosition>, PropagationError> {
        OrbitTracker::position_at(self, instant)
    }
}
