//! Orbit propagation: SGP4 state vectors and the position-source contract.
//!
//! [`propagate`] advances an [`OrbitalElementSet`] to an arbitrary instant
//! with the SGP4/SDP4 model and returns a TEME state vector. It is a pure
//! function of (elements, instant).
//!
//! # Architecture
//! Anything that can report a geographic position over time implements
//! [`PositionSource`]. The SGP4-backed tracker and the synthetic circular
//! orbit both do, so trajectory sampling works the same on either.
use hifitime::Epoch;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::elements::{OrbitalElementSet, OrbitalPeriod};
use crate::geodetic::{self, GeodeticPosition};

/// Propagation failures. The caller must not substitute a stale position.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropagationError {
    #[error("SGP4 failed {minutes:.1} min from epoch: {reason}")]
    Model { minutes: f64, reason: String },

    #[error("SGP4 returned a non-finite state {minutes:.1} min from epoch")]
    NonFinite { minutes: f64 },

    #[error("Orbit decayed: height {height_km:.1} km is below the surface {minutes:.1} min from epoch")]
    Decayed { minutes: f64, height_km: f64 },
}

// ── State vector ──

/// Cartesian state vector in the TEME inertial frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    /// Position (km): [x, y, z]
    pub r: [f64; 3],
    /// Velocity (km/s): [vx, vy, vz]
    pub v: [f64; 3],
    /// Instant of this state
    pub epoch: Epoch,
}

impl StateVector {
    /// Position magnitude (km).
    pub fn r_mag(&self) -> f64 {
        (self.r[0].powi(2) + self.r[1].powi(2) + self.r[2].powi(2)).sqrt()
    }

    /// Velocity magnitude (km/s).
    pub fn v_mag(&self) -> f64 {
        (self.v[0].powi(2) + self.v[1].powi(2) + self.v[2].powi(2)).sqrt()
    }

    /// Altitude above the equatorial radius (km).
    pub fn altitude(&self) -> f64 {
        self.r_mag() - R_EARTH
    }

    /// Geodetic position, rotating by GMST at the state's epoch.
    pub fn to_geodetic(&self) -> GeodeticPosition {
        geodetic::teme_to_geodetic(self.r, self.epoch)
    }
}

/// Propagate an element set to `instant` with SGP4.
pub fn propagate(elements: &OrbitalElementSet, instant: Epoch) -> Result<StateVector, PropagationError> {
    let minutes = elements.minutes_since_epoch(instant);

    let prediction = elements
        .model()
        .propagate(sgp4::MinutesSinceEpoch(minutes))
        .map_err(|e| PropagationError::Model {
            minutes,
            reason: e.to_string(),
        })?;

    let state = StateVector {
        r: prediction.position,
        v: prediction.velocity,
        epoch: instant,
    };
    check_state(&state, minutes)?;
    Ok(state)
}

/// Reject states SGP4 produced but that cannot be a flying satellite.
fn check_state(state: &StateVector, minutes: f64) -> Result<(), PropagationError> {
    if state.r.iter().chain(state.v.iter()).any(|c| !c.is_finite()) {
        return Err(PropagationError::NonFinite { minutes });
    }
    // Rotation about the polar axis leaves geodetic height unchanged
    let height_km = geodetic::ecef_to_geodetic(state.r).height_km;
    if height_km < 0.0 {
        return Err(PropagationError::Decayed { minutes, height_km });
    }
    Ok(())
}

// ── Position sources ──

/// Something that reports a satellite's geographic position over time.
///
/// `Ok(None)` means "unavailable": nothing to propagate yet. That is a valid
/// state, not an error.
pub trait PositionSource {
    /// Orbital period, or `None` when unavailable.
    fn period(&self) -> Option<OrbitalPeriod>;

    /// Geographic position at `instant`.
    fn position_at(&self, instant: Epoch) -> Result<Option<GeodeticPosition>, PropagationError>;
}

impl<S: PositionSource + ?Sized> PositionSource for &S {
    fn period(&self) -> Option<OrbitalPeriod> {
        (**self).period()
    }

    fn position_at(&self, instant: Epoch) -> Result<Option<GeodeticPosition>, PropagationError> {
        (**self).position_at(instant)
    }
}
