//! # orbit-radar
//!
//! Where is the satellite right now, and what does its orbit look like?
//!
//! Loads two-line element sets, propagates them with SGP4, converts the
//! result to geodetic latitude/longitude/height and samples one revolution
//! around a reference instant for drawing. A synthetic circular orbit stands
//! in when no element data is available.

pub mod constants;
pub mod config;
pub mod tle;
pub mod elements;
pub mod geodetic;
pub mod propagator;
pub mod tracker;
pub mod synthetic;
pub mod trajectory;
pub mod clock;
pub mod session;

#[cfg(test)]
mod test_utils;

pub use config::{CircularOrbitConfig, ConfigError, RadarConfig};
pub use elements::{OrbitalElementSet, OrbitalPeriod};
pub use geodetic::GeodeticPosition;
pub use propagator::{PositionSource, PropagationError, StateVector};
pub use session::{Frame, RadarSession, SourceKind};
pub use tle::{Tle, TleError};
pub use tracker::OrbitTracker;
pub use trajectory::{TrajectoryPoint, TrajectorySample, TrajectorySampler};

#[cfg(feature = "python")]
mod pybridge;

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn orbit_radar(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pybridge::register(m)?;
    Ok(())
}
