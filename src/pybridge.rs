//! Python bindings via PyO3.
//!
//! Instants cross the boundary as UNIX seconds (UTC); positions as
//! `(latitude_deg, longitude_deg, height_km)` tuples.
use hifitime::Epoch;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::config::CircularOrbitConfig;
use crate::geodetic::GeodeticPosition;
use crate::synthetic::CircularOrbit;
use crate::tle::Tle;
use crate::tracker::OrbitTracker;
use crate::trajectory;

type LatLonHeight = (f64, f64, f64);

fn to_tuple(p: GeodeticPosition) -> LatLonHeight {
    (p.latitude_deg, p.longitude_deg, p.height_km)
}

// TLE
#[pyclass(name = "TLE")]
#[derive(Clone)]
pub struct PyTle {
    inner: Tle,
}

#[pymethods]
impl PyTle {
    /// Parse a TLE from two lines.
    #[staticmethod]
    fn parse(line1: &str, line2: &str) -> PyResult<Self> {
        Tle::parse(line1, line2)
            .map(|t| PyTle { inner: t })
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Parse a TLE from three lines (name + line1 + line2).
    #[staticmethod]
    fn parse_3line(name: &str, line1: &str, line2: &str) -> PyResult<Self> {
        Tle::parse_3line(name, line1, line2)
            .map(|t| PyTle { inner: t })
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Parse every record in fetched element text.
    #[staticmethod]
    fn parse_batch(text: &str) -> PyResult<Vec<PyTle>> {
        Tle::parse_batch(text)
            .map(|tles| tles.into_iter().map(|t| PyTle { inner: t }).collect())
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Semi-major axis (km).
    fn semi_major_axis(&self) -> f64 { self.inner.semi_major_axis() }

    /// Altitude (km).
    fn altitude(&self) -> f64 { self.inner.altitude() }

    /// Epoch as UNIX seconds.
    fn epoch_unix(&self) -> f64 { self.inner.epoch().to_unix_seconds() }

    #[getter] fn name(&self) -> Option<String> { self.inner.name.clone() }
    #[getter] fn norad_id(&self) -> u32 { self.inner.norad_id }
    #[getter] fn inclination_deg(&self) -> f64 { self.inner.inclination_deg }
    #[getter] fn eccentricity(&self) -> f64 { self.inner.eccentricity }
    #[getter] fn mean_motion(&self) -> f64 { self.inner.mean_motion_rev_day }

    fn __repr__(&self) -> String {
        format!("{}", self.inner)
    }
}

// Tracker
#[pyclass(name = "OrbitTracker")]
#[derive(Clone, Default)]
pub struct PyOrbitTracker {
    inner: OrbitTracker,
}

#[pymethods]
impl PyOrbitTracker {
    #[new]
    fn new() -> Self {
        Self::default()
    }

    /// Load two TLE lines; the previous set survives a failed load.
    fn load(&mut self, line1: &str, line2: &str) -> PyResult<()> {
        self.inner
            .load(line1, line2)
            .map(|_| ())
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Load the first record of fetched element text.
    fn load_text(&mut self, text: &str) -> PyResult<()> {
        self.inner
            .load_text(text)
            .map(|_| ())
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    #[getter]
    fn available(&self) -> bool {
        self.inner.is_available()
    }

    /// Orbital period (s), or None before a load.
    fn period(&self) -> Option<f64> {
        self.inner.period().map(|p| p.seconds())
    }

    /// Position at a UNIX time, or None before a load.
    fn position_at(&self, unix_s: f64) -> PyResult<Option<LatLonHeight>> {
        self.inner
            .position_at(Epoch::from_unix_seconds(unix_s))
            .map(|p| p.map(to_tuple))
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }

    /// One revolution of positions centered on a UNIX time.
    #[pyo3(signature = (unix_s, point_count=100))]
    fn sample(&self, unix_s: f64, point_count: usize) -> Option<Vec<LatLonHeight>> {
        trajectory::sample(&self.inner, Epoch::from_unix_seconds(unix_s), point_count)
            .map(|traj| traj.positions().copied().map(to_tuple).collect())
    }
}

// Circular orbit
#[pyclass(name = "CircularOrbit")]
#[derive(Clone)]
pub struct PyCircularOrbit {
    inner: CircularOrbit,
}

#[pymethods]
impl PyCircularOrbit {
    #[new]
    #[pyo3(signature = (reference_unix_s, latitude_deg=0.0, altitude_km=420.0, period_s=5568.0))]
    fn new(reference_unix_s: f64, latitude_deg: f64, altitude_km: f64, period_s: f64) -> PyResult<Self> {
        let config = CircularOrbitConfig {
            latitude_deg,
            altitude_km,
            period_s,
        };
        CircularOrbit::new(&config, Epoch::from_unix_seconds(reference_unix_s))
            .map(|inner| PyCircularOrbit { inner })
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn position_at(&self, unix_s: f64) -> LatLonHeight {
        to_tuple(self.inner.position(Epoch::from_unix_seconds(unix_s)))
    }

    /// Ring of `point_count` points over [0°, 360°].
    #[pyo3(signature = (point_count=100))]
    fn ring(&self, point_count: usize) -> Vec<LatLonHeight> {
        self.inner.ring(point_count).into_iter().map(to_tuple).collect()
    }
}

pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTle>()?;
    m.add_class::<PyOrbitTracker>()?;
    m.add_class::<PyCircularOrbit>()?;
    Ok(())
}
