//! Shared fixtures for unit tests.
use std::sync::Once;

use log::LevelFilter;

use crate::elements::OrbitalElementSet;
use crate::tracker::OrbitTracker;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(LevelFilter::Debug)
            .init();
    });
}

/// ISS (ZARYA), epoch 2024-01-01 12:00 UTC.
pub const ISS_LINE1: &str = "1 25544U 98067A   24001.50000000  .00016717  00000-0  10270-3 0  9009";
pub const ISS_LINE2: &str = "2 25544  51.6400 208.5000 0007417  68.0000 292.1000 15.49560000400004";

/// HST, same epoch.
pub const HUBBLE_LINE1: &str = "1 20580U 90037B   24001.50000000  .00000764  00000-0  34340-4 0  9991";
pub const HUBBLE_LINE2: &str = "2 20580  28.4700 100.2000 0002500 300.0000  60.0000 15.09000000400006";

pub fn iss_elements() -> OrbitalElementSet {
    OrbitalElementSet::from_lines(ISS_LINE1, ISS_LINE2).unwrap()
}

pub fn iss_tracker() -> OrbitTracker {
    OrbitTracker::from_lines(ISS_LINE1, ISS_LINE2).unwrap()
}
