//! Host-facing driver.
//!
//! [`RadarSession`] is what a rendering loop talks to. It owns the tracker,
//! the synthetic fallback orbit and the sampler, reads time from a [`Clock`],
//! and decides which position source is live:
//!
//! 1. real elements, once loaded, always win;
//! 2. after the host reports a failed element fetch, the circular orbit;
//! 3. otherwise nothing is shown yet.
use hifitime::Epoch;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::config::{ConfigError, RadarConfig};
use crate::elements::OrbitalElementSet;
use crate::geodetic::GeodeticPosition;
use crate::synthetic::CircularOrbit;
use crate::tle::TleError;
use crate::tracker::OrbitTracker;
use crate::trajectory::{TrajectorySample, TrajectorySampler};

/// Which source produced a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// SGP4 on loaded elements.
    Propagated,
    /// The synthetic circular orbit.
    Circular,
    /// No elements yet and no fallback.
    Pending,
}

/// Output of one animation tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub instant: Epoch,
    pub source: SourceKind,
    /// `None` when the source is pending or propagation failed this tick.
    pub position: Option<GeodeticPosition>,
    /// Height over the configured body radius.
    pub normalized_altitude: Option<f64>,
}

pub struct RadarSession<C: Clock> {
    config: RadarConfig,
    clock: C,
    tracker: OrbitTracker,
    fallback: CircularOrbit,
    fallback_active: bool,
    sampler: TrajectorySampler,
    show_trajectory: bool,
    last_known: Option<GeodeticPosition>,
}

impl<C: Clock> RadarSession<C> {
    /// Validate `config` and start a session. The fallback orbit is anchored
    /// at the clock's current instant.
    pub fn new(config: RadarConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let fallback = CircularOrbit::new(&config.fallback_orbit, clock.now())?;
        let tracker = OrbitTracker::with_body_radius(config.body_radius_km)?;
        Ok(RadarSession {
            sampler: TrajectorySampler::new(config.trajectory_points),
            config,
            clock,
            tracker,
            fallback,
            fallback_active: false,
            show_trajectory: false,
            last_known: None,
        })
    }

    pub fn config(&self) -> &RadarConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn tracker(&self) -> &OrbitTracker {
        &self.tracker
    }

    pub fn fallback(&self) -> &CircularOrbit {
        &self.fallback
    }

    /// Load fetched element text. On success the session leaves fallback mode.
    pub fn load_elements(&mut self, text: &str) -> Result<&OrbitalElementSet, TleError> {
        let set = self.tracker.load_text(text)?;
        if self.fallback_active {
            info!("real elements arrived, leaving circular fallback");
            self.fallback_active = false;
        }
        Ok(set)
    }

    /// Load two already-split TLE lines.
    pub fn load_lines(&mut self, line1: &str, line2: &str) -> Result<&OrbitalElementSet, TleError> {
        let set = self.tracker.load(line1, line2)?;
        if self.fallback_active {
            info!("real elements arrived, leaving circular fallback");
            self.fallback_active = false;
        }
        Ok(set)
    }

    /// The host could not fetch elements. Switches to the circular orbit
    /// unless elements from an earlier fetch are still loaded.
    pub fn element_fetch_failed(&mut self, reason: &str) {
        if self.tracker.is_available() {
            warn!("element refresh failed ({reason}), keeping current elements");
            return;
        }
        warn!("element fetch failed ({reason}), showing circular orbit");
        self.fallback_active = true;
    }

    /// The source that [`Self::tick`] will use.
    pub fn source_kind(&self) -> SourceKind {
        if self.tracker.is_available() {
            SourceKind::Propagated
        } else if self.fallback_active {
            SourceKind::Circular
        } else {
            SourceKind::Pending
        }
    }

    /// Compute the frame for the clock's current instant.
    pub fn tick(&mut self) -> Frame {
        let instant = self.clock.now();
        let source = self.source_kind();
        let position = match source {
            SourceKind::Propagated => match self.tracker.position_at(instant) {
                Ok(position) => position,
                Err(e) => {
                    debug!("{instant}: no position this tick: {e}");
                    None
                }
            },
            SourceKind::Circular => Some(self.fallback.position(instant)),
            SourceKind::Pending => None,
        };

        if position.is_some() {
            self.last_known = position;
        }

        Frame {
            instant,
            source,
            position,
            normalized_altitude: position.map(|p| p.normalized_altitude(self.tracker.body_radius_km())),
        }
    }

    /// Most recent position any tick produced.
    pub fn last_known(&self) -> Option<GeodeticPosition> {
        self.last_known
    }

    pub fn show_trajectory(&self) -> bool {
        self.show_trajectory
    }

    /// Flip trajectory visibility; returns the new state.
    pub fn toggle_trajectory(&mut self) -> bool {
        self.show_trajectory = !self.show_trajectory;
        debug!("trajectory {}", if self.show_trajectory { "shown" } else { "hidden" });
        self.show_trajectory
    }

    /// Trajectory for the current instant, if shown and a source is live.
    pub fn trajectory(&self) -> Option<TrajectorySample> {
        if !self.show_trajectory {
            return None;
        }
        match self.source_kind() {
            SourceKind::Propagated => self.sampler.sample(&self.tracker, self.clock.now()),
            SourceKind::Circular => Some(self.sampler.sample_circular(&self.fallback)),
            SourceKind::Pending => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hifitime::Unit;

    use crate::clock::SteppedClock;
    use crate::test_utils::{init_logger, ISS_LINE1, ISS_LINE2};

    fn start() -> Epoch {
        Epoch::from_gregorian_utc_hms(2024, 1, 1, 12, 0, 0)
    }

    fn session(clock: &SteppedClock) -> RadarSession<&SteppedClock> {
        RadarSession::new(RadarConfig::default(), clock).unwrap()
    }

    #[test]
    fn test_pending_until_something_happens() {
        init_logger();
        let clock = SteppedClock::at_rate(start(), 60.0);
        let mut session = session(&clock);

        let frame = session.tick();
        assert_eq!(frame.source, SourceKind::Pending);
        assert!(frame.position.is_none());
        assert!(frame.normalized_altitude.is_none());

        session.toggle_trajectory();
        assert!(session.trajectory().is_none());
    }

    #[test]
    fn test_fetch_failure_falls_back_to_circle() {
        init_logger();
        let clock = SteppedClock::at_rate(start(), 60.0);
        let mut session = session(&clock);
        session.element_fetch_failed("HTTP 503");

        let frame = session.tick();
        assert_eq!(frame.source, SourceKind::Circular);
        let pos = frame.position.unwrap();
        assert_eq!(pos.latitude_deg, 0.0);
        assert_relative_eq!(pos.longitude_deg, 0.0, epsilon = 1e-9);
        assert_relative_eq!(frame.normalized_altitude.unwrap(), 420.0 / 6371.0);

        clock.advance(Unit::Second * (5568.0 / 4.0));
        let frame = session.tick();
        assert_relative_eq!(frame.position.unwrap().longitude_deg, 90.0, epsilon = 1e-6);
    }

    #[test]
    fn test_elements_replace_fallback() {
        init_logger();
        let clock = SteppedClock::at_rate(start(), 60.0);
        let mut session = session(&clock);
        session.element_fetch_failed("timeout");
        assert_eq!(session.source_kind(), SourceKind::Circular);

        let text = format!("ISS (ZARYA)\n{ISS_LINE1}\n{ISS_LINE2}\n");
        session.load_elements(&text).unwrap();
        assert_eq!(session.source_kind(), SourceKind::Propagated);

        let frame = session.tick();
        let pos = frame.position.unwrap();
        assert!(pos.height_km > 370.0 && pos.height_km < 470.0);
        assert_eq!(session.last_known(), Some(pos));

        // A later refresh failure keeps the real elements
        session.element_fetch_failed("timeout");
        assert_eq!(session.source_kind(), SourceKind::Propagated);
    }

    #[test]
    fn test_lines_replace_fallback() {
        let clock = SteppedClock::at_rate(start(), 60.0);
        let config = RadarConfig {
            body_radius_km: 1000.0,
            ..Default::default()
        };
        let mut session = RadarSession::new(config, &clock).unwrap();
        session.element_fetch_failed("timeout");
        session.load_lines(ISS_LINE1, ISS_LINE2).unwrap();
        assert_eq!(session.source_kind(), SourceKind::Propagated);
        assert_eq!(session.tracker().body_radius_km(), 1000.0);

        let frame = session.tick();
        let height = frame.position.unwrap().height_km;
        assert_relative_eq!(frame.normalized_altitude.unwrap(), height / 1000.0);
    }

    #[test]
    fn test_garbled_load_keeps_fallback() {
        let clock = SteppedClock::at_rate(start(), 60.0);
        let mut session = session(&clock);
        session.element_fetch_failed("offline");
        assert!(session.load_elements("not a tle").is_err());
        assert_eq!(session.source_kind(), SourceKind::Circular);
    }

    #[test]
    fn test_ticks_follow_the_clock() {
        let clock = SteppedClock::at_rate(start(), 60.0);
        let mut session = session(&clock);
        session.load_lines(ISS_LINE1, ISS_LINE2).unwrap();

        let first = session.tick();
        clock.tick();
        let second = session.tick();
        assert_relative_eq!((second.instant - first.instant).to_seconds(), 1.0 / 60.0, epsilon = 1e-6);
        assert_ne!(first.position, second.position);
    }

    #[test]
    fn test_failed_tick_keeps_last_known() {
        init_logger();
        let clock = SteppedClock::at_rate(start(), 60.0);
        let mut session = session(&clock);
        session.load_lines(ISS_LINE1, ISS_LINE2).unwrap();
        session.toggle_trajectory();

        let good = session.tick().position.unwrap();
        assert_eq!(session.trajectory().unwrap().skipped(), 0);

        clock.advance(Unit::Day * 3650.0);
        assert!(session.tracker().position_at(clock.now()).is_err());

        let frame = session.tick();
        assert_eq!(frame.source, SourceKind::Propagated);
        assert_eq!(frame.position, None);
        assert_eq!(frame.normalized_altitude, None);
        assert_eq!(session.last_known(), Some(good));

        let traj = session.trajectory().unwrap();
        assert!(traj.len() < traj.requested);
        assert_eq!(traj.skipped(), traj.requested - traj.len());
    }

    #[test]
    fn test_trajectory_toggle() {
        let clock = SteppedClock::at_rate(start(), 60.0);
        let mut session = session(&clock);
        session.load_lines(ISS_LINE1, ISS_LINE2).unwrap();

        assert!(!session.show_trajectory());
        assert!(session.trajectory().is_none());

        assert!(session.toggle_trajectory());
        let traj = session.trajectory().unwrap();
        assert_eq!(traj.len(), 100);
        assert_eq!(traj.reference, start());

        assert!(!session.toggle_trajectory());
        assert!(session.trajectory().is_none());
    }

    #[test]
    fn test_circular_trajectory() {
        let clock = SteppedClock::at_rate(start(), 60.0);
        let config = RadarConfig::default().with_trajectory_points(4);
        let mut session = RadarSession::new(config, &clock).unwrap();
        session.element_fetch_failed("offline");
        session.toggle_trajectory();

        let traj = session.trajectory().unwrap();
        let lons: Vec<f64> = traj.positions().map(|p| p.longitude_deg).collect();
        assert_eq!(lons, vec![0.0, 120.0, 240.0, 360.0]);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let clock = SteppedClock::at_rate(start(), 60.0);
        let config = RadarConfig::default().with_tick_rate(-1.0);
        assert!(matches!(
            RadarSession::new(config, &clock),
            Err(ConfigError::TickRate(_))
        ));
    }
}
