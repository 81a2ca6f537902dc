//! Trajectory sampling.
//!
//! A trajectory is one full revolution of positions centered on a reference
//! instant: `point_count` offsets evenly spaced over `[-P/2, +P/2]`, both ends
//! included. Points whose propagation fails are dropped rather than
//! replaced, so a sample can come back shorter than requested but is always
//! ordered by time.
use hifitime::{Epoch, Unit};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::elements::OrbitalPeriod;
use crate::geodetic::GeodeticPosition;
use crate::propagator::PositionSource;
use crate::synthetic::CircularOrbit;

/// One point of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    /// Offset from the reference instant (s).
    pub offset_s: f64,
    pub position: GeodeticPosition,
}

/// An ordered single-revolution path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub reference: Epoch,
    pub period: OrbitalPeriod,
    /// Number of points asked for; `points.len()` may be smaller.
    pub requested: usize,
    pub points: Vec<TrajectoryPoint>,
}

impl TrajectorySample {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points dropped because their propagation failed.
    pub fn skipped(&self) -> usize {
        self.requested.saturating_sub(self.points.len())
    }

    /// Positions only, in time order.
    pub fn positions(&self) -> impl Iterator<Item = &GeodeticPosition> + '_ {
        self.points.iter().map(|p| &p.position)
    }

    /// The point whose offset is closest to the reference instant.
    pub fn closest_to_reference(&self) -> Option<&TrajectoryPoint> {
        self.points
            .iter()
            .min_by(|a, b| a.offset_s.abs().total_cmp(&b.offset_s.abs()))
    }
}

/// Evenly spaced offsets (s) over one period, centered on zero.
pub fn sample_offsets(period: OrbitalPeriod, count: usize) -> Vec<f64> {
    let half = period.seconds() / 2.0;
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let step = period.seconds() / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { half } else { -half + i as f64 * step })
                .collect()
        }
    }
}

/// Produces trajectory samples at a fixed resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySampler {
    point_count: usize,
}

impl Default for TrajectorySampler {
    fn default() -> Self {
        TrajectorySampler { point_count: 100 }
    }
}

impl TrajectorySampler {
    pub fn new(point_count: usize) -> Self {
        TrajectorySampler { point_count }
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Sample `source` around `reference` at the configured resolution.
    pub fn sample<S: PositionSource>(&self, source: &S, reference: Epoch) -> Option<TrajectorySample> {
        sample(source, reference, self.point_count)
    }

    /// Synthetic ring of the circular orbit at the configured resolution.
    pub fn sample_circular(&self, orbit: &CircularOrbit) -> TrajectorySample {
        sample_circular(orbit, self.point_count)
    }
}

/// Sample one revolution of `source` centered on `reference`.
///
/// Returns `None` when the source has no period yet.
pub fn sample<S: PositionSource>(source: &S, reference: Epoch, point_count: usize) -> Option<TrajectorySample> {
    let period = source.period()?;

    let points = sample_offsets(period, point_count)
        .into_iter()
        .filter_map(|offset_s| {
            let instant = reference + Unit::Second * offset_s;
            match source.position_at(instant) {
                Ok(Some(position)) => Some(TrajectoryPoint { offset_s, position }),
                Ok(None) => {
                    debug!("{instant}: source unavailable, point skipped");
                    None
                }
                Err(e) => {
                    debug!("{instant}: point skipped: {e}");
                    None
                }
            }
        })
        .collect();

    Some(TrajectorySample {
        reference,
        period,
        requested: point_count,
        points,
    })
}

/// The circular orbit's ring as a trajectory: longitudes over [0°, 360°].
///
/// Offsets run from 0 to one period so the sample keeps the same shape as a
/// propagated one; the ring is anchored on the orbit's reference epoch.
pub fn sample_circular(orbit: &CircularOrbit, point_count: usize) -> TrajectorySample {
    let period = orbit.orbital_period();
    let step = if point_count > 1 {
        period.seconds() / (point_count - 1) as f64
    } else {
        0.0
    };

    let points = orbit
        .ring(point_count)
        .into_iter()
        .enumerate()
        .map(|(i, position)| TrajectoryPoint {
            offset_s: i as f64 * step,
            position,
        })
        .collect();

    TrajectorySample {
        reference: orbit.reference(),
        period,
        requested: point_count,
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    use crate::config::CircularOrbitConfig;
    use crate::propagator::PropagationError;
    use crate::test_utils::{init_logger, iss_tracker};
    use crate::tracker::OrbitTracker;

    /// Fails for every instant after a cutoff.
    struct Cutoff {
        inner: CircularOrbit,
        cutoff: Epoch,
    }

    impl PositionSource for Cutoff {
        fn period(&self) -> Option<OrbitalPeriod> {
            self.inner.period()
        }

        fn position_at(&self, instant: Epoch) -> Result<Option<GeodeticPosition>, PropagationError> {
            if instant > self.cutoff {
                return Err(PropagationError::NonFinite { minutes: 0.0 });
            }
            self.inner.position_at(instant)
        }
    }

    fn circular() -> CircularOrbit {
        let reference = Epoch::from_gregorian_utc_hms(2024, 6, 1, 0, 0, 0);
        CircularOrbit::new(&CircularOrbitConfig::default(), reference).unwrap()
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(100)]
    #[case(257)]
    fn test_offsets_span_one_period(#[case] count: usize) {
        let period = OrbitalPeriod::from_seconds(5568.0).unwrap();
        let offsets = sample_offsets(period, count);
        assert_eq!(offsets.len(), count);
        assert_eq!(offsets[0], -2784.0);
        assert_eq!(offsets[count - 1], 2784.0);
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
        for (a, b) in offsets.iter().zip(offsets.iter().rev()) {
            assert_relative_eq!(*a, -*b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_offsets_degenerate() {
        let period = OrbitalPeriod::from_seconds(60.0).unwrap();
        assert!(sample_offsets(period, 0).is_empty());
        assert_eq!(sample_offsets(period, 1), vec![0.0]);
    }

    #[test]
    fn test_unavailable_without_elements() {
        let tracker = OrbitTracker::new();
        let t = Epoch::from_gregorian_utc_hms(2024, 1, 1, 12, 0, 0);
        assert!(sample(&tracker, t, 100).is_none());
        assert!(TrajectorySampler::default().sample(&tracker, t).is_none());
    }

    #[test]
    fn test_iss_hundred_points() {
        init_logger();
        let tracker = iss_tracker();
        let reference = tracker.elements().unwrap().epoch() + Unit::Minute * 15.0;
        let traj = TrajectorySampler::new(100).sample(&tracker, reference).unwrap();

        assert_eq!(traj.len(), 100);
        assert_eq!(traj.skipped(), 0);
        let period = tracker.period().unwrap().seconds();
        assert_relative_eq!(period, 5568.0, max_relative = 0.01);
        assert_relative_eq!(traj.points[0].offset_s, -period / 2.0, epsilon = 1e-9);
        assert_relative_eq!(traj.points[99].offset_s, period / 2.0, epsilon = 1e-9);
        assert!(traj.points.windows(2).all(|w| w[0].offset_s < w[1].offset_s));

        // Points 50 and 51 (1-based) straddle the reference instant
        let here = tracker.position_at(reference).unwrap().unwrap();
        let mut by_distance: Vec<(usize, f64)> = traj
            .positions()
            .enumerate()
            .map(|(i, p)| (i, p.angular_distance_deg(&here)))
            .collect();
        by_distance.sort_by(|a, b| a.1.total_cmp(&b.1));
        let mut nearest = [by_distance[0].0, by_distance[1].0];
        nearest.sort();
        assert_eq!(nearest, [49, 50]);
    }

    #[test]
    fn test_sample_is_idempotent() {
        let tracker = iss_tracker();
        let reference = tracker.elements().unwrap().epoch();
        let sampler = TrajectorySampler::new(64);
        assert_eq!(sampler.sample(&tracker, reference), sampler.sample(&tracker, reference));
    }

    #[test]
    fn test_failed_points_are_skipped() {
        init_logger();
        let inner = circular();
        let reference = inner.reference();
        let source = Cutoff {
            inner,
            cutoff: reference + Unit::Second * 1000.0,
        };

        let traj = sample(&source, reference, 11).unwrap();
        // Offsets are -2784 + 556.8 k; those past +1000 s fail
        assert_eq!(traj.len(), 7);
        assert_eq!(traj.skipped(), 4);
        assert!(traj.points.windows(2).all(|w| w[0].offset_s < w[1].offset_s));
        assert!(traj.points.iter().all(|p| p.offset_s <= 1000.0));
    }

    #[test]
    fn test_circular_sample_shape() {
        let traj = sample_circular(&circular(), 4);
        let lons: Vec<f64> = traj.positions().map(|p| p.longitude_deg).collect();
        assert_eq!(lons, vec![0.0, 120.0, 240.0, 360.0]);
        assert!(traj.positions().all(|p| p.latitude_deg == 0.0));
        assert_eq!(traj.requested, 4);
        assert_relative_eq!(traj.points[3].offset_s, 5568.0, epsilon = 1e-9);
    }

    #[test]
    fn test_circular_through_position_source() {
        let orbit = circular();
        let traj = sample(&orbit, orbit.reference(), 5).unwrap();
        let lons: Vec<f64> = traj.positions().map(|p| p.longitude_deg).collect();
        // -P/2 .. +P/2 wraps through the antimeridian
        assert_relative_eq!(lons[0], -180.0, epsilon = 1e-6);
        assert_relative_eq!(lons[1], -90.0, epsilon = 1e-6);
        assert_relative_eq!(lons[2], 0.0, epsilon = 1e-6);
        assert_relative_eq!(lons[3], 90.0, epsilon = 1e-6);
        assert_relative_eq!(lons[4], 180.0, epsilon = 1e-6);
    }

    #[test]
    fn test_skipped_on_inconsistent_sample() {
        let mut traj = sample_circular(&circular(), 4);
        traj.requested = 2;
        assert_eq!(traj.skipped(), 0);
    }

    #[test]
    fn test_closest_to_reference() {
        let orbit = circular();
        let traj = sample(&orbit, orbit.reference(), 101).unwrap();
        let mid = traj.closest_to_reference().unwrap();
        assert_relative_eq!(mid.offset_s, 0.0, epsilon = 1e-6);
        assert_eq!(traj.points[50], *mid);
    }
}
