//! Track processing: per-stripe headings, heading smoothing and tow-cable
//! lag compensation.
//!
//! The track is the ordered list of stripe origin fixes. Headings are planar
//! bearings between consecutive (non-duplicate) fixes; the cable-lag step
//! moves every fix backward along the track by the configured trailing
//! distance, extrapolating past the track start along the reverse of the
//! initial heading where the recording is too short.

mod savgol;

pub use savgol::savgol_smooth;

use log::debug;

use crate::angle::{bearing_direction, planar_bearing_deg, planar_distance};
use crate::config::CableLag;
use crate::stripe::Stripe;
use crate::types::ProjPoint;

/// Stripe origin points with a parallel heading array in degrees.
///
/// Entry `i` of the heading array holds the bearing into point `i + 1`; the
/// final entry duplicates its predecessor so both arrays stay equally long.
#[derive(Clone, Debug)]
pub struct Track {
    points: Vec<ProjPoint>,
    headings: Vec<f64>,
}

impl Track {
    pub fn new(points: Vec<ProjPoint>) -> Self {
        let mut track = Self {
            points,
            headings: Vec::new(),
        };
        track.compute_headings();
        track
    }

    pub fn from_stripes(stripes: &[Stripe]) -> Self {
        Self::new(stripes.iter().map(|s| s.origin).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[ProjPoint] {
        &self.points
    }

    #[inline]
    pub fn headings(&self) -> &[f64] {
        &self.headings
    }

    /// Recompute the heading array from the current points. For each point
    /// the bearing is taken from the nearest backward neighbour that
    /// actually differs (duplicates are skipped defensively; stripe origins
    /// should already be distinct).
    pub fn compute_headings(&mut self) {
        let n = self.points.len();
        self.headings.clear();
        if n < 2 {
            self.headings.resize(n, 0.0);
            return;
        }
        for i in 1..n {
            let mut j = 1;
            while i > j && self.points[i - j] == self.points[i] {
                j += 1;
            }
            self.headings.push(planar_bearing_deg(
                self.points[i - j].as_tuple(),
                self.points[i].as_tuple(),
            ));
        }
        let last = *self.headings.last().expect("n >= 2");
        self.headings.push(last);
    }

    /// Smooth the heading array with a centered Savitzky–Golay filter.
    /// Safe to call both before and after [`Track::apply_cable_lag`].
    pub fn smooth_headings(&mut self, window: usize, order: usize) {
        self.headings = savgol_smooth(&self.headings, window, order);
    }

    /// Offset every point backward along the track by its lag target, then
    /// recompute headings.
    ///
    /// The walk accumulates planar distance between consecutive track
    /// points until the target is reached. Points whose walk exhausts the
    /// track are extrapolated behind the first point along the reverse of
    /// the initial heading, each by its remaining shortfall, which spaces
    /// them evenly for an evenly sampled track. A zero lag is the identity.
    pub fn apply_cable_lag(&mut self, lag: &CableLag) {
        if self.points.len() < 2 {
            return;
        }
        let initial_heading = self.headings.first().copied().unwrap_or(0.0);
        let back = bearing_direction(initial_heading);

        let new_points: Vec<ProjPoint> = (0..self.points.len())
            .map(|i| {
                let target = lag.lag_at(i);
                if target <= 0.0 {
                    return self.points[i];
                }
                let mut walked = 0.0;
                let mut k = i;
                while k > 0 {
                    walked += planar_distance(
                        self.points[k].as_tuple(),
                        self.points[k - 1].as_tuple(),
                    );
                    k -= 1;
                    if walked >= target {
                        return self.points[k];
                    }
                }
                let shortfall = target - walked;
                ProjPoint::new(
                    self.points[0].x - back.0 * shortfall,
                    self.points[0].y - back.1 * shortfall,
                )
            })
            .collect();

        self.points = new_points;
        debug!("cable lag applied to {} track points", self.points.len());
        self.compute_headings();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn north_track(n: usize, step: f64) -> Track {
        Track::new(
            (0..n)
                .map(|i| ProjPoint::new(500.0, 100.0 + i as f64 * step))
                .collect(),
        )
    }

    #[test]
    fn collinear_north_points_have_zero_heading() {
        let track = north_track(3, 10.0);
        assert_eq!(track.headings().len(), 3);
        for &h in track.headings() {
            assert!(h.abs() < 1e-9, "expected due-north heading, got {h}");
        }
    }

    #[test]
    fn last_heading_duplicates_previous() {
        let track = Track::new(vec![
            ProjPoint::new(0.0, 0.0),
            ProjPoint::new(0.0, 5.0),
            ProjPoint::new(5.0, 5.0),
        ]);
        let headings = track.headings();
        assert_eq!(headings.len(), 3);
        assert_eq!(headings[1], headings[2]);
        assert!((headings[0] - 0.0).abs() < 1e-9);
        assert!((headings[1] - 90.0).abs() < 1e-9);
    }

    #[test]
    fn duplicate_points_are_skipped_in_heading_search() {
        let track = Track::new(vec![
            ProjPoint::new(0.0, 0.0),
            ProjPoint::new(0.0, 5.0),
            ProjPoint::new(0.0, 5.0),
            ProjPoint::new(5.0, 5.0),
        ]);
        // Heading into the duplicate falls back to the nearest differing
        // predecessor and stays finite.
        assert!(track.headings().iter().all(|h| h.is_finite()));
    }

    #[test]
    fn zero_lag_is_identity() {
        let mut track = north_track(8, 2.5);
        let before = track.points().to_vec();
        track.apply_cable_lag(&CableLag::Uniform(0.0));
        assert_eq!(track.points(), &before[..]);
    }

    #[test]
    fn lag_walks_backward_along_track() {
        let mut track = north_track(8, 1.0);
        track.apply_cable_lag(&CableLag::Uniform(2.5));
        // From point 5 the walk passes points 4 (1 m), 3 (2 m), 2 (3 m >= 2.5).
        assert_eq!(track.points()[5], ProjPoint::new(500.0, 102.0));
    }

    #[test]
    fn lag_extrapolates_before_track_start() {
        let mut track = north_track(3, 1.0);
        track.apply_cable_lag(&CableLag::Uniform(5.0));
        let pts = track.points();
        // All three walks exhaust the track; shortfalls 5, 4 and 3 m project
        // due south of the original first point, evenly spaced.
        assert!((pts[0].y - 95.0).abs() < 1e-9);
        assert!((pts[1].y - 96.0).abs() < 1e-9);
        assert!((pts[2].y - 97.0).abs() < 1e-9);
        assert!(pts.iter().all(|p| (p.x - 500.0).abs() < 1e-9));
    }

    #[test]
    fn smoothing_survives_lag_round_trip() {
        let mut track = Track::new(
            (0..40)
                .map(|i| {
                    let t = i as f64;
                    ProjPoint::new(t * 2.0 + (t * 0.7).sin() * 0.3, t * 3.0)
                })
                .collect(),
        );
        track.smooth_headings(11, 2);
        track.apply_cable_lag(&CableLag::Uniform(4.0));
        track.smooth_headings(11, 2);
        assert_eq!(track.headings().len(), track.len());
        assert!(track.headings().iter().all(|h| h.is_finite()));
    }

    #[test]
    fn breakpoint_schedule_lags_only_later_stripes() {
        let mut track = north_track(10, 1.0);
        let before = track.points().to_vec();
        track.apply_cable_lag(&CableLag::Schedule(vec![crate::config::LagBreakpoint {
            from_stripe: 5,
            lag_m: 2.0,
        }]));
        assert_eq!(&track.points()[..5], &before[..5]);
        assert_eq!(track.points()[5], before[3]);
    }
}
