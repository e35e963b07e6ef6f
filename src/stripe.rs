//! Stripe segmentation: group consecutive pings sharing one navigation fix
//! into physical image blocks.
//!
//! A run closes when the projected fix changes; its stripe takes the rows of
//! the run's pings (earliest ping as the top row), the shared fix as origin,
//! the run-start swath width, and the planar distance from the run-start fix
//! to the fix that closed the run as height. Trailing pings that never see a
//! further fix change are dropped.

use log::debug;

use crate::angle::planar_distance;
use crate::error::PipelineError;
use crate::image::GrayU8;
use crate::ping::PingStore;
use crate::types::ProjPoint;

/// A run of pings sharing one navigation fix, as one image block of known
/// physical size.
#[derive(Clone, Debug)]
pub struct Stripe {
    /// Stacked rows of the run, earliest ping on top.
    pub image: GrayU8,
    /// Projected fix shared by the run.
    pub origin: ProjPoint,
    /// Combined slant range of both channels at the run start, meters.
    pub width_m: f64,
    /// Planar distance covered by the run, meters.
    pub height_m: f64,
}

/// Split the ping sequence into stripes. `stacked` is the file's stacked
/// waterfall image (row 0 = latest ping) the stripe rows are taken from.
///
/// Heights are always computed in the projected coordinate system; the
/// geographic track never enters the distance.
pub fn segment_stripes(store: &PingStore, stacked: &GrayU8) -> Result<Vec<Stripe>, PipelineError> {
    let n = store.len();
    if n < 2 {
        return Err(PipelineError::TooFewPings {
            found: n,
            minimum: 2,
        });
    }
    debug_assert_eq!(stacked.h, n);

    let fix_of = |index: usize| -> Result<ProjPoint, PipelineError> {
        store
            .ping(index)
            .projected()
            .ok_or_else(|| PipelineError::DegenerateGeometry {
                detail: format!("ping {index} has no projected position"),
            })
    };

    let mut stripes = Vec::new();
    let mut run_start = 0usize;
    let mut prev_fix = fix_of(0)?;

    for ping_no in 1..n {
        let fix = fix_of(ping_no)?;
        if fix != prev_fix {
            stripes.push(build_stripe(store, stacked, run_start, ping_no, prev_fix, fix));
            run_start = ping_no;
            prev_fix = fix;
        }
    }

    debug!(
        "segmented {} stripes from {n} pings ({} trailing pings dropped)",
        stripes.len(),
        n - run_start
    );
    Ok(stripes)
}

fn build_stripe(
    store: &PingStore,
    stacked: &GrayU8,
    run_start: usize,
    run_end: usize,
    origin: ProjPoint,
    closing_fix: ProjPoint,
) -> Stripe {
    let n = store.len();
    let rows = run_end - run_start;
    let w = stacked.w;
    let mut image = GrayU8::new(w, rows);
    for j in 0..rows {
        // Waterfall row of ping (run_start + j); earliest ping lands on top.
        let src = stacked.row(n - 1 - (run_start + j));
        image.data[j * w..(j + 1) * w].copy_from_slice(src);
    }

    Stripe {
        image,
        origin,
        width_m: store.ping(run_start).swath_width_m(),
        height_m: planar_distance(origin.as_tuple(), closing_fix.as_tuple()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ping::{Ping, PingTime};
    use crate::types::GeoPoint;

    fn store_with_fixes(fixes: &[(f64, f64)]) -> (PingStore, GrayU8) {
        let pings: Vec<Ping> = fixes
            .iter()
            .enumerate()
            .map(|(i, _)| {
                Ping::new(
                    i,
                    PingTime {
                        second: i as u32,
                        ..Default::default()
                    },
                    GeoPoint {
                        lon: 30.0,
                        lat: 60.0,
                    },
                    vec![0.5; 4],
                    vec![0.5; 4],
                    5.0,
                )
                .expect("valid ping")
            })
            .collect();
        let mut store = PingStore::new(pings);
        let points: Vec<ProjPoint> = fixes.iter().map(|&(x, y)| ProjPoint::new(x, y)).collect();
        store.assign_projected_positions(&points).expect("assign");
        let stacked = store.stacked_image(1.0);
        (store, stacked)
    }

    #[test]
    fn four_then_three_pings_two_fixes_yield_one_stripe() {
        let a = (1000.0, 2000.0);
        let b = (1000.0, 2010.0); // 10 m north
        let (store, stacked) = store_with_fixes(&[a, a, a, a, b, b, b]);
        let stripes = segment_stripes(&store, &stacked).expect("segment");
        assert_eq!(stripes.len(), 1);
        let stripe = &stripes[0];
        assert_eq!(stripe.image.h, 4);
        assert!((stripe.height_m - 10.0).abs() < 1e-9);
        assert!((stripe.width_m - 10.0).abs() < 1e-9);
        assert_eq!(stripe.origin, ProjPoint::new(1000.0, 2000.0));
    }

    #[test]
    fn deduplicated_fixes_yield_single_ping_stripes() {
        let fixes: Vec<(f64, f64)> = (0..6).map(|i| (i as f64 * 3.0, 0.0)).collect();
        let (store, stacked) = store_with_fixes(&fixes);
        let stripes = segment_stripes(&store, &stacked).expect("segment");
        assert_eq!(stripes.len(), fixes.len() - 1);
        for (i, stripe) in stripes.iter().enumerate() {
            assert_eq!(stripe.image.h, 1, "stripe {i} must hold exactly one ping");
            assert_eq!(stripe.origin, ProjPoint::new(i as f64 * 3.0, 0.0));
            assert!((stripe.height_m - 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn duplicate_adjacent_fixes_merge_into_next_run() {
        let a = (0.0, 0.0);
        let b = (0.0, 4.0);
        let c = (0.0, 9.0);
        let (store, stacked) = store_with_fixes(&[a, a, b, b, b, c]);
        let stripes = segment_stripes(&store, &stacked).expect("segment");
        assert_eq!(stripes.len(), 2);
        assert!((stripes[0].height_m - 4.0).abs() < 1e-9);
        assert_eq!(stripes[0].image.h, 2);
        assert!((stripes[1].height_m - 5.0).abs() < 1e-9);
        assert_eq!(stripes[1].image.h, 3);
        assert!(stripes.iter().all(|s| s.height_m > 0.0));
    }

    #[test]
    fn trailing_run_without_confirmation_is_dropped() {
        let a = (0.0, 0.0);
        let b = (5.0, 0.0);
        let (store, stacked) = store_with_fixes(&[a, b, b, b]);
        let stripes = segment_stripes(&store, &stacked).expect("segment");
        // Only the [a] run closes; the b-run never sees another change.
        assert_eq!(stripes.len(), 1);
        assert_eq!(stripes[0].origin, ProjPoint::new(0.0, 0.0));
    }

    #[test]
    fn unassigned_projection_is_rejected() {
        let pings = vec![
            Ping::new(
                0,
                PingTime::default(),
                GeoPoint { lon: 0.0, lat: 0.0 },
                vec![0.0; 2],
                vec![0.0; 2],
                1.0,
            )
            .unwrap(),
            Ping::new(
                1,
                PingTime::default(),
                GeoPoint { lon: 0.0, lat: 0.0 },
                vec![0.0; 2],
                vec![0.0; 2],
                1.0,
            )
            .unwrap(),
        ];
        let store = PingStore::new(pings);
        let stacked = store.stacked_image(1.0);
        assert!(matches!(
            segment_stripes(&store, &stacked),
            Err(PipelineError::DegenerateGeometry { .. })
        ));
    }
}
