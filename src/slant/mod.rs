//! Slant-range correction: remove the geometric distortion of oblique
//! sampling by remapping each ping onto true horizontal ground range.
//!
//! Per ping the corrector estimates the first bottom reflection on the
//! starboard (reference) channel, derives the local sensor height from it,
//! and resamples both channels onto a uniform ground-range grid. Pings where
//! estimation fails inherit the previous ping's estimate; pings whose
//! corrected tail is too short are left untouched.

mod bottom;

use log::{debug, warn};

use crate::config::SlantConfig;
use crate::ping::{Ping, PingStore};

/// Corrected tails shorter than this are considered degenerate and the ping
/// is left unmodified.
const MIN_CORRECTED_SAMPLES: usize = 100;

/// Per-file slant-range correction pass.
pub struct SlantCorrector {
    search_start_m: f64,
    search_window: usize,
    reflection_bias: i32,
}

impl SlantCorrector {
    pub fn new(cfg: &SlantConfig) -> Self {
        Self {
            search_start_m: cfg.search_start_m,
            search_window: cfg.search_window,
            reflection_bias: cfg.reflection_bias,
        }
    }

    /// Correct every ping in the store in place. Returns the number of
    /// pings that were actually resampled.
    pub fn correct_store(&self, store: &mut PingStore) -> usize {
        let mut corrected = 0;
        let mut last_reflection: Option<usize> = None;
        for index in 0..store.len() {
            if self.correct_ping(store.ping_mut(index), &mut last_reflection) {
                corrected += 1;
            }
        }
        debug!("slant-range corrected {corrected}/{} pings", store.len());
        corrected
    }

    fn correct_ping(&self, ping: &mut Ping, last_reflection: &mut Option<usize>) -> bool {
        let samples = ping.samples();
        let slant_range = ping.slant_ranges()[1];
        if samples == 0 || slant_range <= 0.0 {
            return false;
        }

        let search_start = (self.search_start_m * samples as f64 / slant_range) as usize;
        let reflection = match bottom::first_reflection(
            ping.starboard(),
            search_start,
            self.search_window,
            self.reflection_bias,
        ) {
            Some(r) => {
                *last_reflection = Some(r);
                r
            }
            None => match *last_reflection {
                Some(r) => {
                    debug!(
                        "ping {}: bottom estimation failed, reusing index {r}",
                        ping.index()
                    );
                    r.min(samples - 1)
                }
                None => {
                    warn!(
                        "ping {}: bottom estimation failed with no previous estimate",
                        ping.index()
                    );
                    return false;
                }
            },
        };

        let tail = samples - reflection;
        if tail < MIN_CORRECTED_SAMPLES {
            debug!(
                "ping {}: only {tail} corrected samples, skipping correction",
                ping.index()
            );
            return false;
        }

        // Sensor height from the reflection index; ground range for every
        // sample past it. L(reflection) == height, so the grid starts at 0.
        let height = slant_range * reflection as f64 / samples as f64;
        let ground: Vec<f64> = (reflection..samples)
            .map(|i| {
                let slant = i as f64 * slant_range / samples as f64;
                (slant * slant - height * height).max(0.0).sqrt()
            })
            .collect();
        let max_range = *ground.last().expect("non-empty tail");
        if max_range <= 0.0 {
            return false;
        }

        let starboard = resample_tail(ping.starboard(), reflection, &ground, max_range);

        // The port channel is stored far-to-near; flip it for the remap and
        // flip the result back.
        let port_flipped: Vec<f32> = ping.port().iter().rev().copied().collect();
        let mut port = resample_tail(&port_flipped, reflection, &ground, max_range);
        port.reverse();

        ping.set_ground_samples(port, starboard, max_range)
            .expect("resampled channels share one length");
        true
    }
}

/// Resample `channel[reflection..]` onto a uniform grid of `ground.len()`
/// points spanning `[0, max_range]`, interpolating linearly against the
/// monotonic corrected-range values.
fn resample_tail(channel: &[f32], reflection: usize, ground: &[f64], max_range: f64) -> Vec<f32> {
    let values = &channel[reflection..];
    let n = ground.len();
    let step = max_range / (n - 1) as f64;
    (0..n)
        .map(|k| interp_linear(ground, values, k as f64 * step))
        .collect()
}

/// Linear interpolation of `ys` over strictly ordered `xs`; clamps outside
/// the domain to the boundary values.
fn interp_linear(xs: &[f64], ys: &[f32], x: f64) -> f32 {
    debug_assert_eq!(xs.len(), ys.len());
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[xs.len() - 1] {
        return ys[ys.len() - 1];
    }
    let hi = xs.partition_point(|&v| v < x).max(1);
    let lo = hi - 1;
    let span = xs[hi] - xs[lo];
    if span <= 0.0 {
        return ys[lo];
    }
    let t = ((x - xs[lo]) / span) as f32;
    ys[lo] * (1.0 - t) + ys[hi] * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ping::PingTime;
    use crate::types::GeoPoint;

    fn step_ping(samples: usize, edge: usize, slant_range: f64) -> Ping {
        let starboard: Vec<f32> = (0..samples)
            .map(|i| if i < edge { 0.0 } else { 1.0 })
            .collect();
        let port: Vec<f32> = starboard.iter().rev().copied().collect();
        Ping::new(
            0,
            PingTime::default(),
            GeoPoint {
                lon: 30.0,
                lat: 60.0,
            },
            port,
            starboard,
            slant_range,
        )
        .expect("valid ping")
    }

    fn corrector() -> SlantCorrector {
        SlantCorrector::new(&SlantConfig {
            enabled: true,
            search_start_m: 0.0,
            search_window: 11,
            reflection_bias: 0,
        })
    }

    #[test]
    fn correction_resamples_past_reflection() {
        let mut ping = step_ping(300, 100, 30.0);
        let mut last = None;
        assert!(corrector().correct_ping(&mut ping, &mut last));
        assert_eq!(ping.samples(), 200);
        assert_eq!(last, Some(100));
        // New slant range is the maximum corrected ground range:
        // sqrt(L(299)^2 - H^2) with H = 10 m.
        let expected = (29.9f64 * 29.9 - 10.0 * 10.0).sqrt();
        assert!((ping.slant_ranges()[1] - expected).abs() < 1e-9);
    }

    #[test]
    fn short_tail_leaves_ping_unmodified() {
        let mut ping = step_ping(150, 100, 30.0);
        let before = ping.starboard().to_vec();
        let mut last = None;
        assert!(!corrector().correct_ping(&mut ping, &mut last));
        assert_eq!(ping.samples(), 150);
        assert_eq!(ping.starboard(), &before[..]);
        assert_eq!(ping.slant_ranges(), [30.0, 30.0]);
    }

    #[test]
    fn estimation_failure_reuses_previous_estimate() {
        let mut good = step_ping(300, 100, 30.0);
        // Too short for the kernel once the search offset applies.
        let mut bad = step_ping(300, 100, 30.0);
        let corrector = SlantCorrector::new(&SlantConfig {
            enabled: true,
            search_start_m: 0.0,
            search_window: 11,
            reflection_bias: 0,
        });
        let mut last = None;
        assert!(corrector.correct_ping(&mut good, &mut last));
        let remembered = last;
        // A ping with an empty-ish tail still corrects via the remembered index.
        let far_start = SlantCorrector {
            search_start_m: 29.9,
            search_window: 11,
            reflection_bias: 0,
        };
        assert!(far_start.correct_ping(&mut bad, &mut last));
        assert_eq!(last, remembered);
    }

    #[test]
    fn interp_linear_clamps_and_interpolates() {
        let xs = [0.0, 1.0, 3.0];
        let ys = [0.0, 10.0, 30.0];
        assert_eq!(interp_linear(&xs, &ys, -1.0), 0.0);
        assert_eq!(interp_linear(&xs, &ys, 4.0), 30.0);
        assert!((interp_linear(&xs, &ys, 2.0) - 20.0).abs() < 1e-6);
    }

    #[test]
    fn ground_range_is_zero_at_reflection() {
        // L(r) == H exactly, so the first corrected sample sits at range 0.
        let samples = 300usize;
        let reflection = 100usize;
        let slant_range = 30.0f64;
        let height = slant_range * reflection as f64 / samples as f64;
        let l_r = reflection as f64 * slant_range / samples as f64;
        assert!((l_r - height).abs() < 1e-12);
    }
}
