//! First-bottom-reflection estimation on a single ping.
//!
//! The reference channel is log-compressed, median-filtered to suppress
//! speckle, then convolved with a step kernel; the strongest positive edge
//! response marks the first bottom return.

const MEDIAN_WINDOW: usize = 11;
const LOG_EPSILON: f32 = 1e-6;

/// Median filter with an odd window; the window shrinks at the borders.
pub(crate) fn median_filter(data: &[f32], window: usize) -> Vec<f32> {
    debug_assert!(window % 2 == 1);
    let half = window / 2;
    let n = data.len();
    let mut out = Vec::with_capacity(n);
    let mut scratch = Vec::with_capacity(window);
    for i in 0..n {
        let lo = i.saturating_sub(half);
        let hi = (i + half + 1).min(n);
        scratch.clear();
        scratch.extend_from_slice(&data[lo..hi]);
        scratch.sort_by(|a, b| a.total_cmp(b));
        out.push(scratch[scratch.len() / 2]);
    }
    out
}

/// Valid convolution with an odd step kernel (first half -1, second half +1).
/// `response[i]` corresponds to the kernel centered at input index
/// `i + window / 2`.
pub(crate) fn step_response(data: &[f32], window: usize) -> Vec<f32> {
    debug_assert!(window % 2 == 1);
    if data.len() < window {
        return Vec::new();
    }
    let half = window / 2;
    let n = data.len() - window + 1;
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let mut acc = 0.0f32;
        for (j, &v) in data[i..i + window].iter().enumerate() {
            if j < half {
                acc -= v;
            } else {
                acc += v;
            }
        }
        out.push(acc);
    }
    out
}

/// Estimate the sample index of the first bottom reflection on the
/// reference channel, restricted to indices at or after `search_start`.
/// Returns `None` when the curve is too short to evaluate.
pub(crate) fn first_reflection(
    samples: &[f32],
    search_start: usize,
    window: usize,
    bias: i32,
) -> Option<usize> {
    if search_start >= samples.len() {
        return None;
    }
    let tail = &samples[search_start..];
    if tail.len() < window.max(MEDIAN_WINDOW) {
        return None;
    }

    let log: Vec<f32> = tail.iter().map(|&v| (v + LOG_EPSILON).ln()).collect();
    let filtered = median_filter(&log, MEDIAN_WINDOW);
    let response = step_response(&filtered, window);

    let argmax = response
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)?;

    let detected = (argmax + window / 2 + search_start) as i64 + bias as i64;
    Some(detected.clamp(0, samples.len() as i64 - 1) as usize)
}
