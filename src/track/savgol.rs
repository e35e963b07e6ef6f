//! Centered Savitzky–Golay polynomial smoothing.
//!
//! Interior samples are smoothed with the centered least-squares window;
//! the first and last half-windows are filled by fitting one polynomial to
//! the leading/trailing window and evaluating it at each border position.

use log::debug;
use nalgebra::{DMatrix, DVector};

/// Smooth `data` with an odd `window` and polynomial `order`
/// (`order + 2 <= window`). Inputs shorter than the window are returned
/// unchanged.
pub fn savgol_smooth(data: &[f64], window: usize, order: usize) -> Vec<f64> {
    let n = data.len();
    if window % 2 == 0 || order + 2 > window || n < window {
        debug!(
            "savgol: window {window} order {order} unusable for {n} samples, leaving data as-is"
        );
        return data.to_vec();
    }

    // Weight rows: evaluating the window's least-squares polynomial at
    // every in-window position.
    let weights = evaluation_weights(window, order);
    let half = window / 2;

    let mut out = vec![0.0; n];
    for (i, slot) in out.iter_mut().enumerate() {
        let (start, eval) = if i < half {
            (0, i)
        } else if i + half >= n {
            (n - window, i - (n - window))
        } else {
            (i - half, half)
        };
        let mut acc = 0.0;
        for (j, &w) in weights.row(eval).iter().enumerate() {
            acc += w * data[start + j];
        }
        *slot = acc;
    }
    out
}

/// `window × window` matrix whose row `e` holds the convolution weights
/// that evaluate the window's fitted polynomial at position `e`.
fn evaluation_weights(window: usize, order: usize) -> DMatrix<f64> {
    let cols = order + 1;
    let design = DMatrix::from_fn(window, cols, |i, k| (i as f64).powi(k as i32));
    let normal = design.transpose() * &design;
    let pinv = normal
        .try_inverse()
        .expect("Vandermonde normal matrix is invertible for order < window")
        * design.transpose();

    let mut weights = DMatrix::zeros(window, window);
    for e in 0..window {
        let basis = DVector::from_fn(cols, |k, _| (e as f64).powi(k as i32));
        let row = basis.transpose() * &pinv;
        weights.row_mut(e).copy_from(&row);
    }
    weights
}
