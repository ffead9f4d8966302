//! Savitzky–Golay smoothing with polynomial edge fits.
//!
//! Interior samples use the centred least-squares convolution weights; the
//! first and last half-windows are taken from the polynomial fitted to the
//! first and last full windows.

use super::types::Sample;
use log::debug;
use nalgebra::DMatrix;

/// Odd sample count closest to `window` location units, measured from the
/// first sample.
pub fn window_samples(curve: &[Sample], window: f64) -> usize {
    let Some(first) = curve.first() else {
        return 0;
    };
    let target = first.location + window;
    let nearest = curve
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (a.location - target)
                .abs()
                .total_cmp(&(b.location - target).abs())
        })
        .map(|(i, _)| i)
        .unwrap_or(0);
    if nearest % 2 == 0 {
        nearest + 1
    } else {
        nearest
    }
}

/// Least-squares projection matrix `A·A⁺` for a window of `window` samples and
/// a polynomial of degree `order`. Row `i` holds the weights producing the
/// fitted value at window position `i`.
fn projection(window: usize, order: usize) -> Option<DMatrix<f64>> {
    let half = (window / 2) as f64;
    let a = DMatrix::from_fn(window, order + 1, |i, j| (i as f64 - half).powi(j as i32));
    let pinv = a.clone().pseudo_inverse(1e-12).ok()?;
    Some(a * pinv)
}

/// Smooth `values` with an odd `window` and polynomial `order`.
///
/// Returns `None` when the filter is not applicable (window too short for the
/// order, or longer than the data after clamping).
pub fn savgol_filter(values: &[f64], window: usize, order: usize) -> Option<Vec<f64>> {
    let n = values.len();
    let mut window = window.min(n);
    if window % 2 == 0 {
        window = window.saturating_sub(1);
    }
    if window < 3 || window <= order {
        debug!("savgol skipped: window {window} too short for order {order} ({n} samples)");
        return None;
    }
    let proj = projection(window, order)?;
    let half = window / 2;
    let apply = |row: usize, start: usize| -> f64 {
        (0..window)
            .map(|k| proj[(row, k)] * values[start + k])
            .sum()
    };

    let mut out = vec![0.0; n];
    for (i, dst) in out.iter_mut().enumerate() {
        *dst = if i < half {
            apply(i, 0)
        } else if i + half >= n {
            apply(window - (n - i), n - window)
        } else {
            apply(half, i - half)
        };
    }
    Some(out)
}
