//! Piecewise-linear helpers over location-sorted sample curves.

use super::types::Sample;

/// Relative tolerance used when merging nearly identical locations.
const AXIS_EPS: f64 = 1e-9;

/// Linear interpolation at `x`; `None` outside the curve's own extent.
pub fn interp(curve: &[Sample], x: f64) -> Option<f64> {
    let first = curve.first()?;
    let last = curve.last()?;
    if x < first.location || x > last.location {
        return None;
    }
    let hi = curve.partition_point(|s| s.location < x);
    if hi == 0 {
        return Some(first.value);
    }
    let b = curve[hi];
    if b.location == x {
        return Some(b.value);
    }
    let a = curve[hi - 1];
    let t = (x - a.location) / (b.location - a.location);
    Some(a.value + (b.value - a.value) * t)
}

/// Linear interpolation with zero fill outside the curve's extent.
#[inline]
pub fn interp_or_zero(curve: &[Sample], x: f64) -> f64 {
    interp(curve, x).unwrap_or(0.0)
}

/// Trapezoidal integral of the curve over its own location axis.
pub fn trapezoid(curve: &[Sample]) -> f64 {
    curve
        .windows(2)
        .map(|w| 0.5 * (w[0].value + w[1].value) * (w[1].location - w[0].location))
        .sum()
}

/// Sorted union of all locations, merging values closer than a tiny tolerance.
pub fn union_axis<'a>(curves: impl IntoIterator<Item = &'a [Sample]>) -> Vec<f64> {
    let mut axis: Vec<f64> = curves
        .into_iter()
        .flat_map(|c| c.iter().map(|s| s.location))
        .collect();
    axis.sort_by(|a, b| a.total_cmp(b));
    axis.dedup_by(|b, a| (*b - *a).abs() <= AXIS_EPS * a.abs().max(1.0));
    axis
}

/// Mean spacing between consecutive samples (`None` for fewer than two).
pub fn mean_spacing(curve: &[Sample]) -> Option<f64> {
    match (curve.first(), curve.last()) {
        (Some(a), Some(b)) if curve.len() > 1 => {
            Some((b.location - a.location) / (curve.len() - 1) as f64)
        }
        _ => None,
    }
}
