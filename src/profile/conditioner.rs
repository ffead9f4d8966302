//! Fixed-order conditioning of one deposition profile.
//!
//! Stages, each consuming the previous stage's output:
//!
//! 1. horizontal trim with floating-baseline removal,
//! 2. rebase (optional): drop trimmed samples and stretch the interior back
//!    over the original span,
//! 3. vertical trim (value floor),
//! 4. centering (optional): centroid or center-of-distribution,
//! 5. Savitzky–Golay smoothing (optional).
//!
//! Raw samples are never modified; every call derives a fresh curve.

use super::interp::mean_spacing;
use super::savgol::{savgol_filter, window_samples};
use super::types::{CenterMethod, ProfileParams, Sample, ShiftMode};
use crate::error::{DepositionError, Result};
use log::debug;
use std::ops::RangeInclusive;

/// Output of the horizontal trim stage.
#[derive(Clone, Debug, PartialEq)]
pub struct TrimmedProfile {
    pub samples: Vec<Sample>,
    /// Indices of the samples kept by the trim.
    pub interior: RangeInclusive<usize>,
}

/// Run every enabled stage in order.
pub fn condition(raw: &[Sample], params: &ProfileParams) -> Result<Vec<Sample>> {
    let trimmed = trim_horizontal(raw, params.trim_left, params.trim_right)?;
    let mut samples = if params.rebase {
        rebase(raw, &trimmed)?
    } else {
        trimmed.samples
    };
    trim_vertical(&mut samples, params.trim_vertical);
    if params.center {
        if let Some(offset) = center_offset(&samples, params.center_method, params.shift_mode) {
            shift_locations(&mut samples, offset);
        }
    }
    if params.smooth {
        smooth(&mut samples, params.smooth_window, params.smooth_order);
    }
    Ok(samples)
}

/// Subtract the interior minimum from every sample, zero the excluded ends and
/// clip at zero.
pub fn trim_horizontal(
    raw: &[Sample],
    trim_left: usize,
    trim_right: usize,
) -> Result<TrimmedProfile> {
    let length = raw.len();
    if trim_left + trim_right >= length {
        return Err(DepositionError::EmptyInterior {
            length,
            trim_left,
            trim_right,
        });
    }
    let interior = trim_left..=(length - 1 - trim_right);
    let floor = raw[interior.clone()]
        .iter()
        .map(|s| s.value)
        .fold(f64::INFINITY, f64::min);
    let samples = raw
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let value = if interior.contains(&i) {
                (s.value - floor).max(0.0)
            } else {
                0.0
            };
            Sample::new(s.location, value)
        })
        .collect();
    Ok(TrimmedProfile { samples, interior })
}

/// Keep only the interior and rescale its locations so it spans the original
/// (untrimmed) extent.
pub fn rebase(raw: &[Sample], trimmed: &TrimmedProfile) -> Result<Vec<Sample>> {
    let (lo, hi) = (*trimmed.interior.start(), *trimmed.interior.end());
    let full_start = raw[0].location;
    let full_span = raw[raw.len() - 1].location - full_start;
    let interior_start = trimmed.samples[lo].location;
    let span = trimmed.samples[hi].location - interior_start;
    if span <= 0.0 {
        return Err(DepositionError::DegenerateTrim { span });
    }
    let ratio = full_span / span;
    Ok(trimmed.samples[lo..=hi]
        .iter()
        .map(|s| Sample::new(full_start + (s.location - interior_start) * ratio, s.value))
        .collect())
}

/// Subtract a value floor and clip at zero.
pub fn trim_vertical(samples: &mut [Sample], floor: f64) {
    if floor == 0.0 {
        return;
    }
    for s in samples.iter_mut() {
        s.value = (s.value - floor).max(0.0);
    }
}

/// Intensity-weighted mean location `Σ(v·x) / Σv`.
pub fn centroid(samples: &[Sample]) -> Option<f64> {
    let (num, den) = samples.iter().fold((0.0, 0.0), |(n, d), s| {
        (n + s.value * s.location, d + s.value)
    });
    (den != 0.0).then(|| num / den)
}

/// Trapezoid-weighted centre: for each adjacent pair `(D, X), (Dn, Xn)`
/// accumulate `D·(Xn+X) + (Dn−D)·(2·Xn+X)/3` over `Dn+D`.
pub fn center_of_distribution(samples: &[Sample]) -> Option<f64> {
    let (num, den) = samples.windows(2).fold((0.0, 0.0), |(n, d), w| {
        let (dv, x) = (w[0].value, w[0].location);
        let (dn, xn) = (w[1].value, w[1].location);
        (
            n + dv * (xn + x) + (dn - dv) * (2.0 * xn + x) / 3.0,
            d + dn + dv,
        )
    });
    (den != 0.0).then(|| num / den)
}

/// Location offset that centres the curve, or `None` when no centering applies.
pub fn center_offset(samples: &[Sample], method: CenterMethod, mode: ShiftMode) -> Option<f64> {
    let c = match method {
        CenterMethod::Centroid => centroid(samples)?,
        CenterMethod::CenterOfDistribution => center_of_distribution(samples)?,
        CenterMethod::None => return None,
    };
    match mode {
        ShiftMode::Continuous => Some(c),
        ShiftMode::Snapped => {
            let dx = mean_spacing(samples)?;
            (dx > 0.0).then(|| (c / dx).round() * dx)
        }
    }
}

/// Move the location axis by `-offset`; values are untouched.
pub fn shift_locations(samples: &mut [Sample], offset: f64) {
    for s in samples.iter_mut() {
        s.location -= offset;
    }
}

/// Savitzky–Golay smoothing with a window given in location units; clipped at zero.
pub fn smooth(samples: &mut [Sample], window: f64, order: usize) {
    let window_len = window_samples(samples, window);
    let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
    match savgol_filter(&values, window_len, order) {
        Some(filtered) => {
            for (s, v) in samples.iter_mut().zip(filtered) {
                s.value = v.max(0.0);
            }
        }
        None => debug!("smoothing skipped for {} samples", samples.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(values: &[f64]) -> Vec<Sample> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Sample::new(i as f64, v))
            .collect()
    }

    fn values(samples: &[Sample]) -> Vec<f64> {
        samples.iter().map(|s| s.value).collect()
    }

    #[test]
    fn untrimmed_profile_only_loses_its_minimum() {
        let raw = curve(&[5.0, 7.0, 12.0, 9.0, 6.0]);
        let out = trim_horizontal(&raw, 0, 0).unwrap();
        assert_eq!(values(&out.samples), vec![0.0, 2.0, 7.0, 4.0, 1.0]);
        assert_eq!(out.interior, 0..=4);
    }

    #[test]
    fn trimmed_ends_read_zero_and_floor_comes_from_interior() {
        let raw = curve(&[1.0, 8.0, 6.0, 10.0, 7.0, 2.0]);
        let out = trim_horizontal(&raw, 1, 1).unwrap();
        // interior min is 6
        assert_eq!(values(&out.samples), vec![0.0, 2.0, 0.0, 4.0, 1.0, 0.0]);
        // excluded samples above the floor still read zero
        let raw = curve(&[20.0, 8.0, 6.0, 10.0]);
        let out = trim_horizontal(&raw, 1, 0).unwrap();
        assert_eq!(values(&out.samples), vec![0.0, 2.0, 0.0, 4.0]);
    }

    #[test]
    fn empty_interior_is_reported() {
        let raw = curve(&[1.0, 2.0, 3.0, 4.0]);
        let err = trim_horizontal(&raw, 2, 2).unwrap_err();
        assert!(matches!(
            err,
            DepositionError::EmptyInterior {
                length: 4,
                trim_left: 2,
                trim_right: 2
            }
        ));
        assert!(trim_horizontal(&[], 0, 0).is_err());
    }

    #[test]
    fn rebase_stretches_interior_over_original_span() {
        let raw = curve(&[0.0, 1.0, 3.0, 2.0, 0.0]);
        let trimmed = trim_horizontal(&raw, 1, 1).unwrap();
        let out = rebase(&raw, &trimmed).unwrap();
        let locs: Vec<f64> = out.iter().map(|s| s.location).collect();
        assert_eq!(locs, vec![0.0, 2.0, 4.0]);
        assert_eq!(values(&out), vec![0.0, 2.0, 1.0]);
    }

    #[test]
    fn rebase_of_single_sample_interior_is_degenerate() {
        let raw = curve(&[0.0, 1.0, 0.0]);
        let trimmed = trim_horizontal(&raw, 1, 1).unwrap();
        let err = rebase(&raw, &trimmed).unwrap_err();
        assert!(matches!(err, DepositionError::DegenerateTrim { .. }));
    }

    #[test]
    fn vertical_trim_clips() {
        let mut s = curve(&[0.0, 3.0, 10.0]);
        trim_vertical(&mut s, 4.0);
        assert_eq!(values(&s), vec![0.0, 0.0, 6.0]);
    }

    #[test]
    fn symmetric_curve_centres_on_its_peak() {
        let s: Vec<Sample> = [0.0, 1.0, 4.0, 1.0, 0.0]
            .iter()
            .enumerate()
            .map(|(i, &v)| Sample::new(10.0 + i as f64, v))
            .collect();
        assert!((centroid(&s).unwrap() - 12.0).abs() < 1e-12);
        assert!((center_of_distribution(&s).unwrap() - 12.0).abs() < 1e-12);
    }

    #[test]
    fn center_of_distribution_matches_trapezoid_centroid() {
        // a right triangle 0 -> 6 over [0, 3]: area centroid at x = 2
        let s: Vec<Sample> = (0..=3).map(|i| Sample::new(i as f64, 2.0 * i as f64)).collect();
        assert!((center_of_distribution(&s).unwrap() - 2.0).abs() < 1e-12);
        // the plain centroid is pulled further right
        let c = centroid(&s).unwrap();
        assert!((c - 14.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn snapped_shift_rounds_to_spacing() {
        let s: Vec<Sample> = [0.0, 0.0, 2.0, 3.0, 0.0]
            .iter()
            .enumerate()
            .map(|(i, &v)| Sample::new(i as f64 * 2.0, v))
            .collect();
        let continuous = center_offset(&s, CenterMethod::Centroid, ShiftMode::Continuous).unwrap();
        let snapped = center_offset(&s, CenterMethod::Centroid, ShiftMode::Snapped).unwrap();
        assert!((continuous - 5.2).abs() < 1e-12);
        assert_eq!(snapped, 6.0);
        assert_eq!(center_offset(&s, CenterMethod::None, ShiftMode::Continuous), None);
    }

    #[test]
    fn zero_curve_is_not_centred() {
        let s = curve(&[0.0, 0.0, 0.0]);
        assert_eq!(centroid(&s), None);
        assert_eq!(center_of_distribution(&s), None);
    }

    #[test]
    fn full_pipeline_keeps_raw_untouched() {
        let raw = curve(&[2.0, 3.0, 8.0, 12.0, 8.0, 3.0, 2.0]);
        let params = ProfileParams {
            trim_vertical: 1.0,
            center: true,
            center_method: CenterMethod::Centroid,
            ..ProfileParams::default()
        };
        let out = condition(&raw, &params).unwrap();
        assert_eq!(raw[3].value, 12.0);
        assert_eq!(values(&out), vec![0.0, 0.0, 5.0, 9.0, 5.0, 0.0, 0.0]);
        assert!((out[3].location).abs() < 1e-12, "peak should sit at zero");
    }

    #[test]
    fn smoothing_window_comes_from_distance_and_clips_at_zero() {
        let raw = curve(&[0.0, 0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 0.0]);
        let params = ProfileParams {
            smooth: true,
            smooth_window: 4.0,
            smooth_order: 2,
            ..ProfileParams::passthrough()
        };
        let out = condition(&raw, &params).unwrap();

        // 4 units at unit spacing -> 5-sample window
        assert_eq!(window_samples(&raw, 4.0), 5);
        let filtered = savgol_filter(&values(&raw), 5, 2).unwrap();
        assert!(filtered[2] < 0.0, "quadratic fit overshoots: {filtered:?}");

        assert!(out.iter().all(|s| s.value >= 0.0), "out: {out:?}");
        assert_eq!(out[2].value, 0.0);
        assert!((out[4].value - 170.0 / 35.0).abs() < 1e-9, "peak {}", out[4].value);
        assert!((out[3].value - 120.0 / 35.0).abs() < 1e-9);
        let clipped: Vec<f64> = filtered.iter().map(|v| v.max(0.0)).collect();
        assert_eq!(values(&out), clipped);
    }
}
