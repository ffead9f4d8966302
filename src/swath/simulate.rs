//! Overlapping-pass simulation and the coefficient of variation (CV) inside
//! one swath.
//!
//! A simulation lays `2·n + 1` copies of the averaged profile side by side:
//! the centre pass plus `n` adjacent passes to each side, shifted by whole
//! multiples of the swath width. Every copy is interpolated onto the union of
//! all copies' locations (zero outside its own extent) and the copies are
//! summed.

use crate::error::{DepositionError, Result};
use crate::profile::interp::{interp_or_zero, union_axis};
use crate::profile::Sample;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlightMode {
    /// Every pass flown in the same direction.
    #[default]
    Racetrack,
    /// Alternating headings; alternate passes deposit a mirrored footprint.
    BackAndForth,
}

/// Whether adjacent pass `k` (1-based distance from the centre pass) lays
/// down a mirrored copy of the profile.
///
/// Back-and-forth mirrors every odd `k`: the passes immediately beside the
/// centre pass fly the opposite heading, the next ones the same heading.
#[inline]
pub fn pass_is_mirrored(mode: FlightMode, k: usize) -> bool {
    matches!(mode, FlightMode::BackAndForth) && k % 2 == 1
}

/// Summed deposition of one simulated set of passes.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwathSimulation {
    pub swath_width: f64,
    pub mode: FlightMode,
    pub adjacent_passes: usize,
    pub samples: Vec<Sample>,
    /// CV (%) inside `[−swath_width/2, +swath_width/2]`.
    pub cv: Option<f64>,
}

/// Reflect `profile` about its flight line (location 0); locations stay
/// increasing.
pub fn mirrored(profile: &[Sample]) -> Vec<Sample> {
    profile
        .iter()
        .rev()
        .map(|s| Sample::new(-s.location, s.value))
        .collect()
}

fn shifted(profile: &[Sample], offset: f64) -> Vec<Sample> {
    profile
        .iter()
        .map(|s| Sample::new(s.location + offset, s.value))
        .collect()
}

fn check_width(swath_width: f64) -> Result<()> {
    if swath_width.is_finite() && swath_width > 0.0 {
        Ok(())
    } else {
        Err(DepositionError::configuration(format!(
            "swath width must be positive, got {swath_width}"
        )))
    }
}

/// Shift-and-sum the profile for `adjacent_passes` passes on either side.
pub fn simulate(
    profile: &[Sample],
    swath_width: f64,
    adjacent_passes: usize,
    mode: FlightMode,
) -> Result<SwathSimulation> {
    if profile.is_empty() {
        return Err(DepositionError::insufficient("no averaged profile to simulate"));
    }
    check_width(swath_width)?;

    let reversed = mirrored(profile);
    let mut copies: Vec<Vec<Sample>> = Vec::with_capacity(2 * adjacent_passes + 1);
    copies.push(profile.to_vec());
    for k in 1..=adjacent_passes {
        let base = if pass_is_mirrored(mode, k) {
            &reversed
        } else {
            profile
        };
        let offset = k as f64 * swath_width;
        copies.push(shifted(base, -offset));
        copies.push(shifted(base, offset));
    }

    let axis = union_axis(copies.iter().map(Vec::as_slice));
    let samples: Vec<Sample> = axis
        .into_iter()
        .map(|x| {
            let total = copies.iter().map(|c| interp_or_zero(c, x)).sum();
            Sample::new(x, total)
        })
        .collect();
    let cv = cv_within_swath(&samples, swath_width);
    Ok(SwathSimulation {
        swath_width,
        mode,
        adjacent_passes,
        samples,
        cv,
    })
}

/// Population CV (%) of the samples inside `[−width/2, +width/2]`.
///
/// `None` when the window holds no samples or its mean is zero.
pub fn cv_within_swath(samples: &[Sample], width: f64) -> Option<f64> {
    let half = 0.5 * width;
    let window: Vec<f64> = samples
        .iter()
        .filter(|s| s.location.abs() <= half)
        .map(|s| s.value)
        .collect();
    if window.is_empty() {
        return None;
    }
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return None;
    }
    let var = window.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    Some(var.sqrt() / mean * 100.0)
}

/// Single swath-width point query; `None` wherever a simulation cannot run.
pub fn simulated_cv(
    profile: &[Sample],
    swath_width: f64,
    adjacent_passes: usize,
    mode: FlightMode,
) -> Option<f64> {
    simulate(profile, swath_width, adjacent_passes, mode)
        .ok()
        .and_then(|sim| sim.cv)
}
