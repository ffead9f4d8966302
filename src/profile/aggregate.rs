//! Cross-profile integral equalization and column-wise averaging.

use super::interp::{interp, trapezoid, union_axis};
use super::types::{DepositionProfile, LengthUnit, Sample};
use crate::error::{DepositionError, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileAggregator {
    /// Scale every profile to the largest trapezoidal integral before averaging.
    pub equalize: bool,
    /// Common location unit; `None` keeps each profile's own unit.
    pub unit: Option<LengthUnit>,
}

impl Default for ProfileAggregator {
    fn default() -> Self {
        Self {
            equalize: true,
            unit: None,
        }
    }
}

impl ProfileAggregator {
    pub fn new(equalize: bool) -> Self {
        Self {
            equalize,
            unit: None,
        }
    }

    /// Convert every conditioned curve to `unit` before averaging.
    pub fn in_unit(mut self, unit: LengthUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Condition the contributing profiles, optionally equalize them and
    /// average the result.
    ///
    /// Only profiles flagged `include_in_composite` and holding samples take
    /// part. A profile whose conditioning fails is left out with a warning;
    /// the average fails only when no profile remains.
    pub fn aggregate(&self, profiles: &[DepositionProfile]) -> Result<Vec<Sample>> {
        let mut curves = Vec::with_capacity(profiles.len());
        for profile in profiles {
            if !profile.include_in_composite || profile.is_empty() {
                debug!("profile '{}' excluded from the average", profile.name);
                continue;
            }
            let unit = self.unit.unwrap_or(profile.unit);
            match profile.conditioned_in(unit) {
                Ok(curve) => curves.push(curve),
                Err(err) => warn!("profile '{}' left out of the average: {err}", profile.name),
            }
        }
        if self.equalize {
            equalize_integrals(&mut curves);
        }
        average_profiles(&curves)
    }
}

/// Scale each curve by `max_area / area` so all share the largest integral.
///
/// Curves with a non-positive integral are left untouched.
pub fn equalize_integrals(curves: &mut [Vec<Sample>]) {
    let areas: Vec<f64> = curves.iter().map(|c| trapezoid(c)).collect();
    let max_area = areas.iter().copied().fold(0.0, f64::max);
    if max_area <= 0.0 {
        return;
    }
    for (curve, &area) in curves.iter_mut().zip(&areas) {
        if area <= 0.0 {
            warn!("profile with zero deposited area left out of integral equalization");
            continue;
        }
        let scale = max_area / area;
        for s in curve.iter_mut() {
            s.value *= scale;
        }
    }
}

/// Mean of the curves on the union of their locations.
///
/// At each location only the curves whose own extent covers it contribute;
/// nothing is extrapolated past a curve's ends.
pub fn average_profiles(curves: &[Vec<Sample>]) -> Result<Vec<Sample>> {
    let curves: Vec<&[Sample]> = curves
        .iter()
        .map(Vec::as_slice)
        .filter(|c| !c.is_empty())
        .collect();
    if curves.is_empty() {
        return Err(DepositionError::insufficient("no profiles to average"));
    }
    let axis = union_axis(curves.iter().copied());
    let averaged = axis
        .into_iter()
        .filter_map(|x| {
            let (sum, n) = curves
                .iter()
                .filter_map(|c| interp(c, x))
                .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
            (n > 0).then(|| Sample::new(x, sum / n as f64))
        })
        .collect();
    Ok(averaged)
}
