//! Volumetric droplet-size statistics and card coverage.
//!
//! Percentile diameters `Dv(f)` are read from the cumulative *volume* fraction
//! of the droplets sorted by diameter, interpolating linearly between the two
//! bracketing entries. Outside the observed range the boundary diameter is
//! returned, never an extrapolated one.

use super::spread::SpreadFactor;
use super::stains::StainSet;
use log::warn;
use serde::Serialize;
use std::f64::consts::PI;

const CM2_PER_IN2: f64 = 6.4516;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropletStatistics {
    /// Stains at or above the minimum area, edge-touching included.
    pub stain_count: usize,
    /// Counted stains that produced a usable droplet diameter.
    pub droplet_count: usize,
    pub dv01: Option<f64>,
    pub dv05: Option<f64>,
    pub dv09: Option<f64>,
    /// `(Dv0.9 − Dv0.1) / Dv0.5`; `None` when `Dv0.5` is zero or missing.
    pub relative_span: Option<f64>,
    /// Count median diameter.
    pub dn05: Option<f64>,
    pub coverage_pct: f64,
    pub stains_per_in2: f64,
    #[serde(skip)]
    diameters_um: Vec<f64>,
    #[serde(skip)]
    cumulative_fraction: Vec<f64>,
}

impl DropletStatistics {
    /// Aggregate a card's stains. Diameters are in micrometres.
    ///
    /// A card without area or without counted stains yields zero coverage /
    /// density as appropriate and `None` percentiles.
    pub fn compute(stains: &StainSet, dpi: f64, spread: &SpreadFactor) -> Self {
        debug_assert!(dpi > 0.0, "dpi must be positive, got {dpi}");
        if stains.card_area_px2 <= 0.0 || dpi.is_nan() || dpi <= 0.0 {
            return Self::default();
        }

        let stain_count = stains.stains.len();
        let coverage_pct = stains.stained_area_px2() / stains.card_area_px2 * 100.0;
        let card_area_in2 = stains.card_area_px2 / (dpi * dpi);
        let stains_per_in2 = stain_count as f64 / card_area_in2;

        let mut diameters: Vec<f64> = Vec::with_capacity(stains.counted_len());
        let mut dropped = 0usize;
        for stain in stains.counted() {
            let d = spread.droplet_diameter(stain.equivalent_diameter_um(dpi));
            if d.is_finite() && d > 0.0 {
                diameters.push(d);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            warn!("spread factor produced {dropped} unusable droplet diameters; ignoring them");
        }
        diameters.sort_by(|a, b| a.total_cmp(b));

        let cumulative_fraction = cumulative_volume_fraction(&diameters);
        let mut stats = Self {
            stain_count,
            droplet_count: diameters.len(),
            coverage_pct,
            stains_per_in2,
            diameters_um: diameters,
            cumulative_fraction,
            ..Self::default()
        };
        stats.dv01 = stats.percentile(0.1);
        stats.dv05 = stats.percentile(0.5);
        stats.dv09 = stats.percentile(0.9);
        stats.relative_span = match (stats.dv01, stats.dv05, stats.dv09) {
            (Some(d1), Some(d5), Some(d9)) if d5 != 0.0 => Some((d9 - d1) / d5),
            _ => None,
        };
        stats.dn05 = count_median(&stats.diameters_um);
        stats
    }

    /// Volumetric percentile diameter `Dv(f)` for `f` in `[0, 1]`.
    pub fn percentile(&self, fraction: f64) -> Option<f64> {
        interpolate_percentile(&self.diameters_um, &self.cumulative_fraction, fraction)
    }

    /// Percent of spray volume carried by droplets finer than `diameter_um`.
    pub fn volume_fraction_below(&self, diameter_um: f64) -> Option<f64> {
        if self.diameters_um.is_empty() {
            return None;
        }
        let n = self.diameters_um.partition_point(|&d| d < diameter_um);
        Some(if n == 0 {
            0.0
        } else {
            self.cumulative_fraction[n - 1] * 100.0
        })
    }

    pub fn stains_per_cm2(&self) -> f64 {
        self.stains_per_in2 / CM2_PER_IN2
    }

    /// Droplet diameters (µm), ascending.
    pub fn diameters_um(&self) -> &[f64] {
        &self.diameters_um
    }

    /// Cumulative volume fraction parallel to [`Self::diameters_um`].
    pub fn cumulative_fraction(&self) -> &[f64] {
        &self.cumulative_fraction
    }
}

#[inline]
pub fn sphere_volume(diameter: f64) -> f64 {
    PI / 6.0 * diameter * diameter * diameter
}

/// Cumulative volume of ascending diameters, normalised by the total.
pub fn cumulative_volume_fraction(sorted_diameters: &[f64]) -> Vec<f64> {
    let mut acc = 0.0;
    let mut cumulative: Vec<f64> = sorted_diameters
        .iter()
        .map(|&d| {
            acc += sphere_volume(d);
            acc
        })
        .collect();
    if acc > 0.0 {
        for v in cumulative.iter_mut() {
            *v /= acc;
        }
    }
    cumulative
}

/// Diameter where the cumulative fraction first reaches `fraction`,
/// interpolated between the bracketing entries.
pub fn interpolate_percentile(diameters: &[f64], cumulative: &[f64], fraction: f64) -> Option<f64> {
    if diameters.is_empty() || diameters.len() != cumulative.len() {
        return None;
    }
    let i = match cumulative.iter().position(|&c| c >= fraction) {
        Some(i) => i,
        None => return diameters.last().copied(),
    };
    if i == 0 {
        return Some(diameters[0]);
    }
    let (c0, c1) = (cumulative[i - 1], cumulative[i]);
    let (d0, d1) = (diameters[i - 1], diameters[i]);
    let gap = c1 - c0;
    if gap <= 0.0 {
        return Some(d1);
    }
    Some(d0 + (d1 - d0) * (fraction - c0) / gap)
}

fn count_median(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(sorted[n / 2]),
        _ => Some(0.5 * (sorted[n / 2 - 1] + sorted[n / 2])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::spread::SpreadFactor;
    use crate::card::stains::Stain;

    fn stain(area: f64, touches_edge: bool) -> Stain {
        Stain {
            area_px2: area,
            touches_edge,
            is_counted: !touches_edge,
            bbox: [0, 0, 0, 0],
            centroid: [0.0, 0.0],
        }
    }

    fn set(stains: Vec<Stain>) -> StainSet {
        StainSet {
            width: 100,
            height: 100,
            card_area_px2: 10_000.0,
            stains,
            threshold_used: None,
        }
    }

    #[test]
    fn percentile_interpolates_between_brackets() {
        let d = [10.0, 20.0];
        let c = [0.25, 1.0];
        assert_eq!(interpolate_percentile(&d, &c, 0.1), Some(10.0));
        let mid = interpolate_percentile(&d, &c, 0.625).unwrap();
        assert!((mid - 15.0).abs() < 1e-12);
        assert_eq!(interpolate_percentile(&d, &c, 1.0), Some(20.0));
        assert_eq!(interpolate_percentile(&[], &[], 0.5), None);
    }

    #[test]
    fn cumulative_fraction_is_volume_weighted() {
        let c = cumulative_volume_fraction(&[1.0, 2.0]);
        // volumes 1 : 8
        assert!((c[0] - 1.0 / 9.0).abs() < 1e-12);
        assert!((c[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn edge_stains_count_for_coverage_only() {
        let stains = set(vec![stain(50.0, true), stain(30.0, false), stain(20.0, false)]);
        let stats = DropletStatistics::compute(&stains, 2540.0, &SpreadFactor::default());
        assert_eq!(stats.stain_count, 3);
        assert_eq!(stats.droplet_count, 2);
        assert!((stats.coverage_pct - 1.0).abs() < 1e-12);
        let largest = stains.stains[1].equivalent_diameter_um(2540.0);
        assert!(stats.dv09.unwrap() <= largest + 1e-9);
    }

    #[test]
    fn zero_stain_card_has_no_percentiles() {
        let stats = DropletStatistics::compute(&set(Vec::new()), 600.0, &SpreadFactor::default());
        assert_eq!(stats.coverage_pct, 0.0);
        assert_eq!(stats.stains_per_in2, 0.0);
        assert_eq!(stats.dv05, None);
        assert_eq!(stats.relative_span, None);
        assert_eq!(stats.volume_fraction_below(100.0), None);
    }

    #[test]
    fn density_is_per_square_inch() {
        // 100 x 100 px at 100 dpi is exactly one square inch
        let stains = set(vec![stain(4.0, false), stain(4.0, true)]);
        let stats = DropletStatistics::compute(&stains, 100.0, &SpreadFactor::default());
        assert!((stats.stains_per_in2 - 2.0).abs() < 1e-12);
        assert!((stats.stains_per_cm2() - 2.0 / 6.4516).abs() < 1e-12);
    }

    #[test]
    fn volume_fraction_below_steps_at_droplets() {
        let stains = set(vec![stain(10.0, false), stain(40.0, false), stain(90.0, false)]);
        let stats = DropletStatistics::compute(&stains, 2540.0, &SpreadFactor::default());
        let d = stats.diameters_um().to_vec();
        assert_eq!(stats.volume_fraction_below(d[0]), Some(0.0));
        let below_last = stats.volume_fraction_below(d[2]).unwrap();
        assert!((below_last - stats.cumulative_fraction()[1] * 100.0).abs() < 1e-12);
        assert!((stats.volume_fraction_below(1.0e9).unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn count_median_even_and_odd() {
        assert_eq!(count_median(&[1.0, 2.0, 9.0]), Some(2.0));
        assert_eq!(count_median(&[1.0, 3.0]), Some(2.0));
        assert_eq!(count_median(&[]), None);
    }
}
