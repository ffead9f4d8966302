//! Swath-width sweep: a table of racetrack and back-and-forth CVs for a range
//! of candidate swath widths centred on the adjusted swath.

use super::simulate::{simulated_cv, FlightMode};
use crate::profile::{LengthUnit, Sample};
use log::debug;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub const DEFAULT_SWEEP_STEP: f64 = 2.0;
pub const DEFAULT_SWEEP_ROWS: usize = 21;
/// CV (%) commonly accepted as uniform enough for an effective swath.
pub const DEFAULT_CV_LIMIT_PCT: f64 = 25.0;

/// Swath parameters of one series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwathSettings {
    /// Swath the operator intended to fly.
    pub target_swath: f64,
    /// Swath the sweep and the headline CV are centred on.
    pub adjusted_swath: f64,
    /// Simulated passes on each side of the centre pass.
    pub adjacent_passes: usize,
    pub unit: LengthUnit,
}

impl Default for SwathSettings {
    fn default() -> Self {
        Self {
            target_swath: 50.0,
            adjusted_swath: 50.0,
            adjacent_passes: 1,
            unit: LengthUnit::Feet,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepOptions {
    pub step: f64,
    pub rows: usize,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            step: DEFAULT_SWEEP_STEP,
            rows: DEFAULT_SWEEP_ROWS,
        }
    }
}

impl SweepOptions {
    /// Candidate widths, symmetric about `center`. An even row count is
    /// rounded up to the next odd one so `center` stays the middle row.
    pub fn widths(&self, center: f64) -> Vec<f64> {
        let rows = self.rows | 1;
        let mid = (rows / 2) as f64;
        (0..rows)
            .map(|i| center + (i as f64 - mid) * self.step)
            .collect()
    }
}

/// One table cell; serializes as a number or `null`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CvCell {
    Value(f64),
    NoData,
}

impl CvCell {
    pub fn value(self) -> Option<f64> {
        match self {
            CvCell::Value(v) => Some(v),
            CvCell::NoData => None,
        }
    }
}

impl From<Option<f64>> for CvCell {
    fn from(cv: Option<f64>) -> Self {
        match cv {
            Some(v) if v.is_finite() => CvCell::Value(v),
            _ => CvCell::NoData,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CvRow {
    pub swath_width: f64,
    pub racetrack: CvCell,
    pub back_and_forth: CvCell,
}

impl CvRow {
    pub fn cell(&self, mode: FlightMode) -> CvCell {
        match mode {
            FlightMode::Racetrack => self.racetrack,
            FlightMode::BackAndForth => self.back_and_forth,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CvTable {
    pub rows: Vec<CvRow>,
}

impl CvTable {
    /// Widest swath whose CV in `mode` is at or below `cv_limit` (%).
    pub fn widest_swath_within(&self, mode: FlightMode, cv_limit: f64) -> Option<f64> {
        self.rows
            .iter()
            .filter(|row| matches!(row.cell(mode).value(), Some(cv) if cv <= cv_limit))
            .map(|row| row.swath_width)
            .max_by(|a, b| a.total_cmp(b))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn evaluate_row(profile: &[Sample], width: f64, adjacent_passes: usize) -> CvRow {
    let cell = |mode| -> CvCell { simulated_cv(profile, width, adjacent_passes, mode).into() };
    CvRow {
        swath_width: width,
        racetrack: cell(FlightMode::Racetrack),
        back_and_forth: cell(FlightMode::BackAndForth),
    }
}

/// Evaluate both flight modes for every candidate width.
///
/// An empty profile yields a full table of [`CvCell::NoData`].
pub fn cv_table(profile: &[Sample], settings: &SwathSettings, options: &SweepOptions) -> CvTable {
    let widths = options.widths(settings.adjusted_swath);
    debug!(
        "cv sweep: {} widths around {} {} ({} adjacent passes)",
        widths.len(),
        settings.adjusted_swath,
        settings.unit.label(),
        settings.adjacent_passes
    );
    #[cfg(feature = "parallel")]
    let rows = widths
        .par_iter()
        .map(|&w| evaluate_row(profile, w, settings.adjacent_passes))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let rows = widths
        .iter()
        .map(|&w| evaluate_row(profile, w, settings.adjacent_passes))
        .collect();
    CvTable { rows }
}
