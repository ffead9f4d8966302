//! A series: the passes flown for one pattern test plus the swath settings
//! used to judge their combined uniformity.

use super::aggregate::ProfileAggregator;
use super::types::{DepositionProfile, ProfileParams, Sample};
use crate::error::Result;
use crate::swath::{
    cv_table, simulate, simulated_cv, CvTable, FlightMode, SwathSettings, SwathSimulation,
    SweepOptions,
};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesOptions {
    pub equalize_integrals: bool,
    pub swath: SwathSettings,
    pub sweep: SweepOptions,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        Self {
            equalize_integrals: true,
            swath: SwathSettings::default(),
            sweep: SweepOptions::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub name: String,
    pub profiles: Vec<DepositionProfile>,
    pub options: SeriesOptions,
}

impl Series {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: SeriesOptions) -> Self {
        self.options = options;
        self
    }

    pub fn push(&mut self, profile: DepositionProfile) {
        self.profiles.push(profile);
    }

    /// Replace the conditioning parameters of every profile matching
    /// `predicate`; returns how many were updated.
    pub fn apply_to<P>(&mut self, mut predicate: P, params: &ProfileParams) -> usize
    where
        P: FnMut(&DepositionProfile) -> bool,
    {
        let mut updated = 0;
        for profile in self.profiles.iter_mut().filter(|p| predicate(p)) {
            profile.params = params.clone();
            updated += 1;
        }
        updated
    }

    /// Average of the included passes after conditioning (and equalization,
    /// when enabled), located in the swath unit.
    pub fn average_profile(&self) -> Result<Vec<Sample>> {
        ProfileAggregator::new(self.options.equalize_integrals)
            .in_unit(self.options.swath.unit)
            .aggregate(&self.profiles)
    }

    /// Simulated deposition at the adjusted swath.
    pub fn simulate(&self, mode: FlightMode) -> Result<SwathSimulation> {
        let average = self.average_profile()?;
        let swath = &self.options.swath;
        simulate(&average, swath.adjusted_swath, swath.adjacent_passes, mode)
    }

    /// CV sweep around the adjusted swath; all cells read "no data" when the
    /// series has nothing to average.
    pub fn cv_table(&self) -> CvTable {
        let average = self.average_or_empty();
        cv_table(&average, &self.options.swath, &self.options.sweep)
    }

    /// CV (%) of the simulated deposition for an arbitrary swath width.
    pub fn cv_at(&self, swath_width: f64, mode: FlightMode) -> Option<f64> {
        let average = self.average_or_empty();
        simulated_cv(
            &average,
            swath_width,
            self.options.swath.adjacent_passes,
            mode,
        )
    }

    fn average_or_empty(&self) -> Vec<Sample> {
        self.average_profile().unwrap_or_else(|err| {
            debug!("series '{}' has no average profile: {err}", self.name);
            Vec::new()
        })
    }
}
