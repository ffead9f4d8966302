#![doc = include_str!("../README.md")]

// Public modules
pub mod card;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod profile;
pub mod swath;

// --- High-level re-exports -------------------------------------------------

pub use crate::card::{
    CardProcessingConfig, DropletStatistics, SprayCard, SprayCardSet, StainExtractor, StainSet,
};
pub use crate::error::{DepositionError, Result};
pub use crate::profile::{DepositionProfile, ProfileAggregator, Sample, Series};
pub use crate::swath::{CvTable, FlightMode, SwathSimulation};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use deposition_engine::prelude::*;
///
/// # fn main() -> deposition_engine::Result<()> {
/// let locations: Vec<f64> = (-20..=20).map(f64::from).collect();
/// let values: Vec<f64> = locations.iter().map(|x| 100.0 - 5.0 * x.abs()).collect();
///
/// let mut series = Series::new("pattern 1");
/// series.push(DepositionProfile::from_columns("pass 1", &locations, &values)?);
/// series.options.swath.adjusted_swath = 20.0;
///
/// let table = series.cv_table();
/// println!("racetrack CV at 20: {:?}", series.cv_at(20.0, FlightMode::Racetrack));
/// println!("{} sweep rows", table.rows.len());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::card::{CardProcessingConfig, SpreadFactor, SprayCard, ThresholdConfig};
    pub use crate::profile::{DepositionProfile, ProfileParams, Sample, Series};
    pub use crate::swath::{CvCell, FlightMode};
    pub use crate::{DepositionError, Result};
}
