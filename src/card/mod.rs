//! Droplet sizing from spray cards.
//!
//! Overview
//! - [`threshold`]: grayscale (manual / Otsu-assisted) and HSB-band
//!   binarization of a card image.
//! - [`stains`]: connected stain regions, their areas and edge flags.
//! - [`spread`]: stain-to-droplet diameter correction.
//! - [`stats`]: volumetric percentiles, coverage and density.
//! - [`card`]: cards and card sets, batch processing and composite profiles.
//!
//! Typical use
//! ```no_run
//! use deposition_engine::card::{CardProcessingConfig, SprayCard};
//! # fn main() -> deposition_engine::Result<()> {
//! let mut card = SprayCard::new("center", 0.0)
//!     .with_image_path("cards/center.png")
//!     .with_config(CardProcessingConfig::default());
//! let stats = card.process_from_disk()?;
//! println!("Dv0.5 = {:?} um, coverage = {:.2}%", stats.dv05, stats.coverage_pct);
//! # Ok(())
//! # }
//! ```
#[allow(clippy::module_inception)]
pub mod card;
pub mod spread;
pub mod stains;
pub mod stats;
pub mod threshold;

pub use card::{BatchSummary, CardMetric, CardProcessingConfig, SprayCard, SprayCardSet};
pub use spread::{droplet_diameter, SpreadFactor, SpreadMethod};
pub use stains::{extract_stains, Stain, StainExtractor, StainSet, MICRONS_PER_INCH};
pub use stats::DropletStatistics;
pub use threshold::{
    binarize, GrayscaleThreshold, HsbBand, HsbThreshold, StainPolarity, ThresholdConfig,
    ThresholdMethod,
};
