//! Spray cards and the ordered card set of one pass.
//!
//! A card owns its processing configuration and the derived stain set and
//! statistics. Changing the threshold discards the stains (the image must be
//! processed again); changing the spread factor or DPI only recomputes the
//! statistics from the stains already measured.

use super::spread::SpreadFactor;
use super::stains::{StainExtractor, StainSet};
use super::stats::DropletStatistics;
use super::threshold::ThresholdConfig;
use crate::error::{DepositionError, Result};
use crate::image::io::load_card_image;
use crate::profile::{DepositionProfile, LengthUnit, Sample};
use image::RgbImage;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-card processing parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardProcessingConfig {
    /// Scan resolution, pixels per inch.
    pub dpi: f64,
    pub threshold: ThresholdConfig,
    pub spread_factor: SpreadFactor,
}

impl Default for CardProcessingConfig {
    fn default() -> Self {
        Self {
            dpi: 1200.0,
            threshold: ThresholdConfig::default(),
            spread_factor: SpreadFactor::default(),
        }
    }
}

impl CardProcessingConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.dpi.is_finite() || self.dpi <= 0.0 {
            return Err(DepositionError::configuration(format!(
                "dpi must be positive, got {}",
                self.dpi
            )));
        }
        self.threshold.validate()
    }
}

/// Per-card quantity used to build a composite deposition profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardMetric {
    /// Percent of the card area covered by stains.
    #[default]
    Coverage,
    /// Volume median diameter, µm.
    Dv05,
    /// Retained stains per square inch.
    StainsPerIn2,
}

impl CardMetric {
    pub fn read(self, stats: &DropletStatistics) -> Option<f64> {
        match self {
            CardMetric::Coverage => Some(stats.coverage_pct),
            CardMetric::Dv05 => stats.dv05,
            CardMetric::StainsPerIn2 => Some(stats.stains_per_in2),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprayCard {
    pub name: String,
    pub image_path: Option<PathBuf>,
    /// Position across the flight line.
    pub location: f64,
    pub location_unit: LengthUnit,
    pub include_in_composite: bool,
    config: CardProcessingConfig,
    #[serde(skip)]
    stains: Option<StainSet>,
    #[serde(skip)]
    stats: Option<DropletStatistics>,
}

impl SprayCard {
    pub fn new(name: impl Into<String>, location: f64) -> Self {
        Self {
            name: name.into(),
            image_path: None,
            location,
            location_unit: LengthUnit::default(),
            include_in_composite: true,
            config: CardProcessingConfig::default(),
            stains: None,
            stats: None,
        }
    }

    pub fn with_image_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    /// Builder form; the configuration is validated when the card is
    /// processed.
    pub fn with_config(mut self, config: CardProcessingConfig) -> Self {
        self.config = config;
        self.stains = None;
        self.stats = None;
        self
    }

    pub fn config(&self) -> &CardProcessingConfig {
        &self.config
    }

    /// Replace the whole configuration, keeping derived data only where it is
    /// still valid. An invalid configuration leaves the card untouched.
    pub fn set_config(&mut self, config: CardProcessingConfig) -> Result<()> {
        config.validate()?;
        let threshold_changed = config.threshold != self.config.threshold;
        self.config = config;
        if threshold_changed {
            self.stains = None;
            self.stats = None;
        } else {
            self.refresh_statistics();
        }
        Ok(())
    }

    pub fn set_spread_factor(&mut self, spread_factor: SpreadFactor) {
        self.config.spread_factor = spread_factor;
        self.refresh_statistics();
    }

    pub fn set_dpi(&mut self, dpi: f64) -> Result<()> {
        let mut config = self.config.clone();
        config.dpi = dpi;
        config.validate()?;
        self.config = config;
        self.refresh_statistics();
        Ok(())
    }

    /// Segment `image` and compute the card statistics.
    pub fn process(&mut self, image: &RgbImage) -> Result<&DropletStatistics> {
        self.config.validate()?;
        let stains = StainExtractor::new(self.config.threshold.clone()).extract(image)?;
        let stats = DropletStatistics::compute(&stains, self.config.dpi, &self.config.spread_factor);
        debug!(
            "card '{}': {} stains, coverage {:.2}%",
            self.name, stats.stain_count, stats.coverage_pct
        );
        self.stains = Some(stains);
        let stats: &DropletStatistics = self.stats.insert(stats);
        Ok(stats)
    }

    /// Decode the card's image file and process it.
    pub fn process_from_disk(&mut self) -> Result<&DropletStatistics> {
        let image = self.load_image()?;
        self.process(&image)
    }

    pub fn load_image(&self) -> Result<RgbImage> {
        let path = self.image_path.as_deref().ok_or_else(|| {
            DepositionError::insufficient(format!("card '{}' has no image", self.name))
        })?;
        load_card_image(path)
    }

    pub fn is_processed(&self) -> bool {
        self.stains.is_some()
    }

    pub fn stains(&self) -> Option<&StainSet> {
        self.stains.as_ref()
    }

    pub fn statistics(&self) -> Result<&DropletStatistics> {
        self.stats.as_ref().ok_or_else(|| {
            DepositionError::insufficient(format!("card '{}' has not been processed", self.name))
        })
    }

    pub fn metric(&self, metric: CardMetric) -> Option<f64> {
        self.stats.as_ref().and_then(|s| metric.read(s))
    }

    fn refresh_statistics(&mut self) {
        self.stats = self.stains.as_ref().map(|stains| {
            DropletStatistics::compute(stains, self.config.dpi, &self.config.spread_factor)
        });
    }
}

/// Per-card outcome of a batch run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: Vec<String>,
    pub cancelled: usize,
}

enum CardOutcome {
    Processed,
    Failed(String),
    Cancelled,
}

fn process_one<L>(card: &mut SprayCard, loader: &L, cancel: &AtomicBool) -> CardOutcome
where
    L: Fn(&SprayCard) -> Result<RgbImage>,
{
    if cancel.load(Ordering::Relaxed) {
        return CardOutcome::Cancelled;
    }
    let result = loader(card).and_then(|image| card.process(&image).map(|_| ()));
    match result {
        Ok(()) => CardOutcome::Processed,
        Err(err) => {
            warn!("card '{}' failed: {err}", card.name);
            CardOutcome::Failed(card.name.clone())
        }
    }
}

/// Ordered cards of one pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprayCardSet {
    pub name: String,
    /// Unit of the composite profile's location axis.
    pub unit: LengthUnit,
    pub cards: Vec<SprayCard>,
}

impl SprayCardSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, card: SprayCard) {
        self.cards.push(card);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Give every card matching `predicate` a copy of `config`; returns how
    /// many cards were updated. An invalid `config` is rejected before any
    /// card changes.
    pub fn apply_to<P>(&mut self, mut predicate: P, config: &CardProcessingConfig) -> Result<usize>
    where
        P: FnMut(&SprayCard) -> bool,
    {
        config.validate()?;
        let mut updated = 0;
        for card in self.cards.iter_mut().filter(|c| predicate(c)) {
            card.set_config(config.clone())?;
            updated += 1;
        }
        Ok(updated)
    }

    /// Process every card with images supplied by `loader`.
    ///
    /// Failures are logged and collected; they never abort the batch. Setting
    /// `cancel` stops the batch before the next card starts.
    pub fn process_all<L>(&mut self, loader: L, cancel: &AtomicBool) -> BatchSummary
    where
        L: Fn(&SprayCard) -> Result<RgbImage> + Sync,
    {
        #[cfg(feature = "parallel")]
        let outcomes: Vec<CardOutcome> = self
            .cards
            .par_iter_mut()
            .map(|card| process_one(card, &loader, cancel))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<CardOutcome> = self
            .cards
            .iter_mut()
            .map(|card| process_one(card, &loader, cancel))
            .collect();

        let mut summary = BatchSummary::default();
        for outcome in outcomes {
            match outcome {
                CardOutcome::Processed => summary.processed += 1,
                CardOutcome::Failed(name) => summary.failed.push(name),
                CardOutcome::Cancelled => summary.cancelled += 1,
            }
        }
        summary
    }

    /// [`Self::process_all`] reading each card's `image_path`.
    pub fn process_from_disk(&mut self, cancel: &AtomicBool) -> BatchSummary {
        self.process_all(SprayCard::load_image, cancel)
    }

    /// Deposition profile across the pass: one sample per included, processed
    /// card, ordered by location.
    pub fn composite_profile(&self, metric: CardMetric) -> Result<DepositionProfile> {
        let mut samples: Vec<Sample> = self
            .cards
            .iter()
            .filter(|c| c.include_in_composite)
            .filter_map(|c| {
                let value = c.metric(metric)?;
                let location = c.location_unit.convert(c.location, self.unit);
                Some(Sample::new(location, value))
            })
            .collect();
        if samples.is_empty() {
            return Err(DepositionError::insufficient(format!(
                "card set '{}' has no processed cards to composite",
                self.name
            )));
        }
        samples.sort_by(|a, b| a.location.total_cmp(&b.location));
        Ok(DepositionProfile::new(self.name.clone(), samples)?.with_unit(self.unit))
    }
}
