use crate::card::{CardMetric, CardProcessingConfig, SprayCard, SprayCardSet};
use crate::profile::LengthUnit;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// One card listed in a `card_stats` config.
#[derive(Clone, Debug, Deserialize)]
pub struct CardEntry {
    pub name: String,
    pub image: PathBuf,
    #[serde(default)]
    pub location: f64,
    #[serde(default = "default_include")]
    pub include_in_composite: bool,
    /// Overrides the shared processing parameters for this card only.
    #[serde(default)]
    pub processing: Option<CardProcessingConfig>,
}

fn default_include() -> bool {
    true
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CardOutputConfig {
    pub report_json: Option<PathBuf>,
    /// Directory receiving one `<card>.png` stain mask per card.
    pub mask_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CardStatsConfig {
    #[serde(default = "default_set_name")]
    pub name: String,
    #[serde(default)]
    pub unit: LengthUnit,
    pub cards: Vec<CardEntry>,
    #[serde(default)]
    pub processing: CardProcessingConfig,
    /// When set, a composite profile of this metric is added to the report.
    #[serde(default)]
    pub composite_metric: Option<CardMetric>,
    #[serde(default)]
    pub output: CardOutputConfig,
}

fn default_set_name() -> String {
    "cards".to_string()
}

impl CardStatsConfig {
    /// Card set described by the config, image paths resolved against `base`.
    pub fn card_set(&self, base: &Path) -> SprayCardSet {
        let mut set = SprayCardSet::new(self.name.clone());
        set.unit = self.unit;
        for entry in &self.cards {
            let config = entry
                .processing
                .clone()
                .unwrap_or_else(|| self.processing.clone());
            let mut card = SprayCard::new(entry.name.clone(), entry.location)
                .with_image_path(base.join(&entry.image))
                .with_config(config);
            card.location_unit = self.unit;
            card.include_in_composite = entry.include_in_composite;
            set.push(card);
        }
        set
    }
}

pub fn load_config(path: &Path) -> Result<CardStatsConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
