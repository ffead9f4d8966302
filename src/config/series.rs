use crate::error::Result as EngineResult;
use crate::profile::{DepositionProfile, LengthUnit, ProfileParams, Series, SeriesOptions};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// One pass trace listed in a `swath_cv` config.
#[derive(Clone, Debug, Deserialize)]
pub struct PassEntry {
    pub name: String,
    pub locations: Vec<f64>,
    pub values: Vec<f64>,
    #[serde(default)]
    pub params: Option<ProfileParams>,
    #[serde(default = "default_include")]
    pub include_in_composite: bool,
}

fn default_include() -> bool {
    true
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeriesOutputConfig {
    pub result_json: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SwathCvConfig {
    #[serde(default = "default_series_name")]
    pub name: String,
    #[serde(default)]
    pub unit: LengthUnit,
    pub passes: Vec<PassEntry>,
    /// Conditioning applied to passes without their own `params`.
    #[serde(default)]
    pub params: ProfileParams,
    #[serde(default)]
    pub options: SeriesOptions,
    #[serde(default)]
    pub output: SeriesOutputConfig,
}

fn default_series_name() -> String {
    "series".to_string()
}

impl SwathCvConfig {
    /// Validated series built from the listed passes.
    pub fn series(&self) -> EngineResult<Series> {
        let mut series = Series::new(self.name.clone()).with_options(self.options.clone());
        series.options.swath.unit = self.unit;
        for pass in &self.passes {
            let params = pass.params.clone().unwrap_or_else(|| self.params.clone());
            let mut profile =
                DepositionProfile::from_columns(pass.name.clone(), &pass.locations, &pass.values)?
                    .with_params(params)
                    .with_unit(self.unit);
            profile.include_in_composite = pass.include_in_composite;
            series.push(profile);
        }
        Ok(series)
    }
}

pub fn load_config(path: &Path) -> Result<SwathCvConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
