use crate::error::{DepositionError, Result};
use serde::{Deserialize, Serialize};

/// One `(location, value)` deposition sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub location: f64,
    pub value: f64,
}

impl Sample {
    #[inline]
    pub const fn new(location: f64, value: f64) -> Self {
        Self { location, value }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Feet,
    Meters,
}

impl LengthUnit {
    const METERS_PER_FOOT: f64 = 0.3048;

    pub fn label(self) -> &'static str {
        match self {
            LengthUnit::Feet => "ft",
            LengthUnit::Meters => "m",
        }
    }

    /// Express `value` (in `self` units) in `target` units.
    pub fn convert(self, value: f64, target: LengthUnit) -> f64 {
        match (self, target) {
            (LengthUnit::Feet, LengthUnit::Meters) => value * Self::METERS_PER_FOOT,
            (LengthUnit::Meters, LengthUnit::Feet) => value / Self::METERS_PER_FOOT,
            _ => value,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CenterMethod {
    Centroid,
    #[default]
    CenterOfDistribution,
    None,
}

/// How a centering offset is applied to the location axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftMode {
    /// Subtract the computed centre exactly.
    #[default]
    Continuous,
    /// Round the offset to a whole number of sample spacings.
    Snapped,
}

/// Operator-controlled conditioning parameters for one profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileParams {
    /// Samples excluded from the left end.
    pub trim_left: usize,
    /// Samples excluded from the right end.
    pub trim_right: usize,
    /// Value floor subtracted after trimming.
    pub trim_vertical: f64,
    pub rebase: bool,
    pub center: bool,
    pub center_method: CenterMethod,
    pub shift_mode: ShiftMode,
    pub smooth: bool,
    /// Savitzky–Golay window in location units.
    pub smooth_window: f64,
    pub smooth_order: usize,
}

impl Default for ProfileParams {
    fn default() -> Self {
        Self {
            trim_left: 0,
            trim_right: 0,
            trim_vertical: 0.0,
            rebase: false,
            center: true,
            center_method: CenterMethod::CenterOfDistribution,
            shift_mode: ShiftMode::Continuous,
            smooth: false,
            smooth_window: 5.0,
            smooth_order: 0,
        }
    }
}

impl ProfileParams {
    /// Parameters that leave a profile untouched apart from baseline removal.
    pub fn passthrough() -> Self {
        Self {
            center: false,
            center_method: CenterMethod::None,
            ..Self::default()
        }
    }
}

/// One named pass profile: untouched raw samples plus the parameters used to
/// derive its conditioned curve.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DepositionProfile {
    pub name: String,
    pub unit: LengthUnit,
    pub include_in_composite: bool,
    pub params: ProfileParams,
    raw: Vec<Sample>,
}

impl DepositionProfile {
    /// Validate and wrap captured samples (locations strictly increasing, all
    /// values finite).
    pub fn new(name: impl Into<String>, raw: Vec<Sample>) -> Result<Self> {
        let name = name.into();
        validate_samples(&raw).map_err(|reason| {
            DepositionError::configuration(format!("profile '{name}': {reason}"))
        })?;
        Ok(Self {
            name,
            unit: LengthUnit::default(),
            include_in_composite: true,
            params: ProfileParams::default(),
            raw,
        })
    }

    pub fn from_columns(name: impl Into<String>, locations: &[f64], values: &[f64]) -> Result<Self> {
        let name = name.into();
        if locations.len() != values.len() {
            return Err(DepositionError::configuration(format!(
                "profile '{name}': {} locations but {} values",
                locations.len(),
                values.len()
            )));
        }
        let raw = locations
            .iter()
            .zip(values)
            .map(|(&x, &v)| Sample::new(x, v))
            .collect();
        Self::new(name, raw)
    }

    pub fn with_params(mut self, params: ProfileParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_unit(mut self, unit: LengthUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn raw(&self) -> &[Sample] {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Recompute the conditioned curve from the raw samples.
    pub fn conditioned(&self) -> Result<Vec<Sample>> {
        super::conditioner::condition(&self.raw, &self.params)
    }

    /// Conditioned curve with its locations expressed in `unit`.
    pub fn conditioned_in(&self, unit: LengthUnit) -> Result<Vec<Sample>> {
        let mut samples = self.conditioned()?;
        if self.unit != unit {
            for s in samples.iter_mut() {
                s.location = self.unit.convert(s.location, unit);
            }
        }
        Ok(samples)
    }
}

fn validate_samples(samples: &[Sample]) -> std::result::Result<(), String> {
    for (i, s) in samples.iter().enumerate() {
        if !s.location.is_finite() || !s.value.is_finite() {
            return Err(format!("sample {i} is not finite"));
        }
    }
    if let Some(i) = samples
        .windows(2)
        .position(|w| w[1].location <= w[0].location)
    {
        return Err(format!(
            "locations must increase strictly (sample {} at {} follows {})",
            i + 1,
            samples[i + 1].location,
            samples[i].location
        ));
    }
    Ok(())
}
