//! Spread-factor model: estimate the original droplet diameter from the
//! diameter of the dried stain it left on the card.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpreadMethod {
    /// droplet = stain
    #[default]
    None,
    /// droplet = a·s² + b·s + c
    Direct,
    /// droplet = s / (a·s² + b·s + c)
    Adaptive,
}

/// Spread-factor method and its calibration coefficients (per card material).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadFactor {
    pub method: SpreadMethod,
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Default for SpreadFactor {
    fn default() -> Self {
        Self {
            method: SpreadMethod::None,
            a: 0.0,
            b: 1.0,
            c: 0.0,
        }
    }
}

impl SpreadFactor {
    pub fn direct(a: f64, b: f64, c: f64) -> Self {
        Self {
            method: SpreadMethod::Direct,
            a,
            b,
            c,
        }
    }

    pub fn adaptive(a: f64, b: f64, c: f64) -> Self {
        Self {
            method: SpreadMethod::Adaptive,
            a,
            b,
            c,
        }
    }

    #[inline]
    pub fn droplet_diameter(&self, stain_diameter: f64) -> f64 {
        droplet_diameter(stain_diameter, self.method, self.a, self.b, self.c)
    }
}

/// Map a stain diameter to the estimated droplet diameter.
///
/// `a = 0` is valid for every method. An adaptive denominator of zero yields a
/// non-finite value, which downstream statistics discard.
pub fn droplet_diameter(stain: f64, method: SpreadMethod, a: f64, b: f64, c: f64) -> f64 {
    match method {
        SpreadMethod::None => stain,
        SpreadMethod::Direct => a * stain * stain + b * stain + c,
        SpreadMethod::Adaptive => stain / (a * stain * stain + b * stain + c),
    }
}
