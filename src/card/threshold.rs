//! Card binarization: grayscale (manual or Otsu-assisted) and HSB-band masks.

use crate::error::{DepositionError, Result};
use crate::image::{BinaryMask, ImageU8};
use image::RgbImage;
use log::debug;
use serde::{Deserialize, Serialize};

/// Largest hue value on the 8-bit (half-degree) hue scale.
pub const HUE_MAX: u8 = 179;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMethod {
    #[default]
    Grayscale,
    Hsb,
}

/// Which side of the cut point counts as stain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StainPolarity {
    /// Stains darker than the card (water sensitive paper).
    #[default]
    Dark,
    Light,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrayscaleThreshold {
    /// Manual cut point, used directly or as fallback for Otsu.
    pub threshold: u8,
    /// Try an Otsu-optimal cut point first.
    pub auto_otsu: bool,
    /// Otsu results above this value are rejected in favour of `threshold`.
    pub otsu_ceiling: u8,
    pub polarity: StainPolarity,
}

impl Default for GrayscaleThreshold {
    fn default() -> Self {
        Self {
            threshold: 152,
            auto_otsu: true,
            otsu_ceiling: 180,
            polarity: StainPolarity::Dark,
        }
    }
}

/// Inclusive `[min, max]` band on one HSB channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsbBand {
    pub min: u8,
    pub max: u8,
    /// `true`: pixels inside the band pass. `false`: pixels outside pass.
    #[serde(default = "default_pass")]
    pub pass: bool,
}

fn default_pass() -> bool {
    true
}

impl HsbBand {
    pub fn new(min: u8, max: u8) -> Self {
        Self {
            min,
            max,
            pass: true,
        }
    }

    pub fn rejecting(min: u8, max: u8) -> Self {
        Self {
            min,
            max,
            pass: false,
        }
    }

    #[inline]
    pub fn accepts(&self, v: u8) -> bool {
        let inside = self.min <= v && v <= self.max;
        inside == self.pass
    }
}

/// Per-channel bands; a pixel is stain when all three channels accept it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsbThreshold {
    pub hue: HsbBand,
    pub saturation: HsbBand,
    pub brightness: HsbBand,
}

impl HsbThreshold {
    fn validate(&self) -> Result<()> {
        for (name, band, limit) in [
            ("hue", &self.hue, HUE_MAX),
            ("saturation", &self.saturation, u8::MAX),
            ("brightness", &self.brightness, u8::MAX),
        ] {
            if band.min > band.max {
                return Err(DepositionError::configuration(format!(
                    "{name} band min {} exceeds max {}",
                    band.min, band.max
                )));
            }
            if band.max > limit {
                return Err(DepositionError::configuration(format!(
                    "{name} band max {} exceeds channel limit {limit}",
                    band.max
                )));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn accepts(&self, hsb: [u8; 3]) -> bool {
        self.hue.accepts(hsb[0]) && self.saturation.accepts(hsb[1]) && self.brightness.accepts(hsb[2])
    }
}

/// Everything the stain extractor needs to segment one card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub method: ThresholdMethod,
    pub grayscale: GrayscaleThreshold,
    /// Required when `method` is `hsb`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsb: Option<HsbThreshold>,
    /// Regions smaller than this (pixels) are discarded as noise.
    pub min_stain_area_px: u32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            method: ThresholdMethod::Grayscale,
            grayscale: GrayscaleThreshold::default(),
            hsb: None,
            min_stain_area_px: 4,
        }
    }
}

impl ThresholdConfig {
    pub fn grayscale(threshold: u8) -> Self {
        Self {
            grayscale: GrayscaleThreshold {
                threshold,
                auto_otsu: false,
                ..GrayscaleThreshold::default()
            },
            ..Self::default()
        }
    }

    pub fn hsb(bands: HsbThreshold) -> Self {
        Self {
            method: ThresholdMethod::Hsb,
            hsb: Some(bands),
            ..Self::default()
        }
    }

    pub fn with_min_stain_area(mut self, min_px: u32) -> Self {
        self.min_stain_area_px = min_px;
        self
    }

    pub fn validate(&self) -> Result<()> {
        match self.method {
            ThresholdMethod::Grayscale => Ok(()),
            ThresholdMethod::Hsb => self
                .hsb
                .as_ref()
                .ok_or_else(|| DepositionError::configuration("hsb threshold bounds are unset"))?
                .validate(),
        }
    }
}

/// Output of the binarization stage.
#[derive(Clone, Debug)]
pub struct Binarization {
    pub mask: BinaryMask,
    /// Grayscale cut point actually applied (`None` in HSB mode).
    pub threshold_used: Option<u8>,
}

/// Build the stain mask for a card image.
pub fn binarize(image: &RgbImage, config: &ThresholdConfig) -> Result<Binarization> {
    config.validate()?;
    let (w, h) = (image.width() as usize, image.height() as usize);
    match config.method {
        ThresholdMethod::Grayscale => {
            let gray = image::imageops::grayscale(image);
            let view = ImageU8::from_gray(&gray);
            let cut = select_gray_threshold(&view, &config.grayscale);
            let polarity = config.grayscale.polarity;
            let mask = BinaryMask::from_fn(w, h, |x, y| {
                let v = view.get(x, y);
                match polarity {
                    StainPolarity::Dark => v <= cut,
                    StainPolarity::Light => v > cut,
                }
            });
            Ok(Binarization {
                mask,
                threshold_used: Some(cut),
            })
        }
        ThresholdMethod::Hsb => {
            let bands = config
                .hsb
                .ok_or_else(|| DepositionError::configuration("hsb threshold bounds are unset"))?;
            let mask = BinaryMask::from_fn(w, h, |x, y| {
                let p = image.get_pixel(x as u32, y as u32).0;
                bands.accepts(rgb_to_hsb(p[0], p[1], p[2]))
            });
            Ok(Binarization {
                mask,
                threshold_used: None,
            })
        }
    }
}

/// Otsu cut point when enabled and not above the ceiling, else the manual one.
pub fn select_gray_threshold(view: &ImageU8<'_>, params: &GrayscaleThreshold) -> u8 {
    if !params.auto_otsu {
        return params.threshold;
    }
    match otsu_threshold(&view.histogram()) {
        Some(t) if t <= params.otsu_ceiling => {
            debug!("otsu threshold {t} accepted (ceiling {})", params.otsu_ceiling);
            t
        }
        Some(t) => {
            debug!(
                "otsu threshold {t} above ceiling {}, using manual {}",
                params.otsu_ceiling, params.threshold
            );
            params.threshold
        }
        None => params.threshold,
    }
}

/// Otsu's method over a 256-bin histogram: the cut `t` maximising between-class
/// variance, where the lower class is `v <= t`. `None` for single-valued input.
pub fn otsu_threshold(hist: &[u32; 256]) -> Option<u8> {
    let total: f64 = hist.iter().map(|&c| c as f64).sum();
    if total == 0.0 {
        return None;
    }
    let sum_all: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let mut best: Option<(u8, f64)> = None;
    let mut weight_bg = 0.0f64;
    let mut sum_bg = 0.0f64;
    for (t, &count) in hist.iter().enumerate() {
        weight_bg += count as f64;
        if weight_bg == 0.0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0.0 {
            break;
        }
        sum_bg += t as f64 * count as f64;
        let mean_bg = sum_bg / weight_bg;
        let mean_fg = (sum_all - sum_bg) / weight_fg;
        let between = weight_bg * weight_fg * (mean_bg - mean_fg) * (mean_bg - mean_fg);
        if best.map_or(true, |(_, v)| between > v) {
            best = Some((t as u8, between));
        }
    }
    best.map(|(t, _)| t)
}

/// RGB to 8-bit HSB: hue in half degrees `[0, 179]`, saturation and brightness `[0, 255]`.
pub fn rgb_to_hsb(r: u8, g: u8, b: u8) -> [u8; 3] {
    let rf = r as f32;
    let gf = g as f32;
    let bf = b as f32;
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let brightness = max;
    let saturation = if max > 0.0 { delta / max * 255.0 } else { 0.0 };
    let hue_deg = if delta <= 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    let hue_deg = if hue_deg < 0.0 { hue_deg + 360.0 } else { hue_deg };
    let hue = ((hue_deg / 2.0).round() as u16 % 180) as u8;
    [hue, saturation.round() as u8, brightness as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otsu_splits_bimodal_histogram() {
        let mut hist = [0u32; 256];
        hist[40] = 500;
        hist[210] = 1500;
        let t = otsu_threshold(&hist).expect("threshold");
        assert!((40..210).contains(&t), "otsu threshold was {t}");
    }

    #[test]
    fn otsu_is_undefined_for_flat_image() {
        let mut hist = [0u32; 256];
        hist[128] = 100;
        assert_eq!(otsu_threshold(&hist), None);
    }

    #[test]
    fn otsu_above_ceiling_falls_back_to_manual() {
        // bimodal at 200/250 puts the Otsu cut near 200
        let data: Vec<u8> = (0..100).map(|i| if i < 50 { 200 } else { 250 }).collect();
        let view = ImageU8 {
            w: 10,
            h: 10,
            stride: 10,
            data: &data,
        };
        let params = GrayscaleThreshold {
            threshold: 90,
            auto_otsu: true,
            otsu_ceiling: 150,
            polarity: StainPolarity::Dark,
        };
        assert_eq!(select_gray_threshold(&view, &params), 90);

        let relaxed = GrayscaleThreshold {
            otsu_ceiling: 255,
            ..params
        };
        let t = select_gray_threshold(&view, &relaxed);
        assert!((200..250).contains(&t), "otsu threshold was {t}");
    }

    #[test]
    fn hsb_conversion_matches_primaries() {
        assert_eq!(rgb_to_hsb(255, 0, 0), [0, 255, 255]);
        assert_eq!(rgb_to_hsb(0, 255, 0), [60, 255, 255]);
        assert_eq!(rgb_to_hsb(0, 0, 255), [120, 255, 255]);
        assert_eq!(rgb_to_hsb(0, 0, 0), [0, 0, 0]);
        assert_eq!(rgb_to_hsb(128, 128, 128), [0, 0, 128]);
    }

    #[test]
    fn band_pass_and_reject() {
        let pass = HsbBand::new(10, 20);
        let reject = HsbBand::rejecting(10, 20);
        assert!(pass.accepts(15) && !pass.accepts(25));
        assert!(!reject.accepts(15) && reject.accepts(25));
        assert!(pass.accepts(10) && pass.accepts(20));
    }

    #[test]
    fn unset_hsb_bounds_are_a_configuration_error() {
        let config = ThresholdConfig {
            method: ThresholdMethod::Hsb,
            ..ThresholdConfig::default()
        };
        let image = RgbImage::new(4, 4);
        let err = binarize(&image, &config).unwrap_err();
        assert!(matches!(err, DepositionError::Configuration { .. }));
    }

    #[test]
    fn inverted_band_is_rejected() {
        let config = ThresholdConfig::hsb(HsbThreshold {
            hue: HsbBand::new(100, 90),
            saturation: HsbBand::new(0, 255),
            brightness: HsbBand::new(0, 255),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn hsb_mask_ands_channels() {
        let mut image = RgbImage::from_pixel(3, 1, image::Rgb([255, 255, 0]));
        image.put_pixel(1, 0, image::Rgb([0, 0, 200]));
        image.put_pixel(2, 0, image::Rgb([0, 0, 40]));
        // blue hue, any saturation, bright only
        let config = ThresholdConfig::hsb(HsbThreshold {
            hue: HsbBand::new(110, 130),
            saturation: HsbBand::new(0, 255),
            brightness: HsbBand::new(100, 255),
        });
        let out = binarize(&image, &config).unwrap();
        assert_eq!(out.mask.data, vec![0, 1, 0]);
        assert_eq!(out.threshold_used, None);
    }

    #[test]
    fn dark_polarity_marks_pixels_at_or_below_cut() {
        let mut image = RgbImage::from_pixel(2, 2, image::Rgb([240, 240, 240]));
        image.put_pixel(0, 0, image::Rgb([20, 20, 20]));
        let out = binarize(&image, &ThresholdConfig::grayscale(100)).unwrap();
        assert_eq!(out.mask.data, vec![1, 0, 0, 0]);
        assert_eq!(out.threshold_used, Some(100));
    }
}
