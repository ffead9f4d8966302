use super::threshold::{binarize, ThresholdConfig};
use crate::error::Result;
use crate::image::{BinaryMask, ImageView};
use image::RgbImage;
use log::debug;
use serde::Serialize;
use std::f64::consts::PI;

/// Micrometres per inch, for DPI conversions.
pub const MICRONS_PER_INCH: f64 = 25_400.0;

const NEIGH_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// One connected stain region found on a card.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stain {
    pub area_px2: f64,
    pub touches_edge: bool,
    /// At or above the minimum area and clear of the image border.
    pub is_counted: bool,
    /// Inclusive pixel bounds `[x0, y0, x1, y1]`.
    pub bbox: [usize; 4],
    pub centroid: [f64; 2],
}

impl Stain {
    /// Diameter of the circle with the stain's pixel area.
    pub fn equivalent_diameter_px(&self) -> f64 {
        (4.0 * self.area_px2 / PI).sqrt()
    }

    /// Diameter of the circle with the stain's physical area, in micrometres.
    pub fn equivalent_diameter_um(&self, dpi: f64) -> f64 {
        let px_um = MICRONS_PER_INCH / dpi;
        (4.0 * self.area_px2 * px_um * px_um / PI).sqrt()
    }
}

/// Stains of one card plus the card geometry they were measured on.
///
/// Regenerated wholesale whenever threshold parameters change.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StainSet {
    pub width: usize,
    pub height: usize,
    pub card_area_px2: f64,
    pub stains: Vec<Stain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_used: Option<u8>,
}

impl StainSet {
    pub fn counted(&self) -> impl Iterator<Item = &Stain> {
        self.stains.iter().filter(|s| s.is_counted)
    }

    pub fn counted_len(&self) -> usize {
        self.counted().count()
    }

    /// Summed area of every retained stain, edge-touching ones included.
    pub fn stained_area_px2(&self) -> f64 {
        self.stains.iter().map(|s| s.area_px2).sum()
    }
}

#[derive(Default)]
struct RegionAccumulator {
    count: usize,
    sum_x: f64,
    sum_y: f64,
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
    touches_edge: bool,
}

impl RegionAccumulator {
    fn reset(&mut self, x: usize, y: usize) {
        *self = Self {
            x0: x,
            y0: y,
            x1: x,
            y1: y,
            ..Self::default()
        };
    }

    fn push(&mut self, x: usize, y: usize, on_border: bool) {
        self.count += 1;
        self.sum_x += x as f64;
        self.sum_y += y as f64;
        self.x0 = self.x0.min(x);
        self.y0 = self.y0.min(y);
        self.x1 = self.x1.max(x);
        self.y1 = self.y1.max(y);
        self.touches_edge |= on_border;
    }

    fn to_stain(&self, min_area_px: u32) -> Option<Stain> {
        if self.count == 0 || self.count < min_area_px as usize {
            return None;
        }
        let n = self.count as f64;
        Some(Stain {
            area_px2: n,
            touches_edge: self.touches_edge,
            is_counted: !self.touches_edge,
            bbox: [self.x0, self.y0, self.x1, self.y1],
            centroid: [self.sum_x / n, self.sum_y / n],
        })
    }
}

/// Segments card images into stains according to a [`ThresholdConfig`].
#[derive(Clone, Debug, Default)]
pub struct StainExtractor {
    config: ThresholdConfig,
}

impl StainExtractor {
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Binarize `image` and measure every stain region on it.
    pub fn extract(&self, image: &RgbImage) -> Result<StainSet> {
        let binarized = binarize(image, &self.config)?;
        let mut set = self.extract_mask(binarized.mask);
        set.threshold_used = binarized.threshold_used;
        Ok(set)
    }

    /// Measure the regions of an already binarized card.
    ///
    /// Holes are filled first so each region covers its outer contour; regions
    /// below the minimum area are dropped, edge-touching regions are kept but
    /// not counted.
    pub fn extract_mask(&self, mut mask: BinaryMask) -> StainSet {
        mask.fill_holes();
        let (w, h) = (mask.width(), mask.height());
        let mut used = vec![false; w * h];
        let mut stack: Vec<usize> = Vec::with_capacity(64);
        let mut region = RegionAccumulator::default();
        let mut stains = Vec::new();
        let mut discarded = 0usize;

        for seed in 0..(w * h) {
            if used[seed] || mask.data[seed] == 0 {
                continue;
            }
            region.reset(seed % w, seed / w);
            used[seed] = true;
            stack.push(seed);
            while let Some(idx) = stack.pop() {
                let x = idx % w;
                let y = idx / w;
                region.push(x, y, mask.on_border(x, y));
                for (dx, dy) in NEIGH_OFFSETS {
                    let nx = x as isize + dx;
                    let ny = y as isize + dy;
                    if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                        continue;
                    }
                    let nidx = ny as usize * w + nx as usize;
                    if !used[nidx] && mask.data[nidx] != 0 {
                        used[nidx] = true;
                        stack.push(nidx);
                    }
                }
            }
            match region.to_stain(self.config.min_stain_area_px) {
                Some(stain) => stains.push(stain),
                None => discarded += 1,
            }
        }

        debug!(
            "stain extraction: {} retained, {} below {} px",
            stains.len(),
            discarded,
            self.config.min_stain_area_px
        );
        StainSet {
            width: w,
            height: h,
            card_area_px2: (w * h) as f64,
            stains,
            threshold_used: None,
        }
    }
}

/// Convenience wrapper: `(card area, stains)` for one image.
pub fn extract_stains(image: &RgbImage, config: &ThresholdConfig) -> Result<StainSet> {
    StainExtractor::new(config.clone()).extract(image)
}
