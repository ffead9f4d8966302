use deposition_engine::profile::{DepositionProfile, Sample};
use image::{Rgb, RgbImage};

/// Water sensitive paper background (yellow).
pub const CARD_BACKGROUND: Rgb<u8> = Rgb([230, 220, 40]);
/// Stain colour (dark blue).
pub const STAIN: Rgb<u8> = Rgb([20, 30, 120]);

/// A card of `width × height` pixels with filled discs `(cx, cy, radius)`.
pub fn card_with_discs(width: u32, height: u32, discs: &[(i64, i64, i64)]) -> RgbImage {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let mut img = RgbImage::from_pixel(width, height, CARD_BACKGROUND);
    for &(cx, cy, r) in discs {
        for y in (cy - r).max(0)..=(cy + r).min(height as i64 - 1) {
            for x in (cx - r).max(0)..=(cx + r).min(width as i64 - 1) {
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy <= r * r {
                    img.put_pixel(x as u32, y as u32, STAIN);
                }
            }
        }
    }
    img
}

/// Pixel count of a disc drawn by [`card_with_discs`] (fully inside the card).
pub fn disc_area(r: i64) -> usize {
    let mut n = 0;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                n += 1;
            }
        }
    }
    n
}

/// Triangle with `peak` at `center`, falling to zero `half_base` away, sampled
/// every `spacing` units.
pub fn triangle(peak: f64, center: f64, half_base: f64, spacing: f64) -> Vec<Sample> {
    let n = (2.0 * half_base / spacing).round() as usize;
    (0..=n)
        .map(|i| {
            let x = center - half_base + i as f64 * spacing;
            let v = peak * (1.0 - (x - center).abs() / half_base);
            Sample::new(x, v.max(0.0))
        })
        .collect()
}

/// Lopsided pattern: a slow rise to a peak near the right end.
pub fn ramp(len: i32) -> Vec<Sample> {
    (-len..=len)
        .map(|x| Sample::new(f64::from(x), f64::from(x + len)))
        .collect()
}

pub fn profile(name: &str, samples: Vec<Sample>) -> DepositionProfile {
    DepositionProfile::new(name, samples).expect("valid synthetic profile")
}
