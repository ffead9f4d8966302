mod common;

use common::synthetic::{card_with_discs, disc_area};
use deposition_engine::card::{
    CardMetric, CardProcessingConfig, DropletStatistics, HsbBand, HsbThreshold, SpreadFactor,
    SprayCard, SprayCardSet, StainExtractor, ThresholdConfig, ThresholdMethod,
};
use deposition_engine::DepositionError;
use image::RgbImage;

const DPI: f64 = 600.0;

fn scattered_discs() -> Vec<(i64, i64, i64)> {
    vec![
        (20, 20, 2),
        (60, 20, 3),
        (100, 25, 5),
        (25, 70, 4),
        (70, 75, 7),
        (120, 80, 9),
        (40, 120, 3),
        (95, 125, 6),
    ]
}

#[test]
fn edge_stain_counts_for_coverage_but_not_sizes() {
    let discs = [(0, 50, 6), (50, 50, 4), (80, 30, 8)];
    let image = card_with_discs(120, 100, &discs);
    let stains = StainExtractor::new(ThresholdConfig::grayscale(128))
        .extract(&image)
        .unwrap();
    assert_eq!(stains.stains.len(), 3);
    assert_eq!(stains.counted_len(), 2);
    let edge = stains
        .stains
        .iter()
        .find(|s| s.touches_edge)
        .expect("edge stain");
    assert_eq!(edge.bbox[0], 0);

    let stats = DropletStatistics::compute(&stains, DPI, &SpreadFactor::default());
    let expected_area = (disc_area(4) + disc_area(8)) as f64 + edge.area_px2;
    assert!((stats.coverage_pct - expected_area / 12_000.0 * 100.0).abs() < 1e-9);
    assert_eq!(stats.droplet_count, 2);

    let largest_counted = stains
        .counted()
        .map(|s| s.equivalent_diameter_um(DPI))
        .fold(0.0, f64::max);
    let dv09 = stats.dv09.expect("dv09");
    assert!(
        dv09 <= largest_counted + 1e-9,
        "dv09 {dv09} exceeds largest counted droplet {largest_counted}"
    );
}

#[test]
fn percentiles_are_monotone_for_every_spread_method() {
    let image = card_with_discs(160, 160, &scattered_discs());
    let stains = StainExtractor::new(ThresholdConfig::grayscale(128))
        .extract(&image)
        .unwrap();
    assert_eq!(stains.counted_len(), scattered_discs().len());

    for spread in [
        SpreadFactor::default(),
        SpreadFactor::direct(0.0002, 0.55, 3.0),
        SpreadFactor::adaptive(0.0, 0.0008, 1.4),
    ] {
        let stats = DropletStatistics::compute(&stains, DPI, &spread);
        let (d1, d5, d9) = (
            stats.dv01.unwrap(),
            stats.dv05.unwrap(),
            stats.dv09.unwrap(),
        );
        assert!(
            d1 <= d5 && d5 <= d9,
            "{:?}: dv01 {d1} dv05 {d5} dv09 {d9}",
            spread.method
        );
        assert!(stats.relative_span.unwrap() >= 0.0);
    }
}

#[test]
fn statistics_are_idempotent() {
    let image = card_with_discs(160, 160, &scattered_discs());
    let stains = StainExtractor::new(ThresholdConfig::default())
        .extract(&image)
        .unwrap();
    let spread = SpreadFactor::adaptive(0.0, 0.0008, 1.4);
    let a = DropletStatistics::compute(&stains, DPI, &spread);
    let b = DropletStatistics::compute(&stains, DPI, &spread);
    assert_eq!(a.dv01.map(f64::to_bits), b.dv01.map(f64::to_bits));
    assert_eq!(a.dv05.map(f64::to_bits), b.dv05.map(f64::to_bits));
    assert_eq!(a.dv09.map(f64::to_bits), b.dv09.map(f64::to_bits));
    assert_eq!(a, b);
}

#[test]
fn otsu_and_hsb_find_the_same_stains() {
    let image = card_with_discs(160, 160, &scattered_discs());
    let otsu = StainExtractor::new(ThresholdConfig::default())
        .extract(&image)
        .unwrap();
    assert!(otsu.threshold_used.is_some());

    let hsb = ThresholdConfig::hsb(HsbThreshold {
        hue: HsbBand::new(90, 150),
        saturation: HsbBand::new(50, 255),
        brightness: HsbBand::new(0, 255),
    });
    let by_colour = StainExtractor::new(hsb).extract(&image).unwrap();
    assert_eq!(by_colour.threshold_used, None);
    assert_eq!(otsu.stains, by_colour.stains);
}

#[test]
fn hsb_without_bands_is_a_configuration_error() {
    let config = ThresholdConfig {
        method: ThresholdMethod::Hsb,
        hsb: None,
        ..ThresholdConfig::default()
    };
    let err = StainExtractor::new(config)
        .extract(&card_with_discs(10, 10, &[]))
        .unwrap_err();
    assert!(matches!(err, DepositionError::Configuration { .. }));
    assert!(!err.is_recoverable());
}

#[test]
fn blank_card_reports_no_data() {
    let mut card = SprayCard::new("blank", 0.0).with_config(CardProcessingConfig {
        dpi: DPI,
        threshold: ThresholdConfig::grayscale(128),
        ..CardProcessingConfig::default()
    });
    let stats = card.process(&card_with_discs(64, 64, &[])).unwrap();
    assert_eq!(stats.coverage_pct, 0.0);
    assert_eq!(stats.stains_per_in2, 0.0);
    assert_eq!(stats.dv01, None);
    assert_eq!(stats.dv05, None);
    assert_eq!(stats.dv09, None);
    assert_eq!(stats.percentile(0.5), None);
}

#[test]
fn density_counts_edge_stains() {
    // 600 x 600 px at 600 dpi is one square inch
    let image = card_with_discs(600, 600, &[(0, 300, 5), (300, 300, 5), (450, 150, 5)]);
    let stains = StainExtractor::new(ThresholdConfig::grayscale(128))
        .extract(&image)
        .unwrap();
    let stats = DropletStatistics::compute(&stains, DPI, &SpreadFactor::default());
    assert!((stats.stains_per_in2 - 3.0).abs() < 1e-9);
    assert_eq!(stats.droplet_count, 2);
}

#[test]
fn card_set_composite_follows_card_order_across_the_line() {
    let config = CardProcessingConfig {
        dpi: DPI,
        threshold: ThresholdConfig::grayscale(128),
        ..CardProcessingConfig::default()
    };
    let mut set = SprayCardSet::new("pass 1");
    for (i, loc) in [20.0, -20.0, 0.0, 10.0, -10.0].into_iter().enumerate() {
        set.push(SprayCard::new(format!("card {i}"), loc));
    }
    let updated = set.apply_to(|_| true, &config).unwrap();
    assert_eq!(updated, 5);

    // more stains towards the centre of the line
    let loader = |card: &SprayCard| -> deposition_engine::Result<RgbImage> {
        let n = (3.0 - card.location.abs() / 10.0) as i64;
        let discs: Vec<(i64, i64, i64)> = (0..n).map(|k| (20 + 30 * k, 40, 6)).collect();
        Ok(card_with_discs(120, 80, &discs))
    };
    let summary = set.process_all(loader, &std::sync::atomic::AtomicBool::new(false));
    assert_eq!(summary.processed, 5);
    assert!(summary.failed.is_empty());

    let profile = set.composite_profile(CardMetric::Coverage).unwrap();
    let locations: Vec<f64> = profile.raw().iter().map(|s| s.location).collect();
    assert_eq!(locations, vec![-20.0, -10.0, 0.0, 10.0, 20.0]);
    let values: Vec<f64> = profile.raw().iter().map(|s| s.value).collect();
    assert!(values[2] > values[1] && values[1] > values[0]);
    assert!((values[1] - values[3]).abs() < 1e-12);
}
