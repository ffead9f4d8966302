use deposition_engine::card::{binarize, SprayCardSet};
use deposition_engine::config::card;
use deposition_engine::diagnostics::{CardReport, CardSetReport, TimingBreakdown};
use deposition_engine::image::io::{save_mask_png, write_json_file};
use std::env;
use std::path::Path;
use std::sync::atomic::AtomicBool;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config_path = Path::new(&config_path);
    let config = card::load_config(config_path)?;
    let base = config_path.parent().unwrap_or_else(|| Path::new("."));

    let mut timings = TimingBreakdown::default();
    let mut set = config.card_set(base);
    let cancel = AtomicBool::new(false);
    let batch = timings.time("process", || set.process_from_disk(&cancel));

    if let Some(dir) = &config.output.mask_dir {
        timings.time("masks", || save_masks(&set, dir))?;
        println!("Stain masks written to {}", dir.display());
    }

    let report = CardSetReport::new(&set, batch, config.composite_metric, timings);
    print_text_summary(&report);

    if let Some(path) = &config.output.report_json {
        write_json_file(path, &report)?;
        println!("\nJSON report written to {}", path.display());
    }
    Ok(())
}

fn save_masks(set: &SprayCardSet, dir: &Path) -> Result<(), String> {
    for card in set.cards.iter().filter(|c| c.is_processed()) {
        let image = card.load_image().map_err(|e| e.to_string())?;
        let mut binarized = binarize(&image, &card.config().threshold).map_err(|e| e.to_string())?;
        binarized.mask.fill_holes();
        save_mask_png(&binarized.mask, &dir.join(format!("{}.png", card.name)))?;
    }
    Ok(())
}

fn print_text_summary(report: &CardSetReport) {
    println!("Card set '{}'", report.name);
    println!(
        "  processed: {}  failed: {}",
        report.batch.processed,
        report.batch.failed.len()
    );
    for card in &report.cards {
        print_card(card);
    }
    if let Some(composite) = &report.composite {
        println!("  composite ({} samples):", composite.samples.len());
        for s in &composite.samples {
            println!("    {:>8.2} {}  {:.3}", s.location, composite.unit, s.value);
        }
    }
    println!("  total time: {:.2} ms", report.timings.total_ms);
}

fn print_card(card: &CardReport) {
    let Some(stats) = &card.statistics else {
        println!("  {:<12} no data", card.name);
        return;
    };
    println!(
        "  {:<12} @ {:>7.2} {}  stains: {:>5}  coverage: {:>6.2}%  Dv0.1/0.5/0.9: {} / {} / {} um  RS: {}",
        card.name,
        card.location,
        card.unit,
        stats.stain_count,
        stats.coverage_pct,
        format_optional(stats.dv01),
        format_optional(stats.dv05),
        format_optional(stats.dv09),
        format_optional(stats.relative_span),
    );
}

fn format_optional(val: Option<f64>) -> String {
    val.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string())
}

fn usage() -> String {
    "Usage: card_stats <config.json>".to_string()
}
