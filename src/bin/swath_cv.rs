use deposition_engine::config::series;
use deposition_engine::diagnostics::SeriesReport;
use deposition_engine::image::io::write_json_file;
use deposition_engine::swath::CvCell;
use std::env;
use std::path::Path;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = series::load_config(Path::new(&config_path))?;
    let series = config.series().map_err(|e| e.to_string())?;

    let report = SeriesReport::build(&series);
    print_text_summary(&report);

    if let Some(path) = &config.output.result_json {
        write_json_file(path, &report)?;
        println!("\nJSON report written to {}", path.display());
    }
    Ok(())
}

fn print_text_summary(report: &SeriesReport) {
    println!("Series '{}' ({} passes)", report.name, report.passes.len());
    for h in &report.headline {
        println!(
            "  {:?}: CV at {:.1} {} = {}  effective swath = {}",
            h.mode,
            h.swath_width,
            report.unit,
            format_optional(h.cv, "%"),
            format_optional(h.effective_swath, report.unit),
        );
    }
    println!("  {:>8}  {:>10}  {:>14}", "swath", "racetrack", "back-and-forth");
    for row in &report.cv_table.rows {
        println!(
            "  {:>8.1}  {:>10}  {:>14}",
            row.swath_width,
            format_cell(row.racetrack),
            format_cell(row.back_and_forth)
        );
    }
}

fn format_cell(cell: CvCell) -> String {
    format_optional(cell.value(), "%")
}

fn format_optional(val: Option<f64>, suffix: &str) -> String {
    val.map(|v| format!("{v:.2}{suffix}"))
        .unwrap_or_else(|| "-".to_string())
}

fn usage() -> String {
    "Usage: swath_cv <config.json>".to_string()
}
