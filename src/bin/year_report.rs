use std::path::PathBuf;

use anyhow::{Context, Result};

use atp_metrics::season_report::{self, RunConfig};

// This binary is intentionally simple: it processes one year and prints the
// per-tournament scores, for eyeballing a season without writing any files.
fn main() -> Result<()> {
    let year = std::env::args()
        .nth(1)
        .map(|raw| raw.trim().parse::<i32>().context("invalid year argument"))
        .transpose()?
        .unwrap_or(2024);
    let input_dir = std::env::args()
        .nth(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("input_data"));

    let cfg = RunConfig {
        input_dir,
        output_dir: PathBuf::from("output_data"),
        first_year: year,
        last_year: year,
        level_codes: vec!["G".to_string(), "M".to_string()],
        workbook: false,
    };

    let tables = season_report::process_year(&cfg, year)?;
    println!(
        "{year}: {} matches, {} tournaments",
        tables.summary.matches, tables.summary.tournaments
    );
    for row in &tables.tournaments {
        println!(
            "{} [{}] {}: winner_rank {} drop {} fave {} tight {} balance {}",
            row.tournament,
            row.level_code,
            row.surface,
            fmt(row.predictability.avg_winner_rank),
            fmt(row.predictability.rank_drop),
            fmt(row.predictability.avg_fave_ratio),
            fmt(row.competitiveness.match_tightness),
            fmt(row.competitiveness.match_balance),
        );
    }

    Ok(())
}

fn fmt(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{value:.3}")
    }
}
