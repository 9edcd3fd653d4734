use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;

use atp_metrics::report_export;
use atp_metrics::run_manifest::{self, RunManifest};
use atp_metrics::season_report::{self, RunConfig};

const DEFAULT_INPUT_DIR: &str = "input_data";
const DEFAULT_OUTPUT_DIR: &str = "output_data";
const DEFAULT_FIRST_YEAR: i32 = 1968;
const DEFAULT_LAST_YEAR: i32 = 2024;
const DEFAULT_LEVELS: &[&str] = &["G", "M"];

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let cfg = build_config()?;
    let started_at = Utc::now().to_rfc3339();

    let season = season_report::process_years(&cfg)?;
    let report = report_export::export_tables(&cfg.output_dir, &season, cfg.workbook)?;

    let finished_at = Utc::now().to_rfc3339();
    let manifest = RunManifest {
        started_at,
        finished_at,
        first_year: cfg.first_year,
        last_year: cfg.last_year,
        level_codes: cfg.level_codes.clone(),
        years: season.years.clone(),
        tournament_rows: report.tournament_rows,
        round_rows: report.round_rows,
        tokens_skipped: season.tokens_skipped(),
    };
    run_manifest::save_manifest(&cfg.output_dir, &manifest)?;

    println!("Tournament metrics run complete");
    println!(
        "Years: {}-{} levels {:?}",
        cfg.first_year, cfg.last_year, cfg.level_codes
    );
    println!(
        "Matches: {} across {} tournament-years",
        season.matches(),
        report.tournament_rows
    );
    if manifest.tokens_skipped > 0 {
        println!("Score tokens skipped: {}", manifest.tokens_skipped);
    }
    println!("Saved:");
    println!("  {}", report.tournaments_path.display());
    println!("  {}", report.rounds_path.display());
    if let Some(path) = &report.workbook_path {
        println!("  {}", path.display());
    }
    println!("  {}", run_manifest::manifest_path(&cfg.output_dir).display());

    Ok(())
}

fn build_config() -> Result<RunConfig> {
    let input_dir = parse_value_arg("--input")
        .or_else(|| env_value("APP_INPUT_DIR"))
        .unwrap_or_else(|| DEFAULT_INPUT_DIR.to_string());
    let output_dir = parse_value_arg("--output")
        .or_else(|| env_value("APP_OUTPUT_DIR"))
        .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());

    let (first_year, last_year) = match parse_value_arg("--years").or_else(|| env_value("APP_YEARS"))
    {
        Some(raw) => parse_year_range(&raw)?,
        None => (DEFAULT_FIRST_YEAR, DEFAULT_LAST_YEAR),
    };
    if first_year > last_year {
        return Err(anyhow!("year range is inverted: {first_year}-{last_year}"));
    }

    let level_codes = parse_value_arg("--levels")
        .or_else(|| env_value("APP_LEVELS"))
        .map(|raw| parse_level_codes(&raw))
        .unwrap_or_else(|| DEFAULT_LEVELS.iter().map(|s| s.to_string()).collect());
    if level_codes.is_empty() {
        return Err(anyhow!("no tournament levels resolved"));
    }

    let workbook = has_flag("--workbook") || env_value("APP_WORKBOOK").is_some();

    Ok(RunConfig {
        input_dir: PathBuf::from(input_dir),
        output_dir: PathBuf::from(output_dir),
        first_year,
        last_year,
        level_codes,
        workbook,
    })
}

/// "1990-2024" or a single "2024".
fn parse_year_range(raw: &str) -> Result<(i32, i32)> {
    let trimmed = raw.trim();
    let parse = |s: &str| {
        s.trim()
            .parse::<i32>()
            .with_context(|| format!("invalid year {s:?}"))
    };
    match trimmed.split_once('-') {
        Some((first, last)) => Ok((parse(first)?, parse(last)?)),
        None => {
            let year = parse(trimmed)?;
            Ok((year, year))
        }
    }
}

fn parse_level_codes(raw: &str) -> Vec<String> {
    let mut out = Vec::new();
    for part in raw.split([',', ';', ' ']) {
        let code = part.trim().to_uppercase();
        if !code.is_empty() && !out.contains(&code) {
            out.push(code);
        }
    }
    out
}

fn parse_value_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

fn has_flag(name: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == name)
}

fn env_value(key: &str) -> Option<String> {
    let raw = std::env::var(key).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}
