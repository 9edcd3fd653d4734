use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::dataset::Round;
use crate::season_report::{RoundRow, SeasonTables, TournamentRow};

pub const TOURNAMENTS_CSV: &str = "tournaments_overall_all_years.csv";
pub const ROUNDS_CSV: &str = "tournaments_rounds_all_years.csv";
pub const WORKBOOK_FILE: &str = "tournaments_all_years.xlsx";

const INDICATOR_COLUMNS: [&str; 5] = [
    "avg_sets",
    "avg_diff_games",
    "avg_tot_games",
    "avg_rank",
    "fave_ratio",
];

pub struct ExportReport {
    pub tournaments_path: PathBuf,
    pub rounds_path: PathBuf,
    pub workbook_path: Option<PathBuf>,
    pub tournament_rows: usize,
    pub round_rows: usize,
}

/// Writes both result tables as CSV, plus an optional spreadsheet workbook
/// with one sheet per table. Undefined (NaN) cells serialize as blanks.
pub fn export_tables(
    output_dir: &Path,
    season: &SeasonTables,
    workbook: bool,
) -> Result<ExportReport> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create output dir {}", output_dir.display()))?;

    let tournaments_table = tournament_table(&season.tournaments);
    let rounds_table = round_table(&season.rounds);

    let tournaments_path = output_dir.join(TOURNAMENTS_CSV);
    write_csv(&tournaments_path, &tournaments_table)?;
    let rounds_path = output_dir.join(ROUNDS_CSV);
    write_csv(&rounds_path, &rounds_table)?;

    let workbook_path = if workbook {
        let path = output_dir.join(WORKBOOK_FILE);
        write_workbook(
            &path,
            &[
                ("Tournaments", &tournaments_table),
                ("Rounds", &rounds_table),
            ],
        )?;
        Some(path)
    } else {
        None
    };

    Ok(ExportReport {
        tournaments_path,
        rounds_path,
        workbook_path,
        tournament_rows: season.tournaments.len(),
        round_rows: season.rounds.len(),
    })
}

/// Per-tournament table, header row first.
pub fn tournament_table(rows: &[TournamentRow]) -> Vec<Vec<String>> {
    let mut header = vec![
        "year".to_string(),
        "tournament".to_string(),
        "surface".to_string(),
        "tourney_level".to_string(),
    ];
    header.extend(INDICATOR_COLUMNS.iter().map(|c| c.to_string()));
    header.extend(
        [
            "avg_winner_rank",
            "rank_drop",
            "avg_fave_ratio",
            "match_tightness",
            "match_balance",
            "avg_winner_games",
            "final_winner_rank",
        ]
        .iter()
        .map(|c| c.to_string()),
    );

    let mut table = vec![header];
    table.extend(rows.iter().map(tournament_row_cells));
    table
}

/// Per-round table: the five indicator columns repeated per target round,
/// column names suffixed with the round code (avg_sets_R16 ... fave_ratio_F).
pub fn round_table(rows: &[RoundRow]) -> Vec<Vec<String>> {
    let mut header = vec![
        "year".to_string(),
        "tournament".to_string(),
        "surface".to_string(),
        "tourney_level".to_string(),
    ];
    for round in Round::ALL {
        for column in INDICATOR_COLUMNS {
            header.push(format!("{column}_{}", round.code()));
        }
    }

    let mut table = vec![header];
    table.extend(rows.iter().map(round_row_cells));
    table
}

pub fn tournament_row_cells(row: &TournamentRow) -> Vec<String> {
    let mut cells = vec![
        row.year.to_string(),
        row.tournament.clone(),
        row.surface.clone(),
        row.level_code.clone(),
    ];
    cells.extend([
        num_cell(row.overall.avg_sets),
        num_cell(row.overall.avg_diff_games),
        num_cell(row.overall.avg_tot_games),
        num_cell(row.overall.avg_rank),
        num_cell(row.overall.fave_ratio),
        num_cell(row.predictability.avg_winner_rank),
        num_cell(row.predictability.rank_drop),
        num_cell(row.predictability.avg_fave_ratio),
        num_cell(row.competitiveness.match_tightness),
        num_cell(row.competitiveness.match_balance),
        num_cell(row.avg_winner_games),
        num_cell(row.final_winner_rank),
    ]);
    cells
}

pub fn round_row_cells(row: &RoundRow) -> Vec<String> {
    let mut cells = vec![
        row.year.to_string(),
        row.tournament.clone(),
        row.surface.clone(),
        row.level_code.clone(),
    ];
    for (_, indicators) in row.rounds.iter() {
        cells.extend([
            num_cell(indicators.avg_sets),
            num_cell(indicators.avg_diff_games),
            num_cell(indicators.avg_tot_games),
            num_cell(indicators.avg_rank),
            num_cell(indicators.fave_ratio),
        ]);
    }
    cells
}

fn num_cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

fn write_csv(path: &Path, table: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("open output table {}", path.display()))?;
    for row in table {
        writer
            .write_record(row)
            .with_context(|| format!("write row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush output table {}", path.display()))?;
    Ok(())
}

fn write_workbook(path: &Path, sheets: &[(&str, &Vec<Vec<String>>)]) -> Result<()> {
    let mut workbook = Workbook::new();
    for (name, table) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name)?;
        write_rows(sheet, table)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{num_cell, round_table, tournament_table};
    use crate::competitiveness::CompetitivenessScore;
    use crate::predictability::PredictabilityScore;
    use crate::round_metrics::{RoundBreakdown, RoundIndicators};
    use crate::season_report::{RoundRow, TournamentRow};

    fn sample_tournament_row() -> TournamentRow {
        TournamentRow {
            year: 2015,
            tournament: "Wimbledon".to_string(),
            surface: "Grass".to_string(),
            level_code: "G".to_string(),
            overall: RoundIndicators {
                matches: 127,
                avg_sets: 3.5,
                avg_diff_games: 6.0,
                avg_tot_games: 35.0,
                avg_rank: 40.0,
                fave_ratio: 0.7,
            },
            predictability: PredictabilityScore {
                avg_winner_rank: 12.0,
                rank_drop: f64::NAN,
                avg_fave_ratio: 0.8,
            },
            competitiveness: CompetitivenessScore {
                match_tightness: 0.55,
                match_balance: 0.8,
            },
            avg_winner_games: 17.5,
            final_winner_rank: 1.0,
        }
    }

    #[test]
    fn undefined_cells_are_blank() {
        assert_eq!(num_cell(f64::NAN), "");
        assert_eq!(num_cell(0.0), "0");
        assert_eq!(num_cell(0.5), "0.5");
    }

    #[test]
    fn tournament_table_layout() {
        let table = tournament_table(&[sample_tournament_row()]);
        assert_eq!(table.len(), 2);
        let header = &table[0];
        assert_eq!(header.len(), 16);
        assert_eq!(header[0], "year");
        assert_eq!(header[4], "avg_sets");
        assert_eq!(header[9], "avg_winner_rank");
        assert_eq!(header[15], "final_winner_rank");

        let row = &table[1];
        assert_eq!(row.len(), header.len());
        assert_eq!(row[0], "2015");
        assert_eq!(row[3], "G");
        // rank_drop was undefined for this tournament.
        assert_eq!(row[10], "");
        assert_eq!(row[15], "1");
    }

    #[test]
    fn round_table_columns_are_suffixed_in_round_order() {
        let row = RoundRow {
            year: 2015,
            tournament: "Wimbledon".to_string(),
            surface: "Grass".to_string(),
            level_code: "G".to_string(),
            rounds: RoundBreakdown::new([RoundIndicators::empty(); 4]),
        };
        let table = round_table(&[row]);
        let header = &table[0];
        assert_eq!(header.len(), 4 + 4 * 5);
        assert_eq!(header[4], "avg_sets_R16");
        assert_eq!(header[8], "fave_ratio_R16");
        assert_eq!(header[9], "avg_sets_QF");
        assert_eq!(header[19], "avg_sets_F");
        assert_eq!(header[23], "fave_ratio_F");

        // Empty rounds serialize as blanks, not zeros.
        let cells = &table[1];
        assert!(cells[4..].iter().all(String::is_empty));
    }
}
