use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::competitiveness::{self, CompetitivenessScore};
use crate::dataset::{self, MatchRecord, Round};
use crate::predictability::{self, PredictabilityScore};
use crate::round_metrics::{self, RoundBreakdown, RoundIndicators};
use crate::score_parse;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Inclusive year range.
    pub first_year: i32,
    pub last_year: i32,
    /// Raw level codes to include, e.g. ["G", "M"].
    pub level_codes: Vec<String>,
    /// Also write a spreadsheet workbook next to the CSV tables.
    pub workbook: bool,
}

impl RunConfig {
    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.first_year..=self.last_year
    }
}

/// One row of the per-tournament table.
#[derive(Debug, Clone)]
pub struct TournamentRow {
    pub year: i32,
    pub tournament: String,
    pub surface: String,
    pub level_code: String,
    pub overall: RoundIndicators,
    pub predictability: PredictabilityScore,
    pub competitiveness: CompetitivenessScore,
    pub avg_winner_games: f64,
    /// Winner rank of the first Final-round match, NaN when the tournament
    /// has no Final in the data or the rank is missing.
    pub final_winner_rank: f64,
}

/// One row of the per-round table.
#[derive(Debug, Clone)]
pub struct RoundRow {
    pub year: i32,
    pub tournament: String,
    pub surface: String,
    pub level_code: String,
    pub rounds: RoundBreakdown,
}

/// Both tables for one processed year, plus manifest counters.
#[derive(Debug, Clone)]
pub struct YearTables {
    pub summary: YearSummary,
    pub tournaments: Vec<TournamentRow>,
    pub rounds: Vec<RoundRow>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: i32,
    pub matches: usize,
    pub tournaments: usize,
    pub tokens_skipped: usize,
}

/// Both tables for a whole run, rows in ascending year then tournament
/// encounter order. Built once; downstream only reads.
#[derive(Debug, Clone)]
pub struct SeasonTables {
    pub tournaments: Vec<TournamentRow>,
    pub rounds: Vec<RoundRow>,
    pub years: Vec<YearSummary>,
}

impl SeasonTables {
    pub fn tokens_skipped(&self) -> usize {
        self.years.iter().map(|y| y.tokens_skipped).sum()
    }

    pub fn matches(&self) -> usize {
        self.years.iter().map(|y| y.matches).sum()
    }
}

/// Runs every year in the configured range. Per-year computations are
/// independent, so years fan out over rayon; the order-preserving collect
/// reassembles rows in ascending-year order and the first load failure
/// aborts the whole run.
pub fn process_years(cfg: &RunConfig) -> Result<SeasonTables> {
    let years: Vec<i32> = cfg.years().collect();
    let per_year = years
        .par_iter()
        .map(|year| {
            println!("Processing {year}...");
            process_year(cfg, *year)
        })
        .collect::<Result<Vec<YearTables>>>()?;

    let mut tournaments = Vec::new();
    let mut rounds = Vec::new();
    let mut summaries = Vec::new();
    for year in per_year {
        tournaments.extend(year.tournaments);
        rounds.extend(year.rounds);
        summaries.push(year.summary);
    }
    Ok(SeasonTables {
        tournaments,
        rounds,
        years: summaries,
    })
}

pub fn process_year(cfg: &RunConfig, year: i32) -> Result<YearTables> {
    let all = dataset::load_year_matches(&cfg.input_dir, year)
        .with_context(|| format!("load matches for {year}"))?;
    let matches = dataset::filter_levels(all, &cfg.level_codes);
    Ok(build_year_tables(year, &matches))
}

/// Pure core of a year: filtered match rows -> both tables. Split out so
/// tests and benches can feed synthetic rows without touching the
/// filesystem.
pub fn build_year_tables(year: i32, matches: &[MatchRecord]) -> YearTables {
    let mut tournaments = Vec::new();
    let mut rounds = Vec::new();
    let mut tokens_skipped = 0usize;

    for group in group_by_tournament(matches) {
        let Some(first) = group.first() else {
            continue;
        };

        let metrics = round_metrics::tournament_metrics(&group);
        let predictability = predictability::compute_predictability(&metrics.by_round);
        let competitiveness =
            competitiveness::compute_competitiveness(&metrics.by_round, first.level);

        let winner_games: u32 = group
            .iter()
            .map(|m| score_parse::winner_games(m.score.as_deref()))
            .sum();
        let avg_winner_games = f64::from(winner_games) / group.len() as f64;

        let final_winner_rank = group
            .iter()
            .find(|m| m.round == Some(Round::Final))
            .map_or(f64::NAN, |m| m.winner_rank.unwrap_or(f64::NAN));

        tokens_skipped += group
            .iter()
            .map(|m| score_parse::parse_score(m.score.as_deref()).tokens_skipped)
            .sum::<usize>();

        tournaments.push(TournamentRow {
            year,
            tournament: first.tourney_name.clone(),
            surface: first.surface.clone(),
            level_code: first.level_code.clone(),
            overall: metrics.overall,
            predictability,
            competitiveness,
            avg_winner_games,
            final_winner_rank,
        });
        rounds.push(RoundRow {
            year,
            tournament: first.tourney_name.clone(),
            surface: first.surface.clone(),
            level_code: first.level_code.clone(),
            rounds: metrics.by_round,
        });
    }

    YearTables {
        summary: YearSummary {
            year,
            matches: matches.len(),
            tournaments: tournaments.len(),
            tokens_skipped,
        },
        tournaments,
        rounds,
    }
}

/// Groups matches by tournament id, tournaments ordered by first encounter
/// in the source rows (no key sorting), matches in source order within each.
fn group_by_tournament(matches: &[MatchRecord]) -> Vec<Vec<&MatchRecord>> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&MatchRecord>> = HashMap::new();
    for m in matches {
        let id = m.tourney_id.as_str();
        let group = groups.entry(id).or_insert_with(|| {
            order.push(id);
            Vec::new()
        });
        group.push(m);
    }
    order
        .into_iter()
        .map(|id| groups.remove(id).unwrap_or_default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{build_year_tables, group_by_tournament};
    use crate::dataset::{MatchRecord, Round, TourneyLevel};

    fn m(tourney_id: &str, round: Option<Round>, score: Option<&str>) -> MatchRecord {
        MatchRecord {
            tourney_id: tourney_id.to_string(),
            tourney_name: format!("Open {tourney_id}"),
            level_code: "M".to_string(),
            level: TourneyLevel::Masters,
            surface: "Clay".to_string(),
            round,
            winner_rank: Some(4.0),
            loser_rank: Some(9.0),
            score: score.map(str::to_string),
        }
    }

    #[test]
    fn grouping_preserves_encounter_order() {
        let rows = vec![
            m("2015-404", None, Some("6-4 6-4")),
            m("2015-403", None, Some("6-2 6-2")),
            m("2015-404", None, Some("7-5 7-5")),
            m("2015-410", None, Some("6-3 6-3")),
        ];
        let groups = group_by_tournament(&rows);
        let ids: Vec<&str> = groups.iter().map(|g| g[0].tourney_id.as_str()).collect();
        assert_eq!(ids, ["2015-404", "2015-403", "2015-410"]);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn year_tables_emit_one_row_pair_per_tournament() {
        let rows = vec![
            m("2015-404", Some(Round::Final), Some("6-4 6-4")),
            m("2015-403", None, Some("6-2 6-2")),
        ];
        let tables = build_year_tables(2015, &rows);
        assert_eq!(tables.tournaments.len(), 2);
        assert_eq!(tables.rounds.len(), 2);
        assert_eq!(tables.summary.matches, 2);
        assert_eq!(tables.summary.tournaments, 2);
        assert_eq!(tables.tournaments[0].tournament, "Open 2015-404");
        assert!((tables.tournaments[0].final_winner_rank - 4.0).abs() < 1e-12);
        // No Final match recorded for the second tournament.
        assert!(tables.tournaments[1].final_winner_rank.is_nan());
    }

    #[test]
    fn skipped_tokens_roll_up_into_the_summary() {
        let rows = vec![
            m("2015-404", None, Some("6-4 junk 6-3")),
            m("2015-404", None, Some("bad bad")),
        ];
        let tables = build_year_tables(2015, &rows);
        assert_eq!(tables.summary.tokens_skipped, 3);
    }

    #[test]
    fn final_with_missing_rank_is_undefined() {
        let mut row = m("2015-404", Some(Round::Final), Some("6-4 6-4"));
        row.winner_rank = None;
        row.loser_rank = None;
        let tables = build_year_tables(2015, &[row]);
        assert!(tables.tournaments[0].final_winner_rank.is_nan());
    }
}
